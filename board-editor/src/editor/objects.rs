// Drawable objects held by the reference canvas.

use board_core::PX_PER_CM;
use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ObjectId = Uuid;

/// Height of the fixed-height rectangle, in centimetres.
pub const FIXED_HEIGHT_CM: f32 = 0.3;

/// Measurement labels sit this far above their shape.
pub const LABEL_OFFSET_Y: f32 = 20.0;

pub const LABEL_FONT_SIZE: f32 = 14.0;

pub const DEFAULT_FONT_FAMILY: &str = "Arial";

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Geometry of an object, tagged by type on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Freehand brush or eraser stroke. Points are relative to the object origin.
    Path { points: Vec<Pos2> },
    Rect {
        width: f32,
        height: f32,
        #[serde(default)]
        fixed_height: bool,
    },
    Circle { radius: f32 },
    Triangle { width: f32, height: f32 },
    Text {
        text: String,
        font_size: f32,
        #[serde(default = "default_font_family")]
        font_family: String,
        #[serde(default)]
        font_weight: FontWeight,
    },
    Image { source: String, width: f32, height: f32 },
    /// Grid of equal cells, each holding its own text. `cells` is row-major.
    Table {
        rows: usize,
        cols: usize,
        cell_width: f32,
        cell_height: f32,
        cells: Vec<String>,
    },
}

impl Shape {
    /// Plain text in the default family and weight.
    pub fn text(text: impl Into<String>, font_size: f32) -> Self {
        Shape::Text {
            text: text.into(),
            font_size,
            font_family: default_font_family(),
            font_weight: FontWeight::Normal,
        }
    }

    /// An empty `rows` x `cols` table.
    pub fn table(rows: usize, cols: usize, cell_width: f32, cell_height: f32) -> Self {
        Shape::Table {
            rows,
            cols,
            cell_width,
            cell_height,
            cells: vec![String::new(); rows * cols],
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Path { .. } => "path",
            Shape::Rect { .. } => "rect",
            Shape::Circle { .. } => "circle",
            Shape::Triangle { .. } => "triangle",
            Shape::Text { .. } => "text",
            Shape::Image { .. } => "image",
            Shape::Table { .. } => "table",
        }
    }

    /// Unscaled bounding size.
    pub fn size(&self) -> (f32, f32) {
        match self {
            Shape::Path { points } => {
                let (mut max_x, mut max_y) = (0.0_f32, 0.0_f32);
                for p in points {
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                (max_x, max_y)
            }
            Shape::Rect { width, height, .. }
            | Shape::Triangle { width, height }
            | Shape::Image { width, height, .. } => (*width, *height),
            Shape::Circle { radius } => (2.0 * radius, 2.0 * radius),
            // Rough advance width; the renderer owns real text metrics.
            Shape::Text {
                text, font_size, ..
            } => (text.chars().count() as f32 * font_size * 0.6, *font_size),
            Shape::Table {
                rows,
                cols,
                cell_width,
                cell_height,
                ..
            } => (*cols as f32 * cell_width, *rows as f32 * cell_height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawableObject {
    pub id: ObjectId,
    pub shape: Shape,
    pub left: f32,
    pub top: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub angle: f32,
    pub stroke: Color32,
    pub stroke_width: f32,
    pub fill: Option<Color32>,
    pub selectable: bool,

    /// Label object that shows this shape's measurements.
    #[serde(default)]
    pub measurement: Option<ObjectId>,
}

impl DrawableObject {
    pub fn new(shape: Shape, left: f32, top: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape,
            left,
            top,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            stroke: Color32::BLACK,
            stroke_width: 2.0,
            fill: None,
            selectable: true,
            measurement: None,
        }
    }

    pub fn with_stroke(mut self, color: Color32, width: f32) -> Self {
        self.stroke = color;
        self.stroke_width = width;
        self
    }

    pub fn with_fill(mut self, fill: Option<Color32>) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale_x = scale;
        self.scale_y = scale;
        self
    }

    pub fn scaled_width(&self) -> f32 {
        self.shape.size().0 * self.scale_x
    }

    pub fn scaled_height(&self) -> f32 {
        self.shape.size().1 * self.scale_y
    }

    /// Measurement label text in centimetres, for shapes that carry one.
    pub fn measurement_text(&self) -> Option<String> {
        let cm = |px: f32| px / PX_PER_CM as f32;
        match &self.shape {
            Shape::Rect {
                fixed_height: true, ..
            } => Some(format!("L: {:.2} cm", cm(self.scaled_width()))),
            Shape::Rect { .. } => Some(format!(
                "L: {:.2} cm, H: {:.2} cm",
                cm(self.scaled_width()),
                cm(self.scaled_height())
            )),
            Shape::Circle { radius } => {
                let r = cm(radius * self.scale_x);
                Some(format!("R: {:.2} cm, D: {:.2} cm", r, 2.0 * r))
            }
            Shape::Triangle { width, height } => {
                let a = cm(width * self.scale_x);
                let b = cm(height * self.scale_y);
                let c = cm((width * width + height * height).sqrt() * self.scale_x);
                Some(format!("A: {:.2} cm, B: {:.2} cm, C: {:.2} cm", a, b, c))
            }
            _ => None,
        }
    }

    /// Where the measurement label is centred: above the middle of the top edge.
    pub fn label_anchor(&self) -> Pos2 {
        Pos2::new(
            self.left + self.scaled_width() / 2.0,
            self.top - LABEL_OFFSET_Y,
        )
    }

    /// Build the label object for this shape, unlinked.
    pub fn make_label(&self) -> Option<DrawableObject> {
        let text = self.measurement_text()?;
        let anchor = self.label_anchor();
        let mut label = DrawableObject::new(Shape::text(text, LABEL_FONT_SIZE), anchor.x, anchor.y)
        .with_stroke(Color32::BLACK, 0.5)
        .with_fill(Some(Color32::BLACK));
        label.selectable = false;
        Some(label)
    }
}
