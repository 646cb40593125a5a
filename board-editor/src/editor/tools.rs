// Drawing tools for the canvas editor.
//
// A tool turns one finished gesture (press, drag, release) into objects on the
// canvas. Recording history afterwards is the caller's job.

use crate::Canvas;
use board_core::PX_PER_CM;
use egui::{Color32, Pos2};
use tracing::{debug, trace, warn};

use super::objects::{DrawableObject, ObjectId, Shape, FIXED_HEIGHT_CM};

/// Default drop point for shapes inserted without a drag.
pub const DEFAULT_INSERT_POS: Pos2 = Pos2::new(150.0, 100.0);

pub const DEFAULT_CIRCLE_RADIUS: f32 = 50.0;
pub const DEFAULT_TRIANGLE_SIZE: f32 = 100.0;

pub const TABLE_CELL_WIDTH: f32 = 60.0;
pub const TABLE_CELL_HEIGHT: f32 = 30.0;

/// Imported images are placed at half size.
pub const IMAGE_IMPORT_SCALE: f32 = 0.5;

pub trait Tool {
    /// Commit the gesture. Returns the id of the main object created, if any.
    fn commit(&self, canvas: &mut Canvas, gesture: &[Pos2]) -> Option<ObjectId>;

    fn name(&self) -> &str;

    fn cursor_size(&self) -> f32 {
        1.0
    }
}

/// Turn absolute gesture points into a path anchored at their top-left corner.
fn stroke_path(gesture: &[Pos2]) -> Option<(Pos2, Vec<Pos2>)> {
    let first = gesture.first()?;
    let (mut min_x, mut min_y) = (first.x, first.y);
    for p in gesture {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
    }
    let origin = Pos2::new(min_x, min_y);
    let points = gesture.iter().map(|p| Pos2::new(p.x - min_x, p.y - min_y)).collect();
    Some((origin, points))
}

#[derive(Debug, Clone)]
pub struct Brush {
    pub size: f32,
    pub color: Color32,
}

impl Brush {
    pub fn new(size: f32, color: Color32) -> Self {
        Self { size, color }
    }
}

impl Tool for Brush {
    fn commit(&self, canvas: &mut Canvas, gesture: &[Pos2]) -> Option<ObjectId> {
        let (origin, points) = stroke_path(gesture)?;
        trace!(
            "Committing brush stroke of {} points with size {} and color {:?}",
            points.len(),
            self.size,
            self.color
        );
        let stroke = DrawableObject::new(Shape::Path { points }, origin.x, origin.y)
            .with_stroke(self.color, self.size);
        Some(canvas.add(stroke))
    }

    fn name(&self) -> &str {
        "Brush"
    }

    fn cursor_size(&self) -> f32 {
        self.size
    }
}

/// Paints over with the canvas background colour.
#[derive(Debug, Clone)]
pub struct Eraser {
    pub size: f32,
}

impl Eraser {
    pub fn new(size: f32) -> Self {
        debug!("Creating Eraser tool with size {}", size);
        Self { size }
    }
}

impl Tool for Eraser {
    fn commit(&self, canvas: &mut Canvas, gesture: &[Pos2]) -> Option<ObjectId> {
        let (origin, points) = stroke_path(gesture)?;
        trace!("Committing eraser stroke of {} points", points.len());
        let stroke = DrawableObject::new(Shape::Path { points }, origin.x, origin.y)
            .with_stroke(canvas.background, self.size);
        Some(canvas.add(stroke))
    }

    fn name(&self) -> &str {
        "Eraser"
    }

    fn cursor_size(&self) -> f32 {
        self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    FixedHeightRectangle,
    Circle,
    Triangle,
}

/// Inserts a shape with a live measurement label.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    pub kind: ShapeKind,
    pub color: Color32,
    pub filled: bool,
}

impl ShapeTool {
    pub fn new(kind: ShapeKind, color: Color32, filled: bool) -> Self {
        Self {
            kind,
            color,
            filled,
        }
    }

    fn build(&self, gesture: &[Pos2]) -> Option<DrawableObject> {
        let fill = if self.filled { Some(self.color) } else { None };

        let object = match self.kind {
            ShapeKind::Rectangle | ShapeKind::FixedHeightRectangle => {
                // Rectangles are dragged out; a click alone draws nothing.
                let start = *gesture.first()?;
                let end = *gesture.last()?;
                let left = start.x.min(end.x);
                let top = start.y.min(end.y);
                let width = (end.x - start.x).abs();

                if self.kind == ShapeKind::FixedHeightRectangle {
                    DrawableObject::new(
                        Shape::Rect {
                            width,
                            height: FIXED_HEIGHT_CM * PX_PER_CM as f32,
                            fixed_height: true,
                        },
                        left,
                        start.y,
                    )
                    .with_fill(None)
                } else {
                    DrawableObject::new(
                        Shape::Rect {
                            width,
                            height: (end.y - start.y).abs(),
                            fixed_height: false,
                        },
                        left,
                        top,
                    )
                    .with_fill(fill)
                }
            }
            ShapeKind::Circle => {
                let at = gesture.first().copied().unwrap_or(DEFAULT_INSERT_POS);
                DrawableObject::new(
                    Shape::Circle {
                        radius: DEFAULT_CIRCLE_RADIUS,
                    },
                    at.x,
                    at.y,
                )
                .with_fill(fill)
            }
            ShapeKind::Triangle => {
                let at = gesture.first().copied().unwrap_or(DEFAULT_INSERT_POS);
                DrawableObject::new(
                    Shape::Triangle {
                        width: DEFAULT_TRIANGLE_SIZE,
                        height: DEFAULT_TRIANGLE_SIZE,
                    },
                    at.x,
                    at.y,
                )
                .with_fill(fill)
            }
        };

        Some(object.with_stroke(self.color, 2.0))
    }
}

impl Tool for ShapeTool {
    fn commit(&self, canvas: &mut Canvas, gesture: &[Pos2]) -> Option<ObjectId> {
        let shape = self.build(gesture)?;
        debug!("Inserting {:?} at ({}, {})", self.kind, shape.left, shape.top);
        Some(canvas.add_measured(shape))
    }

    fn name(&self) -> &str {
        match self.kind {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::FixedHeightRectangle => "Fixed-height rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Triangle => "Triangle",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextTool {
    pub text: String,
    pub font_size: f32,
    pub color: Color32,
}

impl TextTool {
    pub fn new(text: impl Into<String>, font_size: f32, color: Color32) -> Self {
        Self {
            text: text.into(),
            font_size,
            color,
        }
    }
}

impl Tool for TextTool {
    fn commit(&self, canvas: &mut Canvas, gesture: &[Pos2]) -> Option<ObjectId> {
        let at = gesture.first().copied().unwrap_or(DEFAULT_INSERT_POS);
        let text = DrawableObject::new(Shape::text(self.text.clone(), self.font_size), at.x, at.y)
            .with_stroke(self.color, 0.0)
        .with_fill(Some(self.color));
        Some(canvas.add(text))
    }

    fn name(&self) -> &str {
        "Text"
    }

    fn cursor_size(&self) -> f32 {
        self.font_size
    }
}

/// Inserts an empty grid of editable cells.
#[derive(Debug, Clone)]
pub struct TableTool {
    pub rows: usize,
    pub cols: usize,
}

impl TableTool {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

impl Tool for TableTool {
    fn commit(&self, canvas: &mut Canvas, gesture: &[Pos2]) -> Option<ObjectId> {
        if self.rows == 0 || self.cols == 0 {
            warn!("Refusing to insert a {}x{} table", self.rows, self.cols);
            return None;
        }
        let at = gesture.first().copied().unwrap_or(DEFAULT_INSERT_POS);
        let table = DrawableObject::new(
            Shape::table(self.rows, self.cols, TABLE_CELL_WIDTH, TABLE_CELL_HEIGHT),
            at.x,
            at.y,
        )
        .with_stroke(Color32::BLACK, 1.0);
        debug!("Inserting {}x{} table", self.rows, self.cols);
        Some(canvas.add(table))
    }

    fn name(&self) -> &str {
        "Table"
    }
}

/// Place a decoded image on the canvas at the default position, half size.
pub fn place_image(
    canvas: &mut Canvas,
    source: impl Into<String>,
    width: f32,
    height: f32,
) -> ObjectId {
    let image = DrawableObject::new(
        Shape::Image {
            source: source.into(),
            width,
            height,
        },
        DEFAULT_INSERT_POS.x,
        DEFAULT_INSERT_POS.y,
    )
    .with_stroke(Color32::TRANSPARENT, 0.0)
    .with_scale(IMAGE_IMPORT_SCALE);
    debug!("Placed image of {}x{}", width, height);
    canvas.add(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush() {
        let mut canvas = Canvas::default();
        let brush = Brush::new(5.0, Color32::BLACK);

        let id = brush
            .commit(
                &mut canvas,
                &[Pos2::new(10.0, 20.0), Pos2::new(4.0, 30.0), Pos2::new(12.0, 25.0)],
            )
            .unwrap();

        let stroke = canvas.object(id).unwrap();
        assert_eq!((stroke.left, stroke.top), (4.0, 20.0));
        assert_eq!(stroke.stroke, Color32::BLACK);
        assert_eq!(stroke.stroke_width, 5.0);
        match &stroke.shape {
            Shape::Path { points } => assert_eq!(points[0], Pos2::new(6.0, 0.0)),
            other => panic!("expected a path, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_gesture_draws_nothing() {
        let mut canvas = Canvas::default();
        assert!(Brush::new(3.0, Color32::RED).commit(&mut canvas, &[]).is_none());
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_eraser_uses_background() {
        let mut canvas = Canvas::new(100.0, 100.0, Color32::LIGHT_GRAY);
        let id = Eraser::new(8.0)
            .commit(&mut canvas, &[Pos2::new(1.0, 1.0), Pos2::new(2.0, 2.0)])
            .unwrap();
        assert_eq!(canvas.object(id).unwrap().stroke, Color32::LIGHT_GRAY);
    }

    #[test]
    fn test_rectangle_drag_normalises() {
        let mut canvas = Canvas::default();
        let tool = ShapeTool::new(ShapeKind::Rectangle, Color32::BLUE, true);
        let id = tool
            .commit(&mut canvas, &[Pos2::new(100.0, 80.0), Pos2::new(40.0, 20.0)])
            .unwrap();

        let rect = canvas.object(id).unwrap();
        assert_eq!((rect.left, rect.top), (40.0, 20.0));
        assert_eq!(rect.shape.size(), (60.0, 60.0));
        assert_eq!(rect.fill, Some(Color32::BLUE));
        // shape + label
        assert_eq!(canvas.len(), 2);
    }

    #[test]
    fn test_fixed_height_rectangle_is_hollow() {
        let mut canvas = Canvas::default();
        let tool = ShapeTool::new(ShapeKind::FixedHeightRectangle, Color32::RED, true);
        let id = tool
            .commit(&mut canvas, &[Pos2::new(0.0, 50.0), Pos2::new(120.0, 90.0)])
            .unwrap();

        let rect = canvas.object(id).unwrap();
        assert!(rect.fill.is_none());
        let label = canvas.object(rect.measurement.unwrap()).unwrap();
        match &label.shape {
            Shape::Text { text, .. } => assert!(text.starts_with("L: 3.1")),
            other => panic!("expected a text label, got {:?}", other),
        }
    }

    #[test]
    fn test_circle_defaults_to_insert_position() {
        let mut canvas = Canvas::default();
        let tool = ShapeTool::new(ShapeKind::Circle, Color32::GREEN, false);
        let id = tool.commit(&mut canvas, &[]).unwrap();

        let circle = canvas.object(id).unwrap();
        assert_eq!((circle.left, circle.top), (150.0, 100.0));
        assert!(circle.fill.is_none());
        assert!(circle.measurement.is_some());
    }

    #[test]
    fn test_text_and_edit() {
        let mut canvas = Canvas::default();
        let id = TextTool::new("hello", 20.0, Color32::BLACK)
            .commit(&mut canvas, &[Pos2::new(5.0, 5.0)])
            .unwrap();
        canvas.edit_text(id, "bonjour").unwrap();

        match &canvas.object(id).unwrap().shape {
            Shape::Text { text, .. } => assert_eq!(text, "bonjour"),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_table_at_default_position() {
        let mut canvas = Canvas::default();
        let id = TableTool::new(3, 4).commit(&mut canvas, &[]).unwrap();

        let table = canvas.object(id).unwrap();
        assert_eq!((table.left, table.top), (150.0, 100.0));
        assert_eq!(table.shape.size(), (240.0, 90.0));
        assert!(table.fill.is_none());
        assert!(table.measurement.is_none());
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn test_empty_table_is_refused() {
        let mut canvas = Canvas::default();
        assert!(TableTool::new(0, 3).commit(&mut canvas, &[]).is_none());
        assert!(TableTool::new(2, 0).commit(&mut canvas, &[]).is_none());
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_place_image_half_size() {
        let mut canvas = Canvas::default();
        let id = place_image(&mut canvas, "data:image/png;base64,AAAA", 400.0, 200.0);
        let image = canvas.object(id).unwrap();
        assert_eq!(image.scaled_width(), 200.0);
        assert_eq!(image.scaled_height(), 100.0);
        assert_eq!((image.left, image.top), (150.0, 100.0));
    }
}
