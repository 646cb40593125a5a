// In-memory canvas surface for the board.
// Holds the live object list of the current page; snapshots are its JSON encoding.

use board_core::{CanvasSurface, PageSize, Restore, Snapshot, SurfaceError};
use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::objects::{DrawableObject, FontWeight, ObjectId, Shape};

/// Encoding version written into every snapshot.
pub const CANVAS_DOCUMENT_VERSION: u32 = 1;

/// Duplicates are placed this far right and down from the original.
pub const DUPLICATE_OFFSET: f32 = 30.0;

/// The encoded form of a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    pub version: u32,
    pub background: Color32,
    pub width: f32,
    pub height: f32,
    pub objects: Vec<DrawableObject>,
}

/// One change to the style of a text object.
#[derive(Debug, Clone, PartialEq)]
pub enum TextStyle {
    Family(String),
    Size(f32),
    Weight(FontWeight),
    Color(Color32),
}

#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub background: Color32,
    objects: Vec<DrawableObject>,

    // Deferred restores stay in `pending` until the host completes them.
    deferred: bool,
    pending: Option<CanvasDocument>,
}

impl Canvas {
    pub fn new(width: f32, height: f32, background: Color32) -> Self {
        info!(
            "Creating new canvas of size {}x{} with background color {:?}",
            width, height, background
        );

        Self {
            width,
            height,
            background,
            objects: Vec::new(),
            deferred: false,
            pending: None,
        }
    }

    /// A canvas whose restores complete only when `complete_pending_restore` is called.
    pub fn deferred() -> Self {
        let mut canvas = Self::default();
        canvas.deferred = true;
        canvas
    }

    pub fn from_page_size(size: PageSize) -> Self {
        Canvas::new(size.width as f32, size.height as f32, Color32::WHITE)
    }

    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object(&self, id: ObjectId) -> Option<&DrawableObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DrawableObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    fn position(&self, id: ObjectId) -> Result<usize, CanvasError> {
        self.objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(CanvasError::UnknownObject { id })
    }

    // Add an object on top of the stack
    pub fn add(&mut self, object: DrawableObject) -> ObjectId {
        let id = object.id;
        trace!("Adding {} object {}", object.shape.type_name(), id);
        self.objects.push(object);
        id
    }

    /// Add a shape together with its measurement label. Returns the shape id.
    pub fn add_measured(&mut self, mut shape: DrawableObject) -> ObjectId {
        if let Some(label) = shape.make_label() {
            shape.measurement = Some(label.id);
            let id = self.add(shape);
            self.add(label);
            id
        } else {
            self.add(shape)
        }
    }

    /// Remove an object and the measurement label attached to it.
    pub fn remove(&mut self, id: ObjectId) -> Result<DrawableObject, CanvasError> {
        let index = self.position(id)?;
        let removed = self.objects.remove(index);

        if let Some(label_id) = removed.measurement {
            if let Ok(label_index) = self.position(label_id) {
                self.objects.remove(label_index);
                trace!("Removed measurement label {}", label_id);
            }
        }

        debug!("Removed {} object {}", removed.shape.type_name(), id);
        Ok(removed)
    }

    /// Remove only the measurement label of `id`.
    pub fn remove_measurement(&mut self, id: ObjectId) -> Result<(), CanvasError> {
        let index = self.position(id)?;
        let label_id = self.objects[index]
            .measurement
            .take()
            .ok_or(CanvasError::NoMeasurement { id })?;

        if let Ok(label_index) = self.position(label_id) {
            self.objects.remove(label_index);
        }
        debug!("Removed measurement label of {}", id);
        Ok(())
    }

    /// Copy an object, offset down and right. Its measurement label is cloned and relinked.
    pub fn duplicate(&mut self, id: ObjectId) -> Result<ObjectId, CanvasError> {
        let original = self.objects[self.position(id)?].clone();

        let mut copy = original.clone();
        copy.id = uuid::Uuid::new_v4();
        copy.left += DUPLICATE_OFFSET;
        copy.top += DUPLICATE_OFFSET;
        copy.measurement = None;

        let copy_id = if original.measurement.is_some() {
            self.add_measured(copy)
        } else {
            self.add(copy)
        };

        debug!("Duplicated object {} as {}", id, copy_id);
        Ok(copy_id)
    }

    /// Move an object; its measurement label follows.
    pub fn move_object(&mut self, id: ObjectId, left: f32, top: f32) -> Result<(), CanvasError> {
        let index = self.position(id)?;
        self.objects[index].left = left;
        self.objects[index].top = top;
        self.refresh_measurement(id)
    }

    /// Scale an object; its measurement label is recomputed.
    pub fn scale_object(
        &mut self,
        id: ObjectId,
        scale_x: f32,
        scale_y: f32,
    ) -> Result<(), CanvasError> {
        let index = self.position(id)?;
        self.objects[index].scale_x = scale_x;
        self.objects[index].scale_y = scale_y;
        self.refresh_measurement(id)
    }

    /// Recompute the label text and position of `id`, if it has one.
    pub fn refresh_measurement(&mut self, id: ObjectId) -> Result<(), CanvasError> {
        let shape = &self.objects[self.position(id)?];
        let Some(label_id) = shape.measurement else {
            return Ok(());
        };
        let (Some(text), anchor) = (shape.measurement_text(), shape.label_anchor()) else {
            return Ok(());
        };

        match self.get_mut(label_id) {
            Some(label) => {
                if let Shape::Text { text: current, .. } = &mut label.shape {
                    *current = text;
                }
                label.left = anchor.x;
                label.top = anchor.y;
                label.angle = 0.0;
                Ok(())
            }
            None => {
                warn!("Measurement label {} of {} is missing", label_id, id);
                Ok(())
            }
        }
    }

    /// Replace the text of a text object.
    pub fn edit_text(&mut self, id: ObjectId, new_text: impl Into<String>) -> Result<(), CanvasError> {
        let index = self.position(id)?;
        match &mut self.objects[index].shape {
            Shape::Text { text, .. } => {
                *text = new_text.into();
                Ok(())
            }
            other => Err(CanvasError::NotText {
                id,
                kind: other.type_name(),
            }),
        }
    }

    /// Change one style property of a text object.
    pub fn set_text_style(&mut self, id: ObjectId, style: TextStyle) -> Result<(), CanvasError> {
        let index = self.position(id)?;
        let object = &mut self.objects[index];
        let kind = object.shape.type_name();
        let Shape::Text {
            font_size,
            font_family,
            font_weight,
            ..
        } = &mut object.shape
        else {
            return Err(CanvasError::NotText { id, kind });
        };

        trace!("Setting {:?} on text {}", style, id);
        match style {
            TextStyle::Family(family) => *font_family = family,
            TextStyle::Size(size) => {
                if !size.is_finite() || size <= 0.0 {
                    return Err(CanvasError::InvalidFontSize { size });
                }
                *font_size = size;
            }
            TextStyle::Weight(weight) => *font_weight = weight,
            TextStyle::Color(color) => {
                object.stroke = color;
                object.fill = Some(color);
            }
        }
        Ok(())
    }

    /// Replace the text of one table cell.
    pub fn edit_cell(
        &mut self,
        id: ObjectId,
        row: usize,
        col: usize,
        new_text: impl Into<String>,
    ) -> Result<(), CanvasError> {
        let index = self.position(id)?;
        match &mut self.objects[index].shape {
            Shape::Table {
                rows, cols, cells, ..
            } => {
                if row >= *rows || col >= *cols {
                    return Err(CanvasError::CellOutOfRange { id, row, col });
                }
                cells[row * *cols + col] = new_text.into();
                Ok(())
            }
            other => Err(CanvasError::NotTable {
                id,
                kind: other.type_name(),
            }),
        }
    }

    /// Drop every object and go back to a white background.
    pub fn wipe(&mut self) {
        info!("Clearing canvas");
        self.objects.clear();
        self.background = Color32::WHITE;
    }

    /// Apply a deferred restore. Returns false when nothing was pending.
    pub fn complete_pending_restore(&mut self) -> bool {
        match self.pending.take() {
            Some(doc) => {
                self.apply(doc);
                true
            }
            None => false,
        }
    }

    pub fn has_pending_restore(&self) -> bool {
        self.pending.is_some()
    }

    fn apply(&mut self, doc: CanvasDocument) {
        debug!("Restoring canvas with {} objects", doc.objects.len());
        self.width = doc.width;
        self.height = doc.height;
        self.background = doc.background;
        self.objects = doc.objects;
    }

    pub fn document(&self) -> CanvasDocument {
        CanvasDocument {
            version: CANVAS_DOCUMENT_VERSION,
            background: self.background,
            width: self.width,
            height: self.height,
            objects: self.objects.clone(),
        }
    }
}

impl CanvasSurface for Canvas {
    fn capture(&self) -> Result<Snapshot, SurfaceError> {
        let encoded = serde_json::to_string(&self.document())
            .map_err(|e| SurfaceError::Encode(e.to_string()))?;
        trace!("Captured snapshot of {} bytes", encoded.len());
        Ok(Snapshot::from_encoded(encoded))
    }

    fn clear(&mut self) {
        self.objects.clear();
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<Restore, SurfaceError> {
        let doc: CanvasDocument = serde_json::from_str(snapshot.as_str())
            .map_err(|e| SurfaceError::Decode(e.to_string()))?;

        if doc.version > CANVAS_DOCUMENT_VERSION {
            return Err(SurfaceError::Decode(format!(
                "unsupported canvas document version {}",
                doc.version
            )));
        }

        if self.deferred {
            self.pending = Some(doc);
            return Ok(Restore::Pending);
        }

        self.apply(doc);
        Ok(Restore::Complete)
    }

    fn reset_blank(&mut self, size: PageSize) {
        debug!("Resetting canvas to blank {}x{} page", size.width, size.height);
        self.objects.clear();
        self.width = size.width as f32;
        self.height = size.height as f32;
        self.background = Color32::WHITE;
    }

    fn poll_restore(&mut self) -> Result<Restore, SurfaceError> {
        if self.pending.is_some() {
            Ok(Restore::Pending)
        } else {
            Ok(Restore::Complete)
        }
    }
}

// A4 portrait, white
impl Default for Canvas {
    fn default() -> Self {
        Canvas::from_page_size(PageSize::a4())
    }
}

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("no object with id {id}")]
    UnknownObject { id: ObjectId },

    #[error("object {id} has no measurement label")]
    NoMeasurement { id: ObjectId },

    #[error("object {id} is a {kind}, not text")]
    NotText { id: ObjectId, kind: &'static str },

    #[error("object {id} is a {kind}, not a table")]
    NotTable { id: ObjectId, kind: &'static str },

    #[error("table {id} has no cell at row {row}, column {col}")]
    CellOutOfRange { id: ObjectId, row: usize, col: usize },

    #[error("font size must be positive, got {size}")]
    InvalidFontSize { size: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: f32, top: f32) -> DrawableObject {
        DrawableObject::new(
            Shape::Rect {
                width: 100.0,
                height: 50.0,
                fixed_height: false,
            },
            left,
            top,
        )
    }

    #[test]
    fn test_capture_restore_roundtrip() {
        let mut canvas = Canvas::default();
        canvas.add_measured(rect(10.0, 10.0));
        let snap = canvas.capture().unwrap();

        let mut other = Canvas::new(10.0, 10.0, Color32::BLACK);
        assert_eq!(other.restore(&snap).unwrap(), Restore::Complete);
        assert_eq!(other.objects(), canvas.objects());
        assert_eq!(other.background, Color32::WHITE);
        assert_eq!(other.capture().unwrap(), snap);
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let mut canvas = Canvas::default();
        canvas.add(rect(0.0, 0.0));
        let err = canvas
            .restore(&Snapshot::from_encoded("not json"))
            .unwrap_err();
        assert!(matches!(err, SurfaceError::Decode(_)));
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn test_remove_takes_label_along() {
        let mut canvas = Canvas::default();
        let id = canvas.add_measured(rect(0.0, 40.0));
        assert_eq!(canvas.len(), 2);

        canvas.remove(id).unwrap();
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_remove_measurement_keeps_shape() {
        let mut canvas = Canvas::default();
        let id = canvas.add_measured(rect(0.0, 40.0));
        canvas.remove_measurement(id).unwrap();

        assert_eq!(canvas.len(), 1);
        assert!(canvas.object(id).unwrap().measurement.is_none());
        assert!(matches!(
            canvas.remove_measurement(id),
            Err(CanvasError::NoMeasurement { .. })
        ));
    }

    #[test]
    fn test_duplicate_offsets_and_relinks_label() {
        let mut canvas = Canvas::default();
        let id = canvas.add_measured(rect(10.0, 40.0));
        let copy = canvas.duplicate(id).unwrap();

        assert_eq!(canvas.len(), 4);
        let original = canvas.object(id).unwrap().clone();
        let dup = canvas.object(copy).unwrap().clone();
        assert_eq!(dup.left, 40.0);
        assert_eq!(dup.top, 70.0);
        assert_ne!(dup.measurement, original.measurement);

        let label = canvas.object(dup.measurement.unwrap()).unwrap();
        assert_eq!(label.left, dup.left + 50.0);
        assert_eq!(label.top, dup.top - 20.0);
    }

    #[test]
    fn test_move_updates_label() {
        let mut canvas = Canvas::default();
        let id = canvas.add_measured(rect(0.0, 40.0));
        canvas.move_object(id, 200.0, 300.0).unwrap();

        let label_id = canvas.object(id).unwrap().measurement.unwrap();
        let label = canvas.object(label_id).unwrap();
        assert_eq!(label.left, 250.0);
        assert_eq!(label.top, 280.0);
    }

    #[test]
    fn test_edit_text_rejects_shapes() {
        let mut canvas = Canvas::default();
        let id = canvas.add(rect(0.0, 0.0));
        assert!(matches!(
            canvas.edit_text(id, "hi"),
            Err(CanvasError::NotText { kind: "rect", .. })
        ));
    }

    #[test]
    fn test_text_style_edits() {
        let mut canvas = Canvas::default();
        let id = canvas.add(DrawableObject::new(Shape::text("title", 20.0), 0.0, 0.0));

        canvas
            .set_text_style(id, TextStyle::Family("Courier New".into()))
            .unwrap();
        canvas.set_text_style(id, TextStyle::Size(32.0)).unwrap();
        canvas
            .set_text_style(id, TextStyle::Weight(FontWeight::Bold))
            .unwrap();
        canvas
            .set_text_style(id, TextStyle::Color(Color32::RED))
            .unwrap();

        let text = canvas.object(id).unwrap();
        assert_eq!(text.fill, Some(Color32::RED));
        match &text.shape {
            Shape::Text {
                font_size,
                font_family,
                font_weight,
                ..
            } => {
                assert_eq!(*font_size, 32.0);
                assert_eq!(font_family, "Courier New");
                assert_eq!(*font_weight, FontWeight::Bold);
            }
            other => panic!("expected text, got {:?}", other),
        }

        assert!(matches!(
            canvas.set_text_style(id, TextStyle::Size(0.0)),
            Err(CanvasError::InvalidFontSize { .. })
        ));
        let shape_id = canvas.add(rect(0.0, 0.0));
        assert!(matches!(
            canvas.set_text_style(shape_id, TextStyle::Size(12.0)),
            Err(CanvasError::NotText { kind: "rect", .. })
        ));
    }

    #[test]
    fn test_edit_cell() {
        let mut canvas = Canvas::default();
        let id = canvas.add(DrawableObject::new(Shape::table(2, 2, 60.0, 30.0), 0.0, 0.0));

        canvas.edit_cell(id, 1, 0, "total").unwrap();
        match &canvas.object(id).unwrap().shape {
            Shape::Table { cells, .. } => assert_eq!(cells, &["", "", "total", ""]),
            other => panic!("expected a table, got {:?}", other),
        }

        assert!(matches!(
            canvas.edit_cell(id, 2, 0, "x"),
            Err(CanvasError::CellOutOfRange { row: 2, .. })
        ));
        let shape_id = canvas.add(rect(0.0, 0.0));
        assert!(matches!(
            canvas.edit_cell(shape_id, 0, 0, "x"),
            Err(CanvasError::NotTable { .. })
        ));
    }

    #[test]
    fn test_deferred_restore_waits_for_completion() {
        let mut source = Canvas::default();
        source.add(rect(1.0, 2.0));
        let snap = source.capture().unwrap();

        let mut canvas = Canvas::deferred();
        assert_eq!(canvas.restore(&snap).unwrap(), Restore::Pending);
        assert!(canvas.is_empty());
        assert_eq!(canvas.poll_restore().unwrap(), Restore::Pending);

        assert!(canvas.complete_pending_restore());
        assert_eq!(canvas.poll_restore().unwrap(), Restore::Complete);
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn test_wipe_resets_background() {
        let mut canvas = Canvas::new(100.0, 100.0, Color32::RED);
        canvas.add(rect(0.0, 0.0));
        canvas.wipe();
        assert!(canvas.is_empty());
        assert_eq!(canvas.background, Color32::WHITE);
    }
}
