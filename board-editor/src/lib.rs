//! board-editor: the live side of the whiteboard.
//!
//! - `editor::history` keeps the snapshot log behind undo/redo.
//! - `editor::canvas` is an in-memory canvas surface (object list + background).
//! - `editor::tools` commits brush, eraser, shape, table and text gestures to it.

pub mod editor;
pub mod logging;

pub use editor::{
    place_image, Brush, Canvas, CanvasDocument, CanvasError, Direction, DrawableObject, Eraser,
    FontWeight, HistoryError, HistoryManager, ObjectId, Shape, ShapeKind, ShapeTool, TableTool,
    TextStyle, TextTool, Tool,
};
