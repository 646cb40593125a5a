// Editor module for the board: live canvas, drawing tools, undo/redo.

pub mod canvas;
pub mod history;
pub mod objects;
pub mod tools;

pub use canvas::{Canvas, CanvasDocument, CanvasError, TextStyle};
pub use history::{Direction, HistoryError, HistoryManager};
pub use objects::{DrawableObject, FontWeight, ObjectId, Shape};
pub use tools::{place_image, Brush, Eraser, ShapeKind, ShapeTool, TableTool, TextTool, Tool};
