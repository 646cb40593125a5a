//! board-pages: the multi-page document model of the whiteboard.
//!
//! Design rules:
//! - Only the current page is live on the canvas surface; every other page lives in its snapshot.
//! - A page's snapshot is captured lazily, when navigating away from it.
//! - Ids are dense (1..N). Default names follow their id; custom names never change.
//! - Every structural change ends with a history record.
//! - All structs are serializable for document save/load.

use board_core::{Snapshot, SurfaceError};
use board_editor::HistoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of auto-generated page names ("Page 1", "Page 2", ...).
pub const DEFAULT_PAGE_NAME_PREFIX: &str = "Page";

/// The auto-generated name for the page with this id.
pub fn default_page_name(id: u32) -> String {
    format!("{} {}", DEFAULT_PAGE_NAME_PREFIX, id)
}

/// One independently navigable drawing surface.
///
/// On the wire: `{ "id": 1, "name": "Page 1", "canvasState": "<snapshot>" | null }`.
/// Every field is required on load; `canvasState` may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: u32,
    pub name: String,

    /// `None` until the page has been left at least once.
    #[serde(deserialize_with = "Option::deserialize")]
    pub canvas_state: Option<Snapshot>,
}

impl Page {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: default_page_name(id),
            canvas_state: None,
        }
    }

    /// True when the name is still the auto-generated one for `id`.
    pub fn has_default_name_for(&self, id: u32) -> bool {
        self.name == default_page_name(id)
    }
}

/// Page-level errors. All of them are reported before anything changes.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("page index {index} out of range (page count: {count})")]
    InvalidPageIndex { index: usize, count: usize },

    #[error("a page named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("page name cannot be empty")]
    EmptyName,

    #[error("cannot delete the last remaining page")]
    MinimumPageCount,

    #[error("invalid page document: {0}")]
    Format(String),

    #[error("already on the first page")]
    NoPreviousPage,

    #[error("already on the last page")]
    NoNextPage,

    #[error("a canvas restore is still in progress")]
    RestoreInFlight,

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub mod config;
pub mod document;
pub mod export;
pub mod manager;

pub use config::{load_config, BoardConfig, ConfigError, PageGeometry};
pub use document::{load_document, save_document, DocumentFile, DOCUMENT_FILE_EXT};
pub use export::{ExportConfig, ExportError, ExportKind};
pub use manager::PageManager;
