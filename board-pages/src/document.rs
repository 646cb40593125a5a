//! Page document files.
//!
//! A document is the JSON array produced by `PageManager::save_all`. This
//! module moves it to and from disk and remembers which file a document came
//! from, so that saving again overwrites it instead of minting a new name.

use anyhow::Context;
use serde::de::IgnoredAny;
use std::fs;
use std::path::{Path, PathBuf};

use board_core::CanvasSurface;

use crate::export::{epoch_millis, ExportConfig};
use crate::manager::PageManager;
use crate::{Page, PageError};

/// File extension of page documents.
pub const DOCUMENT_FILE_EXT: &str = "json";

/// Decode a page document. Nothing partial: either every entry decodes or the whole load fails.
pub fn decode_pages(json: &str) -> Result<Vec<Page>, PageError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| PageError::Format(format!("not valid JSON: {e}")))?;

    if !value.is_array() {
        return Err(PageError::Format("expected an array of pages".into()));
    }

    let pages: Vec<Page> =
        serde_json::from_value(value).map_err(|e| PageError::Format(e.to_string()))?;

    if pages.is_empty() {
        return Err(PageError::Format("document has no pages".into()));
    }

    for (i, page) in pages.iter().enumerate() {
        if pages[..i].iter().any(|other| other.name == page.name) {
            return Err(PageError::Format(format!(
                "page name '{}' appears more than once",
                page.name
            )));
        }
        if let Some(snapshot) = &page.canvas_state {
            serde_json::from_str::<IgnoredAny>(snapshot.as_str()).map_err(|e| {
                PageError::Format(format!("page '{}' has an unreadable canvas: {e}", page.name))
            })?;
        }
    }

    Ok(pages)
}

/// Encode pages as a page document.
pub fn encode_pages(pages: &[Page]) -> Result<String, PageError> {
    serde_json::to_string(pages).map_err(|e| PageError::Format(e.to_string()))
}

/// Save pages to disk as pretty JSON.
pub fn save_document(path: impl AsRef<Path>, pages: &[Page]) -> anyhow::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        // fs::write does NOT create directories
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent dir: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(pages).context("serialize pages to json")?;
    fs::write(path, json).with_context(|| format!("write document file: {}", path.display()))?;
    tracing::info!(path = %path.display(), pages = pages.len(), "document saved");
    Ok(())
}

/// Load pages from disk.
pub fn load_document(path: impl AsRef<Path>) -> anyhow::Result<Vec<Page>> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read document file: {}", path.display()))?;
    let pages = decode_pages(&data).context("parse document json")?;
    tracing::info!(path = %path.display(), pages = pages.len(), "document loaded");
    Ok(pages)
}

/// Where a document is saved, tracking the file it was loaded from.
#[derive(Debug, Clone, Default)]
pub struct DocumentFile {
    loaded_from: Option<PathBuf>,
}

impl DocumentFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document into `board`. The file name is remembered for later
    /// saves only once the board has accepted the document.
    pub fn open<S: CanvasSurface>(
        &mut self,
        path: impl AsRef<Path>,
        board: &mut PageManager<S>,
    ) -> anyhow::Result<()> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("read document file: {}", path.display()))?;
        board
            .load_all(&data)
            .with_context(|| format!("load document file: {}", path.display()))?;
        self.loaded_from = Some(path.to_path_buf());
        Ok(())
    }

    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Target path for saving into `dir`: the loaded file name if any, else a fresh timestamped one.
    pub fn save_path(&self, dir: impl AsRef<Path>, export: &ExportConfig) -> PathBuf {
        let loaded_name = self
            .loaded_from
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str());
        dir.as_ref()
            .join(export.document_file_name(loaded_name, epoch_millis()))
    }

    /// Save `pages` into `dir`. Returns the path written.
    pub fn save(
        &self,
        dir: impl AsRef<Path>,
        export: &ExportConfig,
        pages: &[Page],
    ) -> anyhow::Result<PathBuf> {
        let path = self.save_path(dir, export);
        save_document(&path, pages)?;
        Ok(path)
    }
}
