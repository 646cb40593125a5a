//! Export naming and image sizing for the board.
//!
//! Three kinds of file leave the board:
//! - the multi-page document (`multi_page_canvas_<epoch-ms>.json`)
//! - the legacy single-page snapshot (`canvas_<epoch-ms>.json`)
//! - a PNG of the current page at twice its pixel size (`canvas_<epoch-ms>.png`)
//!
//! The raster itself comes from the renderer; this module only decides names and target size.

use board_core::PageSize;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// What is being exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    MultiPage,
    SinglePage,
    Image,
}

impl ExportKind {
    /// Get file extension for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::MultiPage | ExportKind::SinglePage => "json",
            ExportKind::Image => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Image export scale relative to the surface's pixel size.
    pub image_multiplier: u32,
    pub multi_page_prefix: String,
    /// Used by both the legacy JSON and the image export.
    pub single_page_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            image_multiplier: 2,
            multi_page_prefix: "multi_page_canvas".into(),
            single_page_prefix: "canvas".into(),
        }
    }
}

impl ExportConfig {
    fn prefix(&self, kind: ExportKind) -> &str {
        match kind {
            ExportKind::MultiPage => &self.multi_page_prefix,
            ExportKind::SinglePage | ExportKind::Image => &self.single_page_prefix,
        }
    }

    /// `<prefix>_<epoch_ms>.<ext>`
    pub fn file_name(&self, kind: ExportKind, epoch_ms: u128) -> String {
        format!("{}_{}.{}", self.prefix(kind), epoch_ms, kind.extension())
    }

    /// Same as `file_name`, stamped with the current time.
    pub fn file_name_now(&self, kind: ExportKind) -> String {
        self.file_name(kind, epoch_millis())
    }

    /// Name for saving the page document: a previously loaded document keeps its name.
    pub fn document_file_name(&self, loaded_name: Option<&str>, epoch_ms: u128) -> String {
        match loaded_name {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => self.file_name(ExportKind::MultiPage, epoch_ms),
        }
    }

    /// Pixel size of the exported image for a page of `size`.
    pub fn image_dimensions(&self, size: PageSize) -> (u32, u32) {
        let m = f64::from(self.image_multiplier);
        (
            (size.width * m).round() as u32,
            (size.height * m).round() as u32,
        )
    }

    /// Validate export configuration (checks for invalid filename characters).
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.image_multiplier == 0 {
            tracing::error!("image multiplier must be at least 1");
            return Err(ExportError::InvalidMultiplier);
        }

        if self.image_multiplier > 8 {
            tracing::warn!(
                image_multiplier = self.image_multiplier,
                "unusually large image multiplier (recommended: 1-4)"
            );
        }

        let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
        for prefix in [&self.multi_page_prefix, &self.single_page_prefix] {
            if prefix.trim().is_empty() {
                return Err(ExportError::InvalidPrefix {
                    prefix: prefix.clone(),
                    reason: "prefix is empty".into(),
                });
            }
            if let Some(ch) = prefix.chars().find(|c| invalid_chars.contains(c)) {
                tracing::error!(
                    prefix = %prefix,
                    invalid_char = %ch,
                    "prefix contains invalid filename character"
                );
                return Err(ExportError::InvalidPrefix {
                    prefix: prefix.clone(),
                    reason: format!("contains invalid character '{}'", ch),
                });
            }
        }

        Ok(())
    }
}

/// Milliseconds since the Unix epoch; 0 if the clock is before it.
pub fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Export configuration errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("image multiplier must be at least 1")]
    InvalidMultiplier,

    #[error("invalid file prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: String },
}
