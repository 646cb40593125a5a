//! Board configuration: blank-page geometry and export settings.
//!
//! Every field has a default, so a config file only needs the values it changes.

use anyhow::Context;
use board_core::{PageSize, A4_HEIGHT_MM, A4_WIDTH_MM, PX_PER_MM};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::export::{ExportConfig, ExportError};

/// Size of a blank page, in millimetres, and the pixel density used to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub px_per_mm: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width_mm: A4_WIDTH_MM,
            height_mm: A4_HEIGHT_MM,
            px_per_mm: PX_PER_MM,
        }
    }
}

impl PageGeometry {
    pub fn page_size(&self) -> PageSize {
        PageSize::from_mm(self.width_mm, self.height_mm, self.px_per_mm)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("width_mm", self.width_mm),
            ("height_mm", self.height_mm),
            ("px_per_mm", self.px_per_mm),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                tracing::error!(
                    field = name,
                    value = value,
                    "page geometry value must be a positive finite number"
                );
                return Err(ConfigError::InvalidGeometry {
                    field: name.to_string(),
                    value,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub page: PageGeometry,
    pub export: ExportConfig,
}

impl BoardConfig {
    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        tracing::debug!("validating board configuration");
        self.page.validate()?;
        self.export.validate()?;
        Ok(())
    }

    /// Pixel size of a blank page.
    pub fn page_size(&self) -> PageSize {
        self.page.page_size()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid page geometry '{field}': {value} (must be positive and finite)")]
    InvalidGeometry { field: String, value: f64 },

    #[error("invalid export settings: {0}")]
    Export(#[from] ExportError),
}

/// Load and validate a board configuration from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<BoardConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config file: {}", path.display()))?;
    let config: BoardConfig = serde_json::from_str(&data).context("parse config json")?;
    config
        .validate()
        .with_context(|| format!("validate config file: {}", path.display()))?;
    Ok(config)
}
