//! board-core: the contract between the whiteboard state core and the canvas surface.
//!
//! Design rules:
//! - Snapshots are opaque. Only the surface encodes or decodes them.
//! - The surface is passed explicitly, never looked up globally.
//! - Restores may finish later than the call that started them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Pixels per millimetre used for page geometry (96 dpi).
pub const PX_PER_MM: f64 = 3.779527;

/// Pixels per centimetre used for measurement labels.
pub const PX_PER_CM: f64 = 37.7952755906;

/// A4 portrait, in millimetres.
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

/// An encoded capture of the whole object graph on a canvas surface.
///
/// The core stores, clones and compares snapshots but never looks inside.
/// On the page file a snapshot is written as an embedded JSON string; on load
/// an inline JSON object is accepted too and re-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Encoded(String),
            Inline(serde_json::Value),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Encoded(s) => Ok(Snapshot(s)),
            Wire::Inline(value @ serde_json::Value::Object(_)) => {
                Ok(Snapshot(value.to_string()))
            }
            Wire::Inline(other) => Err(serde::de::Error::custom(format!(
                "snapshot must be a string or an object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Pixel dimensions of a page on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Convert a size in millimetres to pixels at `px_per_mm`.
    pub fn from_mm(width_mm: f64, height_mm: f64, px_per_mm: f64) -> Self {
        Self {
            width: width_mm * px_per_mm,
            height: height_mm * px_per_mm,
        }
    }

    /// The blank default page.
    pub fn a4() -> Self {
        Self::from_mm(A4_WIDTH_MM, A4_HEIGHT_MM, PX_PER_MM)
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::a4()
    }
}

/// Outcome of asking a surface to restore a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// The surface shows the snapshot now.
    Complete,
    /// The surface will finish later; poll it before relying on its content.
    Pending,
}

impl Restore {
    pub fn is_pending(self) -> bool {
        matches!(self, Restore::Pending)
    }
}

/// The drawable-object-graph capability the core drives.
pub trait CanvasSurface {
    /// Encode everything currently on the surface.
    fn capture(&self) -> Result<Snapshot, SurfaceError>;

    /// Remove every object.
    fn clear(&mut self);

    /// Replace the surface content with `snapshot`.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<Restore, SurfaceError>;

    /// Reset to an empty page of the given size.
    fn reset_blank(&mut self, size: PageSize);

    /// Report whether the last restore has finished.
    fn poll_restore(&mut self) -> Result<Restore, SurfaceError> {
        Ok(Restore::Complete)
    }
}

/// Errors raised by a canvas surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to encode surface: {0}")]
    Encode(String),

    #[error("malformed snapshot: {0}")]
    Decode(String),

    #[error("restore failed: {0}")]
    RestoreFailed(String),
}
