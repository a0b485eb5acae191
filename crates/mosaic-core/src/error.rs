//! Error types for configuration, layout normalization, and preference storage.

use thiserror::Error;

/// Failure to turn a raw span table into exactly `N - 1` layout entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The gallery has no items at all, so there is no distinguished tile.
    #[error("gallery must contain at least one item")]
    EmptyGallery,
    /// The table holds more entries than `N - 1` and not enough untagged
    /// `1x1` fillers exist to trim it down.
    #[error("layout table exceeds its target by {excess} entries with no 1x1 fillers left to remove")]
    ExcessNotTrimmable { excess: usize },
    /// A span outside `1..=3` was found in the table.
    #[error("invalid span {col_span}x{row_span} at row {row}, position {position}")]
    InvalidSpan {
        row: usize,
        position: usize,
        col_span: u8,
        row_span: u8,
    },
}

/// Top-level error for building a gallery session.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The layout table could not be normalized.
    #[error("layout table: {0}")]
    Layout(#[from] LayoutError),
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    Config(String),
    /// The host-provided configuration is not valid JSON for [`crate::GalleryConfig`].
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent preference store failures.
///
/// These are never fatal: callers log them and fall back to the default theme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    /// The backing store is missing (private browsing, disabled storage).
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
    /// The store rejected a read or write.
    #[error("preference store rejected {op}: {reason}")]
    Rejected { op: &'static str, reason: String },
}
