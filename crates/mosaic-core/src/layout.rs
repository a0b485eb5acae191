//! Mosaic layout distribution.
//!
//! The gallery grid is sized from a fixed, hand-tuned table of rows. Each row
//! holds `(col_span, row_span, style_tag)` triples. Before use the table is
//! normalized to exactly `N - 1` entries; item `N` is always the
//! distinguished full-width tile and never reads the table.
//!
//! # Normalization
//!
//! 1. Count all triples across all rows.
//! 2. Short: append untagged `1x1` fillers to the second-to-last row.
//! 3. Long: walk rows from the second-to-last backwards, and each row from
//!    its last entry to its first, removing untagged `1x1` fillers until the
//!    excess is gone.
//! 4. If fillers run out while still long, the table is rejected with
//!    [`LayoutError::ExcessNotTrimmable`].
//!
//! # Invariants
//!
//! - A successfully built [`Distribution`] for `N` has exactly `N - 1` entries.
//! - Every span is in `1..=3`.
//! - Lookups past the end clamp to the last entry.

use tracing::warn;

use crate::error::LayoutError;

/// Raw `(col_span, row_span, style_tag)` triple as written in a table.
pub type RawEntry = (u8, u8, &'static str);

/// The shipped mosaic: 15 rows, 99 entries, tuned for a 100-piece gallery.
pub const MOSAIC_ROWS: &[&[RawEntry]] = &[
    &[
        (1, 1, "wide-aspect"),
        (2, 1, "ultra-wide"),
        (1, 2, "tall-aspect"),
        (1, 1, ""),
        (2, 1, "short-wide"),
        (1, 1, "square-aspect"),
        (1, 2, "skinny"),
        (1, 1, ""),
    ],
    &[
        (2, 2, "tilted"),
        (1, 1, ""),
        (1, 3, "extra-tall"),
        (2, 1, "super-wide"),
        (1, 1, "tall-aspect"),
        (1, 1, ""),
        (2, 1, "wide-aspect"),
    ],
    &[
        (1, 1, ""),
        (3, 1, "cinema-wide"),
        (1, 2, "extra-tall"),
        (2, 1, "ultra-wide"),
        (1, 1, "square-aspect"),
        (1, 1, "wide-aspect"),
    ],
    &[
        (1, 2, "skinny"),
        (2, 2, ""),
        (1, 1, "tall-aspect"),
        (3, 1, "super-wide"),
        (1, 1, ""),
        (1, 1, "wide-aspect"),
    ],
    &[
        (2, 1, "ultra-wide"),
        (1, 1, ""),
        (1, 3, "super-tall"),
        (2, 1, "wide-aspect"),
        (1, 1, "tall-aspect"),
        (2, 1, "short-wide"),
    ],
    &[
        (1, 1, "square-aspect"),
        (2, 2, "tilted"),
        (1, 2, "extra-tall"),
        (3, 1, "cinema-wide"),
        (1, 1, ""),
    ],
    &[
        (1, 1, "wide-aspect"),
        (1, 2, "skinny"),
        (2, 1, "ultra-wide"),
        (1, 1, ""),
        (2, 2, ""),
        (1, 1, "tall-aspect"),
        (1, 1, "wide-aspect"),
    ],
    &[
        (3, 1, "super-wide"),
        (1, 3, "extra-tall"),
        (2, 1, "wide-aspect"),
        (1, 1, ""),
        (1, 2, "tall-aspect"),
        (2, 1, "short-wide"),
    ],
    &[
        (2, 2, "tilted"),
        (1, 2, "skinny"),
        (3, 1, "cinema-wide"),
        (1, 1, "wide-aspect"),
        (2, 1, "ultra-wide"),
        (1, 2, "extra-tall"),
    ],
    &[
        (1, 3, "super-tall"),
        (2, 1, "wide-aspect"),
        (1, 1, "tall-aspect"),
        (3, 1, "super-wide"),
        (1, 2, "skinny"),
        (2, 1, "ultra-wide"),
        (1, 1, ""),
    ],
    &[
        (2, 1, "short-wide"),
        (1, 1, "square-aspect"),
        (1, 2, "tall-aspect"),
        (3, 2, "panoramic"),
        (1, 1, "wide-aspect"),
        (2, 1, "ultra-wide"),
    ],
    &[
        (1, 2, "extra-tall"),
        (2, 2, ""),
        (1, 1, "tall-aspect"),
        (3, 1, "cinema-wide"),
        (1, 2, "skinny"),
        (1, 1, ""),
    ],
    &[
        (2, 1, "wide-aspect"),
        (1, 3, "super-tall"),
        (2, 1, "ultra-wide"),
        (1, 1, "square-aspect"),
        (3, 1, "super-wide"),
        (1, 1, ""),
    ],
    &[
        (1, 2, "tall-aspect"),
        (2, 1, "short-wide"),
        (1, 1, "wide-aspect"),
        (2, 2, "tilted"),
        (1, 2, "extra-tall"),
        (2, 1, "ultra-wide"),
        (1, 1, ""),
    ],
    &[
        (3, 1, "cinema-wide"),
        (1, 2, "skinny"),
        (2, 1, "wide-aspect"),
        (1, 1, ""),
        (1, 3, "super-tall"),
        (2, 1, "ultra-wide"),
        (1, 1, "tall-aspect"),
        (2, 2, ""),
        (1, 1, "wide-aspect"),
        (1, 1, ""),
    ],
];

const MAX_SPAN: u8 = 3;

/// Named grid span for a `(col, row)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanClass {
    Square2,
    Col2,
    Row2,
    Col3,
    Row3,
}

impl SpanClass {
    /// Map a span pair to its class. Combinations without a named span
    /// (including `1x1` and `3x2`) return `None`.
    #[must_use]
    pub const fn from_spans(col_span: u8, row_span: u8) -> Option<Self> {
        match (col_span, row_span) {
            (2, 2) => Some(Self::Square2),
            (2, 1) => Some(Self::Col2),
            (1, 2) => Some(Self::Row2),
            (3, 1) => Some(Self::Col3),
            (1, 3) => Some(Self::Row3),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_class(self) -> &'static str {
        match self {
            Self::Square2 => "span-2x2",
            Self::Col2 => "span-col-2",
            Self::Row2 => "span-row-2",
            Self::Col3 => "span-col-3",
            Self::Row3 => "span-row-3",
        }
    }
}

/// One normalized layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutEntry {
    pub col_span: u8,
    pub row_span: u8,
    /// Extra presentational class; empty when absent.
    pub style_tag: &'static str,
}

impl LayoutEntry {
    /// Untagged `1x1` entry used to pad or trim the table.
    pub const FILLER: Self = Self {
        col_span: 1,
        row_span: 1,
        style_tag: "",
    };

    #[must_use]
    pub const fn from_raw(raw: RawEntry) -> Self {
        Self {
            col_span: raw.0,
            row_span: raw.1,
            style_tag: raw.2,
        }
    }

    /// Only untagged `1x1` entries may be removed during trimming.
    #[must_use]
    pub fn is_filler(&self) -> bool {
        self.col_span == 1 && self.row_span == 1 && self.style_tag.is_empty()
    }

    #[must_use]
    pub const fn span_class(&self) -> Option<SpanClass> {
        SpanClass::from_spans(self.col_span, self.row_span)
    }
}

/// Resolved layout for one gallery index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileLayout {
    Regular(LayoutEntry),
    /// The final item: spans the whole grid width.
    FullWidth,
}

/// A normalized, flattened layout table for a gallery of `total` items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    total: u32,
    entries: Vec<LayoutEntry>,
}

impl Distribution {
    /// Normalize the shipped [`MOSAIC_ROWS`] table for `total` items.
    pub fn standard(total: u32) -> Result<Self, LayoutError> {
        Self::normalize(total, MOSAIC_ROWS)
    }

    /// Normalize `rows` to exactly `total - 1` entries.
    pub fn normalize(total: u32, rows: &[&[RawEntry]]) -> Result<Self, LayoutError> {
        if total == 0 {
            return Err(LayoutError::EmptyGallery);
        }
        let target = (total - 1) as usize;

        let mut table: Vec<Vec<LayoutEntry>> = Vec::with_capacity(rows.len().max(1));
        for (row_idx, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(row.len());
            for (position, &raw) in row.iter().enumerate() {
                let entry = LayoutEntry::from_raw(raw);
                if !(1..=MAX_SPAN).contains(&entry.col_span)
                    || !(1..=MAX_SPAN).contains(&entry.row_span)
                {
                    return Err(LayoutError::InvalidSpan {
                        row: row_idx,
                        position,
                        col_span: entry.col_span,
                        row_span: entry.row_span,
                    });
                }
                out.push(entry);
            }
            table.push(out);
        }

        let sum: usize = table.iter().map(Vec::len).sum();
        if sum < target {
            if table.is_empty() {
                table.push(Vec::new());
            }
            let pad_row = table.len().saturating_sub(2);
            let missing = target - sum;
            table[pad_row].extend(std::iter::repeat_n(LayoutEntry::FILLER, missing));
        } else if sum > target {
            let excess = sum - target;
            warn!(
                entries = sum,
                target, excess, "layout table too long; trimming 1x1 fillers"
            );
            let removed = trim_fillers(&mut table, excess);
            if removed < excess {
                return Err(LayoutError::ExcessNotTrimmable {
                    excess: excess - removed,
                });
            }
        }

        let entries: Vec<LayoutEntry> = table.into_iter().flatten().collect();
        debug_assert_eq!(entries.len(), target);
        Ok(Self { total, entries })
    }

    /// Number of items `N`, including the distinguished tile.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Normalized entries; always `total - 1` long.
    #[must_use]
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layout for a 1-based gallery index.
    ///
    /// Index `total` is [`TileLayout::FullWidth`]. Other indices read entry
    /// `index - 1`, clamped to the last entry.
    #[must_use]
    pub fn layout_for(&self, index: u32) -> TileLayout {
        if index >= self.total {
            return TileLayout::FullWidth;
        }
        let position = index.saturating_sub(1) as usize;
        let entry = self
            .entries
            .get(position)
            .or_else(|| self.entries.last())
            .copied()
            .unwrap_or(LayoutEntry::FILLER);
        TileLayout::Regular(entry)
    }
}

/// Remove up to `excess` fillers, second-to-last row first, each row back to
/// front. Returns how many were removed.
fn trim_fillers(table: &mut [Vec<LayoutEntry>], excess: usize) -> usize {
    let mut removed = 0;
    let start = table.len().saturating_sub(2);
    for row in table[..=start].iter_mut().rev() {
        let mut j = row.len();
        while j > 0 && removed < excess {
            j -= 1;
            if row[j].is_filler() {
                row.remove(j);
                removed += 1;
            }
        }
        if removed == excess {
            break;
        }
    }
    removed
}
