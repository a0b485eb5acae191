//! Property-based invariant tests for mosaic-core.
//!
//! These tests verify structural invariants that must hold for **any** input:
//!
//! 1. Layout normalization yields exactly `N - 1` entries or a typed error,
//!    and never drops or reorders a tagged entry.
//! 2. Batches are contiguous, disjoint, and cover `1..=N` exactly once.
//! 3. A tile's content is embedded at most once, whatever the event order.
//! 4. Only the live generation of a timer is ever accepted.

use std::collections::BTreeMap;
use std::time::Duration;

use mosaic_core::layout::RawEntry;
use mosaic_core::{
    BatchScheduler, Distribution, Effect, Event, GalleryConfig, LayoutError, MOSAIC_ROWS, Page,
    Theme, TileRect, TimerBank, TimerKind,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const TAGS: [&str; 4] = ["", "", "wide-aspect", "tall-aspect"];

/// A raw entry with valid spans; half of the tags are empty so plenty of
/// entries are trimmable fillers.
fn raw_entry() -> impl Strategy<Value = RawEntry> {
    (1u8..=3, 1u8..=3, 0usize..TAGS.len()).prop_map(|(c, r, t)| (c, r, TAGS[t]))
}

fn rows() -> impl Strategy<Value = Vec<Vec<RawEntry>>> {
    proptest::collection::vec(proptest::collection::vec(raw_entry(), 0..8), 0..8)
}

fn tagged(entries: impl Iterator<Item = (u8, u8, &'static str)>) -> Vec<(u8, u8, &'static str)> {
    entries
        .filter(|&(c, r, tag)| !(c == 1 && r == 1 && tag.is_empty()))
        .collect()
}

fn booted(total: u32, batch_size: u32) -> Page {
    let config = GalleryConfig {
        total_pieces: total,
        batch_size,
        ..GalleryConfig::default()
    };
    let mut page = Page::with_layout(config, &[]).expect("empty table always pads");
    page.dispatch(Event::Boot {
        theme: Theme::Dark,
        viewport_width: 800,
        viewport_height: 600,
        animation_surface: false,
        font_signal: true,
    });
    while !page.state().scheduler().is_exhausted() {
        page.dispatch(Event::SentinelNear);
    }
    page
}

#[derive(Debug, Clone)]
enum LoadOp {
    Near(u32),
    Geometry(Vec<(u32, f64)>),
    Loaded(u32),
}

fn load_op(total: u32) -> impl Strategy<Value = LoadOp> {
    prop_oneof![
        (1..=total + 2).prop_map(LoadOp::Near),
        proptest::collection::vec((1..=total + 2, -800.0f64..1600.0), 0..12)
            .prop_map(LoadOp::Geometry),
        (1..=total + 2).prop_map(LoadOp::Loaded),
    ]
}

#[derive(Debug, Clone, Copy)]
enum TimerOp {
    Schedule,
    Cancel,
    Fire(u64),
    FireLive,
}

fn timer_op() -> impl Strategy<Value = TimerOp> {
    prop_oneof![
        Just(TimerOp::Schedule),
        Just(TimerOp::Cancel),
        (0u64..8).prop_map(TimerOp::Fire),
        Just(TimerOp::FireLive),
    ]
}

// ── Layout ──────────────────────────────────────────────────────────────

proptest! {
    /// The shipped table always pads up; any larger gallery normalizes.
    #[test]
    fn shipped_table_normalizes_for_large_galleries(total in 100u32..2_000) {
        let dist = Distribution::standard(total).unwrap();
        prop_assert_eq!(dist.len(), (total - 1) as usize);
        prop_assert_eq!(dist.total(), total);
    }

    /// Smaller galleries either trim exactly or report the leftover excess.
    #[test]
    fn shipped_table_trims_or_reports(total in 1u32..100) {
        match Distribution::standard(total) {
            Ok(dist) => prop_assert_eq!(dist.len(), (total - 1) as usize),
            Err(LayoutError::ExcessNotTrimmable { excess }) => prop_assert!(excess > 0),
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// Normalization never touches tagged or multi-span entries.
    #[test]
    fn normalization_preserves_tagged_entries(rows in rows(), total in 1u32..80) {
        let borrowed: Vec<&[RawEntry]> = rows.iter().map(Vec::as_slice).collect();
        let sum: usize = rows.iter().map(Vec::len).sum();
        match Distribution::normalize(total, &borrowed) {
            Ok(dist) => {
                prop_assert_eq!(dist.len(), (total - 1) as usize);
                let before = tagged(rows.iter().flatten().copied());
                let after = tagged(
                    dist.entries().iter().map(|e| (e.col_span, e.row_span, e.style_tag)),
                );
                prop_assert_eq!(before, after);
            }
            Err(LayoutError::ExcessNotTrimmable { .. }) => {
                prop_assert!(sum > (total - 1) as usize);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// Every index resolves, and only the last is full width.
    #[test]
    fn every_index_resolves(total in 1u32..300) {
        let dist = Distribution::normalize(total, &[]).unwrap();
        for index in 1..total {
            prop_assert!(matches!(
                dist.layout_for(index),
                mosaic_core::TileLayout::Regular(_)
            ));
        }
        prop_assert_eq!(dist.layout_for(total), mosaic_core::TileLayout::FullWidth);
    }
}

// ── Scheduler ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn batches_cover_every_index_once(total in 0u32..500, batch_size in 0u32..40) {
        let mut scheduler = BatchScheduler::new(total, batch_size);
        let mut seen = Vec::new();
        let mut last = 0;
        while let Some(batch) = scheduler.release(|i| seen.push(i)) {
            prop_assert_eq!(*batch.start(), last + 1);
            prop_assert!(batch.end() - batch.start() < scheduler.batch_size());
            prop_assert!(scheduler.last_released() > last);
            last = scheduler.last_released();
        }
        prop_assert_eq!(seen, (1..=total).collect::<Vec<_>>());
        prop_assert!(scheduler.is_exhausted());
        prop_assert!(scheduler.begin().is_none());
        prop_assert_eq!(
            scheduler.batches_released(),
            total.div_ceil(scheduler.batch_size())
        );
    }

    /// Nested requests while a batch is in flight are rejected.
    #[test]
    fn nested_requests_never_interleave(total in 1u32..200, batch_size in 1u32..20) {
        let mut scheduler = BatchScheduler::new(total, batch_size);
        while let Some(batch) = scheduler.begin() {
            prop_assert!(scheduler.begin().is_none());
            scheduler.complete(batch);
        }
        prop_assert_eq!(scheduler.last_released(), total);
    }
}

// ── Loader ──────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn content_embeds_at_most_once(
        ops in proptest::collection::vec(load_op(30), 0..60),
    ) {
        let mut page = booted(30, 7);
        let mut embeds: BTreeMap<u32, usize> = BTreeMap::new();
        for op in ops {
            let event = match op {
                LoadOp::Near(index) => Event::TileNear { index },
                LoadOp::Geometry(rects) => Event::ScrollGeometry {
                    viewport_height: 600.0,
                    tiles: rects
                        .into_iter()
                        .map(|(index, top)| TileRect::new(index, top, top + 200.0))
                        .collect(),
                },
                LoadOp::Loaded(index) => Event::ContentLoaded { index },
            };
            for effect in page.dispatch(event) {
                if let Effect::EmbedContent(spec) = effect {
                    *embeds.entry(spec.index).or_default() += 1;
                }
            }
        }
        prop_assert!(embeds.values().all(|&n| n == 1));
        prop_assert!(!embeds.contains_key(&30), "distinguished tile ships embedded");
        prop_assert!(embeds.keys().all(|&i| (1..30).contains(&i)));
        prop_assert_eq!(page.state().loader().promotions() as usize, embeds.len());
    }
}

// ── Timers ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn only_live_generation_is_accepted(ops in proptest::collection::vec(timer_op(), 0..40)) {
        let kind = TimerKind::ResizeSettle;
        let mut bank = TimerBank::new();
        let mut fx = Vec::new();
        let mut live: Option<u64> = None;
        for op in ops {
            match op {
                TimerOp::Schedule => {
                    bank.schedule(kind, Duration::from_millis(250), &mut fx);
                    live = Some(bank.generation(kind));
                }
                TimerOp::Cancel => {
                    bank.cancel(kind, &mut fx);
                    live = None;
                }
                TimerOp::Fire(generation) => {
                    let expected = live == Some(generation);
                    prop_assert_eq!(bank.accept(kind, generation), expected);
                    if expected {
                        live = None;
                    }
                }
                TimerOp::FireLive => {
                    let generation = bank.generation(kind);
                    prop_assert_eq!(bank.accept(kind, generation), live.is_some());
                    live = None;
                }
            }
            prop_assert_eq!(bank.is_armed(kind), live.is_some());
        }
    }
}

#[test]
fn shipped_table_has_ninety_nine_entries() {
    let raw: usize = MOSAIC_ROWS.iter().map(|row| row.len()).sum();
    assert_eq!(raw, 99);
}
