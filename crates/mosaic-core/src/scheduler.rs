//! Batch scheduler: releases tiles into the container in fixed-size groups.
//!
//! # State machine
//!
//! ```text
//!   Idle ──release request──▶ Releasing ──batch emitted──▶ Idle
//!    │                                                      │
//!    └──── last_released == total ◀─────────────────────────┘ (Exhausted)
//! ```
//!
//! A request is a no-op while a batch is in flight or once every index has
//! been released. Releasing is split into [`BatchScheduler::begin`] and
//! [`BatchScheduler::complete`] so the caller can emit tiles between the two
//! while the in-flight flag rejects nested requests.
//!
//! # Invariants
//!
//! - `last_released` never decreases and never exceeds `total`.
//! - Batches are contiguous, disjoint, and cover `1..=total` in order.
//! - After exhaustion every request returns `None`.

use core::ops::RangeInclusive;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchScheduler {
    total: u32,
    batch_size: u32,
    last_released: u32,
    in_flight: bool,
    batches: u32,
}

impl BatchScheduler {
    /// `batch_size` of zero is treated as one.
    #[must_use]
    pub fn new(total: u32, batch_size: u32) -> Self {
        Self {
            total,
            batch_size: batch_size.max(1),
            last_released: 0,
            in_flight: false,
            batches: 0,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub const fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Highest index released so far (`0` before the first batch).
    #[must_use]
    pub const fn last_released(&self) -> u32 {
        self.last_released
    }

    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.last_released >= self.total
    }

    /// Completed batches.
    #[must_use]
    pub const fn batches_released(&self) -> u32 {
        self.batches
    }

    /// Claim the next batch. Returns `None` when a batch is already in flight
    /// or the scheduler is exhausted.
    pub fn begin(&mut self) -> Option<RangeInclusive<u32>> {
        if self.in_flight || self.is_exhausted() {
            return None;
        }
        self.in_flight = true;
        let start = self.last_released + 1;
        let end = self
            .last_released
            .saturating_add(self.batch_size)
            .min(self.total);
        Some(start..=end)
    }

    /// Commit a batch claimed by [`Self::begin`].
    ///
    /// A range that does not continue the cursor is ignored, which keeps
    /// `last_released` monotone even if a caller passes a stale range.
    pub fn complete(&mut self, batch: RangeInclusive<u32>) {
        if !self.in_flight {
            return;
        }
        self.in_flight = false;
        if *batch.start() != self.last_released + 1 || *batch.end() > self.total {
            return;
        }
        self.last_released = *batch.end();
        self.batches += 1;
        debug!(
            batch = self.batches,
            first = *batch.start(),
            last = *batch.end(),
            exhausted = self.is_exhausted(),
            "released batch"
        );
    }

    /// Release one batch, calling `create` for every index in it.
    pub fn release<F: FnMut(u32)>(&mut self, mut create: F) -> Option<RangeInclusive<u32>> {
        let batch = self.begin()?;
        for index in batch.clone() {
            create(index);
        }
        self.complete(batch.clone());
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn hundred_items_release_in_seven_batches() {
        let mut scheduler = BatchScheduler::new(100, 15);
        let mut batches = Vec::new();
        while let Some(batch) = scheduler.release(|_| {}) {
            batches.push((*batch.start(), *batch.end()));
        }
        assert_eq!(
            batches,
            vec![
                (1, 15),
                (16, 30),
                (31, 45),
                (46, 60),
                (61, 75),
                (76, 90),
                (91, 100)
            ]
        );
        assert!(scheduler.is_exhausted());
        assert_eq!(scheduler.batches_released(), 7);
    }

    #[test]
    fn release_visits_every_index_once() {
        let mut scheduler = BatchScheduler::new(23, 5);
        let mut seen = Vec::new();
        while scheduler.release(|i| seen.push(i)).is_some() {}
        assert_eq!(seen, (1..=23).collect::<Vec<_>>());
    }

    #[test]
    fn nested_request_is_rejected_while_in_flight() {
        let mut scheduler = BatchScheduler::new(30, 10);
        let batch = scheduler.begin().unwrap();
        assert!(scheduler.in_flight());
        assert_eq!(scheduler.begin(), None);
        scheduler.complete(batch);
        assert_eq!(scheduler.last_released(), 10);
        assert_eq!(scheduler.begin(), Some(11..=20));
    }

    #[test]
    fn exhausted_scheduler_is_idempotent() {
        let mut scheduler = BatchScheduler::new(3, 15);
        assert_eq!(scheduler.release(|_| {}), Some(1..=3));
        for _ in 0..5 {
            assert_eq!(scheduler.release(|_| panic!("no more tiles")), None);
            assert_eq!(scheduler.last_released(), 3);
        }
    }

    #[test]
    fn stale_completion_does_not_move_cursor() {
        let mut scheduler = BatchScheduler::new(10, 4);
        let _ = scheduler.begin().unwrap();
        scheduler.complete(5..=8);
        assert_eq!(scheduler.last_released(), 0);
        assert!(!scheduler.in_flight());
        // Completion without a claim is ignored entirely.
        scheduler.complete(1..=4);
        assert_eq!(scheduler.last_released(), 0);
    }
}
