//! Sparse message window.
//!
//! This module provides [`MessageWindow`], the client-side store of every
//! loaded message keyed by id. The window is sparse: a jump far from the
//! current content leaves a gap, and all counting and position logic works
//! over the loaded ids rather than the `min..=max` span.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{LoadDirection, LoadRange, Message};

/// Loaded id bounds, or `Empty` before the first merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum WindowBounds {
    Empty,
    Loaded { min: i64, max: i64 },
}

impl WindowBounds {
    pub fn min(&self) -> Option<i64> {
        match self {
            WindowBounds::Empty => None,
            WindowBounds::Loaded { min, .. } => Some(*min),
        }
    }

    pub fn max(&self) -> Option<i64> {
        match self {
            WindowBounds::Empty => None,
            WindowBounds::Loaded { max, .. } => Some(*max),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, WindowBounds::Empty)
    }
}

/// What the presentation layer is told after a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowSnapshot {
    /// Distinct loaded ids
    pub item_count: usize,
    pub bounds: WindowBounds,
    /// Incremented on every merge
    pub revision: u64,
}

/// Result of a single merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Ids that were not loaded before
    pub inserted: usize,
    /// Ids that were overwritten in place
    pub replaced: usize,
    pub direction: LoadDirection,
}

impl MergeSummary {
    /// True when the merge added at least one new id.
    pub fn grew(&self) -> bool {
        self.inserted > 0
    }
}

/// Sparse id → message store with incrementally maintained bounds.
#[derive(Debug, Clone, Default)]
pub struct MessageWindow {
    messages: BTreeMap<i64, Message>,
    /// Smallest loaded id (None while empty)
    min_loaded_id: Option<i64>,
    /// Largest loaded id (None while empty)
    max_loaded_id: Option<i64>,
    revision: u64,
}

impl MessageWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert every message by id and widen the bounds.
    ///
    /// A message with an already-loaded id replaces the stored one. Merging
    /// the same batch twice leaves the window unchanged apart from the
    /// revision counter.
    pub fn merge<I>(&mut self, batch: I, direction: LoadDirection) -> MergeSummary
    where
        I: IntoIterator<Item = Message>,
    {
        let mut inserted = 0;
        let mut replaced = 0;

        for message in batch {
            let id = message.id;
            if self.messages.insert(id, message).is_some() {
                replaced += 1;
            } else {
                inserted += 1;
            }
            self.min_loaded_id = Some(self.min_loaded_id.map_or(id, |min| min.min(id)));
            self.max_loaded_id = Some(self.max_loaded_id.map_or(id, |max| max.max(id)));
        }

        self.revision += 1;

        MergeSummary {
            inserted,
            replaced,
            direction,
        }
    }

    /// Number of distinct loaded ids.
    pub fn item_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn lookup(&self, id: i64) -> Option<&Message> {
        self.messages.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.messages.contains_key(&id)
    }

    pub fn bounds_snapshot(&self) -> WindowBounds {
        match (self.min_loaded_id, self.max_loaded_id) {
            (Some(min), Some(max)) => WindowBounds::Loaded { min, max },
            _ => WindowBounds::Empty,
        }
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            item_count: self.item_count(),
            bounds: self.bounds_snapshot(),
            revision: self.revision,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Loaded messages in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    /// Loaded ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.messages.keys().copied()
    }

    /// Ordinal position of `id` among the loaded ids, for hosts whose scroll
    /// primitive takes an item index.
    ///
    /// Counts the ids below `id`, so this is linear in the window size. A
    /// jump calls it twice (plan and settle).
    pub fn position_of(&self, id: i64) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        Some(self.messages.range(..id).count())
    }

    /// Id rendered at `position`, the inverse of [`position_of`](Self::position_of).
    pub fn id_at(&self, position: usize) -> Option<i64> {
        self.messages.keys().nth(position).copied()
    }

    /// Contiguous loaded run containing `id`.
    pub fn run_containing(&self, id: i64) -> Option<LoadRange> {
        if !self.contains(id) {
            return None;
        }

        let mut end = id;
        if let Some(after) = id.checked_add(1) {
            for next in self.messages.range(after..).map(|(k, _)| *k) {
                if end.checked_add(1) != Some(next) {
                    break;
                }
                end = next;
            }
        }

        let mut start = id;
        for prev in self.messages.range(..id).rev().map(|(k, _)| *k) {
            if start.checked_sub(1) != Some(prev) {
                break;
            }
            start = prev;
        }

        LoadRange::new(start, end).ok()
    }

    /// Missing ranges between the loaded bounds.
    pub fn gaps(&self) -> Vec<LoadRange> {
        let mut gaps = Vec::new();
        let mut ids = self.messages.keys().copied();
        let Some(mut prev) = ids.next() else {
            return gaps;
        };
        for id in ids {
            if id > prev + 1 {
                if let Ok(gap) = LoadRange::new(prev + 1, id - 1) {
                    gaps.push(gap);
                }
            }
            prev = id;
        }
        gaps
    }

    /// Sub-ranges of `range` that are not loaded yet.
    pub fn missing_in(&self, range: LoadRange) -> Vec<LoadRange> {
        let mut missing = Vec::new();
        let mut cursor = range.start();

        for id in self.messages.range(range.start()..=range.end()).map(|(k, _)| *k) {
            if id > cursor {
                if let Ok(hole) = LoadRange::new(cursor, id - 1) {
                    missing.push(hole);
                }
            }
            match id.checked_add(1) {
                Some(next) => cursor = next,
                None => return missing,
            }
        }

        if cursor <= range.end() {
            if let Ok(tail) = LoadRange::new(cursor, range.end()) {
                missing.push(tail);
            }
        }
        missing
    }

    /// Next page below the run containing `anchor`.
    ///
    /// Starts right after the run and stops short of the next loaded id, so
    /// a page never re-fetches what is already in the window. When `anchor`
    /// is unknown or not loaded, the window maximum is used.
    pub fn next_page_after(&self, anchor: Option<i64>, count: i64) -> Option<LoadRange> {
        let run_end = self.anchor_run(anchor)?.end();
        let start = run_end.checked_add(1)?;
        let mut end = start.saturating_add(count.max(1) - 1);

        if let Some((&next_loaded, _)) = self.messages.range(start..).next() {
            end = end.min(next_loaded - 1);
        }

        LoadRange::new(start, end).ok()
    }

    /// Next page above the run containing `anchor`, never below `floor`.
    ///
    /// Mirrors [`next_page_after`](Self::next_page_after). Returns `None`
    /// when the run already touches `floor` or the previous loaded id.
    pub fn next_page_before(
        &self,
        anchor: Option<i64>,
        count: i64,
        floor: Option<i64>,
    ) -> Option<LoadRange> {
        let run_start = self.anchor_run(anchor)?.start();
        let end = run_start.checked_sub(1)?;
        let mut start = end.saturating_sub(count.max(1) - 1);

        if let Some((&prev_loaded, _)) = self.messages.range(..run_start).next_back() {
            start = start.max(prev_loaded + 1);
        }
        if let Some(floor) = floor {
            start = start.max(floor);
        }

        LoadRange::new(start, end).ok()
    }

    fn anchor_run(&self, anchor: Option<i64>) -> Option<LoadRange> {
        anchor
            .and_then(|id| self.run_containing(id))
            .or_else(|| {
                let bounds = self.bounds_snapshot();
                match (anchor, bounds) {
                    // Unknown anchor near the top edge: use the minimum's run
                    (Some(id), WindowBounds::Loaded { min, .. }) if id <= min => {
                        self.run_containing(min)
                    }
                    (_, WindowBounds::Loaded { max, .. }) => self.run_containing(max),
                    (_, WindowBounds::Empty) => None,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: impl IntoIterator<Item = i64>) -> Vec<Message> {
        ids.into_iter()
            .map(|id| Message::new(id, format!("Sample message {}", id)))
            .collect()
    }

    fn range(start: i64, end: i64) -> LoadRange {
        LoadRange::new(start, end).unwrap()
    }

    #[test]
    fn test_empty_window() {
        let window = MessageWindow::new();
        assert_eq!(window.item_count(), 0);
        assert!(window.bounds_snapshot().is_empty());
        assert!(window.gaps().is_empty());
        assert_eq!(window.next_page_after(None, 20), None);
        assert_eq!(window.next_page_before(None, 20, None), None);
    }

    #[test]
    fn test_merge_updates_bounds() {
        let mut window = MessageWindow::new();
        let summary = window.merge(batch(1..=20), LoadDirection::Append);

        assert_eq!(summary.inserted, 20);
        assert_eq!(summary.replaced, 0);
        assert_eq!(
            window.bounds_snapshot(),
            WindowBounds::Loaded { min: 1, max: 20 }
        );

        window.merge(batch(-19..=0), LoadDirection::Prepend);
        assert_eq!(
            window.bounds_snapshot(),
            WindowBounds::Loaded { min: -19, max: 20 }
        );
    }

    #[test]
    fn test_prepend_still_widens_max() {
        // A prepend batch that overlaps past the max must still move it
        let mut window = MessageWindow::new();
        window.merge(batch(10..=12), LoadDirection::Append);
        window.merge(batch(5..=15), LoadDirection::Prepend);
        assert_eq!(
            window.bounds_snapshot(),
            WindowBounds::Loaded { min: 5, max: 15 }
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut window = MessageWindow::new();
        window.merge(batch(1..=5), LoadDirection::Append);
        let before: Vec<i64> = window.ids().collect();

        let summary = window.merge(batch(1..=5), LoadDirection::Append);
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.replaced, 5);
        assert!(!summary.grew());
        assert_eq!(window.item_count(), 5);
        assert_eq!(window.ids().collect::<Vec<_>>(), before);
        assert_eq!(window.lookup(3).unwrap().text, "Sample message 3");
    }

    #[test]
    fn test_merge_overwrites_by_id() {
        let mut window = MessageWindow::new();
        window.merge(vec![Message::new(4, "old")], LoadDirection::Append);
        window.merge(vec![Message::new(4, "new")], LoadDirection::Append);
        assert_eq!(window.item_count(), 1);
        assert_eq!(window.lookup(4).unwrap().text, "new");
    }

    #[test]
    fn test_sparse_item_count() {
        let mut window = MessageWindow::new();
        window.merge(batch([5, 6, 7]), LoadDirection::Append);
        window.merge(batch([100, 101]), LoadDirection::Append);

        assert_eq!(window.item_count(), 5);
        assert_eq!(window.gaps(), vec![range(8, 99)]);
        assert!(window.lookup(50).is_none());
    }

    #[test]
    fn test_revision_increments_per_merge() {
        let mut window = MessageWindow::new();
        assert_eq!(window.revision(), 0);
        window.merge(batch(1..=2), LoadDirection::Append);
        window.merge(Vec::new(), LoadDirection::Append);
        assert_eq!(window.revision(), 2);
        assert_eq!(window.snapshot().revision, 2);
    }

    #[test]
    fn test_position_lookup_skips_gaps() {
        let mut window = MessageWindow::new();
        window.merge(batch([5, 6, 7, 100, 101]), LoadDirection::Append);

        assert_eq!(window.position_of(5), Some(0));
        assert_eq!(window.position_of(100), Some(3));
        assert_eq!(window.position_of(50), None);
        assert_eq!(window.id_at(4), Some(101));
        assert_eq!(window.id_at(5), None);
    }

    #[test]
    fn test_run_containing() {
        let mut window = MessageWindow::new();
        window.merge(batch(1..=20), LoadDirection::Append);
        window.merge(batch(990..=1010), LoadDirection::Append);

        assert_eq!(window.run_containing(5), Some(range(1, 20)));
        assert_eq!(window.run_containing(1000), Some(range(990, 1010)));
        assert_eq!(window.run_containing(500), None);
    }

    #[test]
    fn test_missing_in() {
        let mut window = MessageWindow::new();
        window.merge(batch([3, 4, 8]), LoadDirection::Append);

        assert_eq!(
            window.missing_in(range(1, 10)),
            vec![range(1, 2), range(5, 7), range(9, 10)]
        );
        assert!(window.missing_in(range(3, 4)).is_empty());
    }

    #[test]
    fn test_next_page_after_uses_anchor_run() {
        let mut window = MessageWindow::new();
        window.merge(batch(1..=20), LoadDirection::Append);
        window.merge(batch(990..=1010), LoadDirection::Append);

        assert_eq!(window.next_page_after(Some(10), 20), Some(range(21, 40)));
        assert_eq!(window.next_page_after(Some(1005), 20), Some(range(1011, 1030)));
        // Unknown anchor falls back to the maximum
        assert_eq!(window.next_page_after(None, 20), Some(range(1011, 1030)));
    }

    #[test]
    fn test_next_page_after_stops_at_loaded_id() {
        let mut window = MessageWindow::new();
        window.merge(batch(1..=20), LoadDirection::Append);
        window.merge(batch(30..=40), LoadDirection::Append);

        assert_eq!(window.next_page_after(Some(20), 20), Some(range(21, 29)));
    }

    #[test]
    fn test_next_page_before_fills_gap_only() {
        let mut window = MessageWindow::new();
        window.merge(batch(1..=20), LoadDirection::Append);
        window.merge(batch(990..=1010), LoadDirection::Append);

        assert_eq!(
            window.next_page_before(Some(995), 20, None),
            Some(range(970, 989))
        );

        window.merge(batch(30..=40), LoadDirection::Append);
        assert_eq!(
            window.next_page_before(Some(35), 20, None),
            Some(range(21, 29))
        );
    }

    #[test]
    fn test_next_page_before_respects_floor() {
        let mut window = MessageWindow::new();
        window.merge(batch(1..=20), LoadDirection::Append);

        assert_eq!(window.next_page_before(Some(1), 20, Some(1)), None);
        assert_eq!(
            window.next_page_before(Some(1), 20, None),
            Some(range(-19, 0))
        );
        assert_eq!(
            window.next_page_before(Some(1), 20, Some(-5)),
            Some(range(-5, 0))
        );
    }
}
