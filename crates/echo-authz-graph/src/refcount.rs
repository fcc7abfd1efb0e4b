// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A reference counter keyed by small non-negative integers.
//!
//! The destination index (§4.5) needs to know, per `(node, destination)`
//! pair, how many distinct paths currently justify that destination's
//! presence — and to drop the entry the moment the count reaches zero. A
//! plain `HashMap<VertexId, usize>` would do this, but [`SparseIntSet`]
//! already gives compact storage for "is this id present", so an
//! `IntRefCounter` is built directly on top of it: a value's presence in
//! the underlying set *is* "count > 0", and only the first increment /
//! last decrement touch the set itself.

use std::collections::HashMap;

use crate::sparse_set::SparseIntSet;

/// Tracks per-id reference counts, backed by a [`SparseIntSet`] of the ids
/// currently at count > 0.
#[derive(Debug, Clone, Default)]
pub struct IntRefCounter {
    present: SparseIntSet,
    counts: HashMap<i64, u32>,
}

impl IntRefCounter {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments `id`'s count, returning `true` iff this transitioned it
    /// from absent (count 0) to present (count 1).
    pub fn increment(&mut self, id: i64) -> bool {
        let count = self.counts.entry(id).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.present.insert(id);
            true
        } else {
            false
        }
    }

    /// Decrements `id`'s count, returning `true` iff this transitioned it
    /// from present (count 1) to absent (count 0).
    ///
    /// Decrementing an id with no recorded references is a no-op (returns
    /// `false`) — callers that race a delete against a concurrent rebuild
    /// should not panic here, since the destination index may have already
    /// forgotten the entry the caller is trying to remove.
    pub fn decrement(&mut self, id: i64) -> bool {
        let Some(count) = self.counts.get_mut(&id) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&id);
            self.present.remove(id);
            true
        } else {
            false
        }
    }

    /// Whether `id` currently has a nonzero reference count.
    #[must_use]
    pub fn has(&self, id: i64) -> bool {
        self.present.has(id)
    }

    /// `id`'s current reference count (0 if absent).
    #[must_use]
    pub fn count(&self, id: i64) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Number of distinct ids currently at count > 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.present.len()
    }

    /// Whether no id currently has a nonzero count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Iterates the ids currently at count > 0, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.present.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_increment_reports_transition() {
        let mut rc = IntRefCounter::new();
        assert!(rc.increment(5));
        assert!(!rc.increment(5));
        assert_eq!(rc.count(5), 2);
        assert!(rc.has(5));
    }

    #[test]
    fn last_decrement_reports_transition_and_clears() {
        let mut rc = IntRefCounter::new();
        rc.increment(5);
        rc.increment(5);
        assert!(!rc.decrement(5));
        assert!(rc.has(5));
        assert!(rc.decrement(5));
        assert!(!rc.has(5));
        assert_eq!(rc.count(5), 0);
    }

    #[test]
    fn decrement_of_unknown_id_is_noop() {
        let mut rc = IntRefCounter::new();
        assert!(!rc.decrement(7));
        assert_eq!(rc.count(7), 0);
    }

    #[test]
    fn len_tracks_distinct_present_ids() {
        let mut rc = IntRefCounter::new();
        rc.increment(1);
        rc.increment(2);
        rc.increment(1);
        assert_eq!(rc.len(), 2);
        rc.decrement(1);
        assert_eq!(rc.len(), 2);
        rc.decrement(1);
        assert_eq!(rc.len(), 1);
    }
}
