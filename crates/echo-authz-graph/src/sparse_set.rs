// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A sparse, ordered set of `i64` backed by a linked list of 256-bit blocks.
//!
//! Blocks are stored in an arena (`Vec<Block>`) and linked by index rather
//! than by pointer, so the whole structure derives `Clone` safely — there
//! is no back-pointer aliasing hazard to guard against, because cloning the
//! arena's `Vec` produces an independent copy with the same (still valid)
//! indices.

const BITS_PER_BLOCK: i64 = 256;
const WORDS_PER_BLOCK: usize = 4; // 256 bits / 64-bit words

type ArenaIndex = usize;

#[derive(Debug, Clone)]
struct Block {
    /// Multiple of `BITS_PER_BLOCK`; bit `i` represents `offset + i`.
    offset: i64,
    bits: [u64; WORDS_PER_BLOCK],
    next: Option<ArenaIndex>,
    prev: Option<ArenaIndex>,
}

impl Block {
    const fn empty(offset: i64) -> Self {
        Self {
            offset,
            bits: [0; WORDS_PER_BLOCK],
            next: None,
            prev: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    fn lowest_set_bit(&self) -> Option<u32> {
        for (word_idx, word) in self.bits.iter().enumerate() {
            if *word != 0 {
                return Some((word_idx * 64) as u32 + word.trailing_zeros());
            }
        }
        None
    }

    fn highest_set_bit(&self) -> Option<u32> {
        for (word_idx, word) in self.bits.iter().enumerate().rev() {
            if *word != 0 {
                return Some((word_idx * 64) as u32 + (63 - word.leading_zeros()));
            }
        }
        None
    }
}

/// Locates `x`'s containing block offset.
fn block_offset(x: i64) -> i64 {
    x.div_euclid(BITS_PER_BLOCK) * BITS_PER_BLOCK
}

/// Bit position of `x` within its block (`0..256`).
fn bit_position(x: i64) -> u32 {
    x.rem_euclid(BITS_PER_BLOCK) as u32
}

/// A compact, ordered multi-use set of `i64` values.
///
/// Used by the substrate's id allocator to track free and used node ids.
/// Membership, insertion, and removal are O(number of occupied blocks);
/// `min`/`max`/`take_min` are O(1) amortized since the head/tail blocks are
/// tracked directly.
#[derive(Debug, Clone, Default)]
pub struct SparseIntSet {
    blocks: Vec<Block>,
    /// Arena slots freed by block removal, reused by future insertions.
    free_slots: Vec<ArenaIndex>,
    head: Option<ArenaIndex>,
    tail: Option<ArenaIndex>,
    len: usize,
}

impl SparseIntSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct integers currently in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the set holds no integers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every integer from the set.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.free_slots.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn find_block(&self, offset: i64) -> Option<ArenaIndex> {
        let mut cur = self.head;
        while let Some(idx) = cur {
            let block = &self.blocks[idx];
            if block.offset == offset {
                return Some(idx);
            }
            if block.offset > offset {
                return None;
            }
            cur = block.next;
        }
        None
    }

    /// Finds the first block with `offset >= target`, i.e. the block that
    /// would follow a new block inserted for `target` if one doesn't exist.
    fn find_successor(&self, target: i64) -> Option<ArenaIndex> {
        let mut cur = self.head;
        while let Some(idx) = cur {
            if self.blocks[idx].offset >= target {
                return Some(idx);
            }
            cur = self.blocks[idx].next;
        }
        None
    }

    fn alloc_block(&mut self, block: Block) -> ArenaIndex {
        if let Some(slot) = self.free_slots.pop() {
            self.blocks[slot] = block;
            slot
        } else {
            self.blocks.push(block);
            self.blocks.len() - 1
        }
    }

    /// Inserts a block with the given offset immediately before `before`
    /// (or at the tail if `before` is `None`). Returns its arena index.
    fn insert_block_before(&mut self, offset: i64, before: Option<ArenaIndex>) -> ArenaIndex {
        let prev = match before {
            Some(idx) => self.blocks[idx].prev,
            None => self.tail,
        };
        let idx = self.alloc_block(Block {
            prev,
            next: before,
            ..Block::empty(offset)
        });

        match prev {
            Some(p) => self.blocks[p].next = Some(idx),
            None => self.head = Some(idx),
        }
        match before {
            Some(b) => self.blocks[b].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        idx
    }

    fn unlink_block(&mut self, idx: ArenaIndex) {
        let (prev, next) = {
            let block = &self.blocks[idx];
            (block.prev, block.next)
        };
        match prev {
            Some(p) => self.blocks[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.blocks[n].prev = prev,
            None => self.tail = prev,
        }
        self.free_slots.push(idx);
    }

    /// Inserts `x`. Returns `true` iff it was not already present.
    pub fn insert(&mut self, x: i64) -> bool {
        let offset = block_offset(x);
        let bit = bit_position(x) as usize;
        let (word, mask) = (bit / 64, 1u64 << (bit % 64));

        let idx = match self.find_block(offset) {
            Some(idx) => idx,
            None => {
                let successor = self.find_successor(offset);
                self.insert_block_before(offset, successor)
            }
        };

        let block = &mut self.blocks[idx];
        let was_absent = block.bits[word] & mask == 0;
        block.bits[word] |= mask;
        if was_absent {
            self.len += 1;
        }
        was_absent
    }

    /// Removes `x`. Returns `true` iff it was present.
    pub fn remove(&mut self, x: i64) -> bool {
        let offset = block_offset(x);
        let Some(idx) = self.find_block(offset) else {
            return false;
        };
        let bit = bit_position(x) as usize;
        let (word, mask) = (bit / 64, 1u64 << (bit % 64));

        let block = &mut self.blocks[idx];
        let was_present = block.bits[word] & mask != 0;
        if !was_present {
            return false;
        }
        block.bits[word] &= !mask;
        self.len -= 1;
        if self.blocks[idx].is_empty() {
            self.unlink_block(idx);
        }
        true
    }

    /// Tests membership of `x`.
    #[must_use]
    pub fn has(&self, x: i64) -> bool {
        let offset = block_offset(x);
        let Some(idx) = self.find_block(offset) else {
            return false;
        };
        let bit = bit_position(x) as usize;
        let (word, mask) = (bit / 64, 1u64 << (bit % 64));
        self.blocks[idx].bits[word] & mask != 0
    }

    /// The smallest integer in the set, if any.
    #[must_use]
    pub fn min(&self) -> Option<i64> {
        let idx = self.head?;
        let block = &self.blocks[idx];
        block.lowest_set_bit().map(|b| block.offset + i64::from(b))
    }

    /// The largest integer in the set, if any.
    #[must_use]
    pub fn max(&self) -> Option<i64> {
        let idx = self.tail?;
        let block = &self.blocks[idx];
        block.highest_set_bit().map(|b| block.offset + i64::from(b))
    }

    /// Removes and returns the smallest integer in the set, if any.
    pub fn take_min(&mut self) -> Option<i64> {
        let min = self.min()?;
        self.remove(min);
        Some(min)
    }

    /// Iterates the set in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        let mut cur = self.head;
        let mut bit: u32 = 0;
        std::iter::from_fn(move || loop {
            let idx = cur?;
            let block = &self.blocks[idx];
            while bit < BITS_PER_BLOCK as u32 {
                let word = (bit / 64) as usize;
                let mask = 1u64 << (bit % 64);
                let this_bit = bit;
                bit += 1;
                if block.bits[word] & mask != 0 {
                    return Some(block.offset + i64::from(this_bit));
                }
            }
            cur = block.next;
            bit = 0;
        })
    }
}

impl<'a> IntoIterator for &'a SparseIntSet {
    type Item = i64;
    type IntoIter = Box<dyn Iterator<Item = i64> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn insert_has_len_agree_with_reference() {
        let mut set = SparseIntSet::new();
        let mut reference = BTreeSet::new();
        for x in [1_i64, 300, 2, 257, -1, 0, -300, 256, 255] {
            let inserted = set.insert(x);
            let ref_inserted = reference.insert(x);
            assert_eq!(inserted, ref_inserted);
            assert_eq!(set.len(), reference.len());
        }
        for x in &reference {
            assert!(set.has(*x));
        }
    }

    #[test]
    fn take_min_is_ascending() {
        let mut set = SparseIntSet::new();
        for x in [1_i64, 300, 2, 257, -1] {
            set.insert(x);
        }
        let mut observed = Vec::new();
        while let Some(m) = set.take_min() {
            observed.push(m);
        }
        assert_eq!(observed, vec![-1, 1, 2, 257, 300]);
        assert!(set.is_empty());
        assert_eq!(set.min(), None);
        assert_eq!(set.max(), None);
    }

    #[test]
    fn remove_collapses_empty_blocks() {
        let mut set = SparseIntSet::new();
        set.insert(5);
        assert!(set.remove(5));
        assert!(!set.has(5));
        assert_eq!(set.len(), 0);
        assert!(set.head.is_none());
        assert!(set.tail.is_none());
    }

    #[test]
    fn clone_is_independent() {
        let mut set = SparseIntSet::new();
        set.insert(1);
        set.insert(500);
        let mut cloned = set.clone();
        cloned.insert(999);
        assert!(!set.has(999));
        assert!(cloned.has(999));
        assert!(cloned.has(1) && cloned.has(500));
    }

    #[test]
    fn iter_yields_ascending_values() {
        let mut set = SparseIntSet::new();
        for x in [300_i64, -1, 2, 1, 257] {
            set.insert(x);
        }
        let collected: Vec<_> = set.iter().collect();
        assert_eq!(collected, vec![-1, 1, 2, 257, 300]);
    }

    #[test]
    fn min_max_span_negative_and_positive_blocks() {
        let mut set = SparseIntSet::new();
        for x in [-500_i64, -1, 0, 1, 500] {
            set.insert(x);
        }
        assert_eq!(set.min(), Some(-500));
        assert_eq!(set.max(), Some(500));
    }

    proptest::proptest! {
        #[test]
        fn matches_reference_set_for_random_ops(
            ops in proptest::collection::vec((proptest::bool::ANY, -2000_i64..2000), 0..500)
        ) {
            let mut set = SparseIntSet::new();
            let mut reference = BTreeSet::new();
            for (is_insert, value) in ops {
                if is_insert {
                    let a = set.insert(value);
                    let b = reference.insert(value);
                    proptest::prop_assert_eq!(a, b);
                } else {
                    let a = set.remove(value);
                    let b = reference.remove(&value);
                    proptest::prop_assert_eq!(a, b);
                }
                proptest::prop_assert_eq!(set.len(), reference.len());
                proptest::prop_assert_eq!(set.min(), reference.iter().next().copied());
                proptest::prop_assert_eq!(set.max(), reference.iter().next_back().copied());
            }
        }
    }
}
