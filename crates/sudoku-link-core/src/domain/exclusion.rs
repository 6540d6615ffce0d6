//! Fixed-bucket chained hash table used to mark hint cells as non-editable.
//!
//! # How the table is laid out (for beginners)
//!
//! A chained hash table keeps an array of *buckets*.  Each key is assigned a
//! bucket with a hash function (here simply `key mod bucket_count`) and every
//! entry whose key lands in the same bucket is kept in a singly linked list
//! (a *chain*) hanging off that bucket.
//!
//! Instead of heap-allocating one node per entry and linking them with boxed
//! pointers, the entries live in one `Vec` (an *arena*) and the chain links are
//! plain `usize` positions in that `Vec`:
//!
//! ```text
//! buckets:  [ 0: Some(2) | 1: None | 2: Some(0) ]
//!                  │                     │
//! slots:    [ 0: key=2 next=None ]◄──────┘
//!           [ 1: <free>          ]
//!           [ 2: key=3 next=Some(3) ] ──► [ 3: key=0 next=None ]
//! ```
//!
//! Dropping or clearing the table is then a flat loop over the arena, never a
//! recursive walk down a chain, no matter how long a chain grows.
//!
//! The bucket count is fixed at construction; the table never resizes.  With
//! `L` the length of the longest chain, every operation is `O(L)`.

use std::fmt;

use thiserror::Error;

use crate::domain::board::{Board, CellIndex};

/// Bucket count of the hint table used during a game.
pub const HINT_BUCKETS: usize = 30;

/// Errors raised when constructing an [`ExclusionSet`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExclusionError {
    /// A table needs at least one bucket.
    #[error("exclusion set needs at least one bucket")]
    ZeroBuckets,
}

/// Keys that can be placed in an [`ExclusionSet`].
///
/// Implementations map the key onto `0..bucket_count`.  Keys are unsigned by
/// type, so the modulo never yields a negative bucket.
pub trait TableKey: Copy + Eq {
    /// Returns the bucket for this key; `bucket_count` is always non-zero.
    fn bucket(self, bucket_count: usize) -> usize;
}

impl TableKey for usize {
    fn bucket(self, bucket_count: usize) -> usize {
        self % bucket_count
    }
}

impl TableKey for u32 {
    fn bucket(self, bucket_count: usize) -> usize {
        self as usize % bucket_count
    }
}

impl TableKey for CellIndex {
    fn bucket(self, bucket_count: usize) -> usize {
        self.offset() % bucket_count
    }
}

/// One arena entry: a key/value pair and the link to the next entry in the
/// same chain.
#[derive(Debug, Clone)]
struct Slot<K, V> {
    key: K,
    value: V,
    next: Option<usize>,
}

/// A mapping from small integer keys to opaque values with a fixed number of
/// buckets.
///
/// The table owns every stored value.  No two entries share a key.
///
/// # Examples
///
/// ```rust
/// use sudoku_link_core::ExclusionSet;
///
/// let mut set: ExclusionSet<usize, &str> = ExclusionSet::with_buckets(7).unwrap();
/// set.set(12, "5");
/// assert!(set.exists(12));
/// assert_eq!(set.get(12), Some(&"5"));
/// set.remove(12);
/// assert!(!set.exists(12));
/// ```
#[derive(Clone)]
pub struct ExclusionSet<K, V> {
    /// Head slot of each chain.
    buckets: Vec<Option<usize>>,
    /// Arena of entries; `None` marks a free slot.
    slots: Vec<Option<Slot<K, V>>>,
    /// Free slot positions available for reuse.
    free: Vec<usize>,
    len: usize,
}

impl<K: TableKey, V> ExclusionSet<K, V> {
    /// Builds an empty table with `bucket_count` buckets.
    ///
    /// # Errors
    ///
    /// Returns [`ExclusionError::ZeroBuckets`] if `bucket_count` is 0.
    pub fn with_buckets(bucket_count: usize) -> Result<Self, ExclusionError> {
        if bucket_count == 0 {
            return Err(ExclusionError::ZeroBuckets);
        }
        Ok(Self {
            buckets: vec![None; bucket_count],
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `value` under `key`, overwriting any previous value.
    ///
    /// New entries are prepended to their chain.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(pos) = self.find(key) {
            if let Some(slot) = self.slots[pos].as_mut() {
                slot.value = value;
            }
            return;
        }

        let bucket = key.bucket(self.buckets.len());
        let slot = Slot {
            key,
            value,
            next: self.buckets[bucket],
        };
        let pos = match self.free.pop() {
            Some(pos) => {
                self.slots[pos] = Some(slot);
                pos
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.buckets[bucket] = Some(pos);
        self.len += 1;
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: K) -> Option<&V> {
        self.find(key)
            .and_then(|pos| self.slots[pos].as_ref())
            .map(|slot| &slot.value)
    }

    /// Returns `true` if `key` is in the table.
    pub fn exists(&self, key: K) -> bool {
        self.find(key).is_some()
    }

    /// Removes `key` and returns its value.  Absent keys are a no-op.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let bucket = key.bucket(self.buckets.len());
        let mut prev: Option<usize> = None;
        let mut cursor = self.buckets[bucket];

        while let Some(pos) = cursor {
            let slot = self.slots[pos].as_ref()?;
            if slot.key == key {
                let next = slot.next;
                match prev {
                    // First in the chain: the bucket head moves on.
                    None => self.buckets[bucket] = next,
                    Some(p) => {
                        if let Some(prev_slot) = self.slots[p].as_mut() {
                            prev_slot.next = next;
                        }
                    }
                }
                let removed = self.slots[pos].take()?;
                self.free.push(pos);
                self.len -= 1;
                return Some(removed.value);
            }
            prev = Some(pos);
            cursor = slot.next;
        }
        None
    }

    /// Removes every entry.
    ///
    /// Runs in `O(bucket_count + len)`: buckets are reset in one pass and the
    /// arena is dropped in one pass.
    pub fn clear(&mut self) {
        self.buckets.fill(None);
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    /// Iterates over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (slot.key, &slot.value))
    }

    /// Arena position of the entry holding `key`.
    fn find(&self, key: K) -> Option<usize> {
        let mut cursor = self.buckets[key.bucket(self.buckets.len())];
        while let Some(pos) = cursor {
            let slot = self.slots[pos].as_ref()?;
            if slot.key == key {
                return Some(pos);
            }
            cursor = slot.next;
        }
        None
    }
}

impl<K: TableKey + fmt::Debug, V: fmt::Debug> fmt::Debug for ExclusionSet<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// ── Hint cells ────────────────────────────────────────────────────────────────

/// The table of hint cells for one game: cell index → hint digit as text.
pub type HintCells = ExclusionSet<CellIndex, String>;

impl ExclusionSet<CellIndex, String> {
    /// Creates the empty hint table used during a game.
    pub fn for_game() -> Self {
        Self {
            buckets: vec![None; HINT_BUCKETS],
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Marks every non-empty cell of `board` as a hint and returns how many
    /// cells were marked.
    pub fn mark_hints(&mut self, board: &Board) -> usize {
        let mut marked = 0;
        for (index, value) in board.cells().filter(|&(_, v)| v != 0) {
            self.set(index, value.to_string());
            marked += 1;
        }
        tracing::debug!(marked, "hint cells marked");
        marked
    }

    /// `true` if `index` is a hint the player may not edit.
    pub fn is_hint(&self, index: CellIndex) -> bool {
        self.exists(index)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_zero_buckets_is_rejected() {
        let result = ExclusionSet::<usize, ()>::with_buckets(0);
        assert_eq!(result.err(), Some(ExclusionError::ZeroBuckets));
    }

    #[test]
    fn test_set_then_get_returns_value() {
        // Arrange
        let mut set = ExclusionSet::with_buckets(5).unwrap();

        // Act
        set.set(3usize, "three");

        // Assert
        assert_eq!(set.get(3), Some(&"three"));
        assert!(set.exists(3));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_existing_key_overwrites_without_growing() {
        // Arrange
        let mut set = ExclusionSet::with_buckets(5).unwrap();
        set.set(3usize, 1);

        // Act
        set.set(3, 2);

        // Assert
        assert_eq!(set.get(3), Some(&2));
        assert_eq!(set.len(), 1, "overwrite must not add an entry");
    }

    #[test]
    fn test_colliding_keys_share_a_chain() {
        // Arrange – with 4 buckets, 1, 5, 9 and 13 all hash to bucket 1
        let mut set = ExclusionSet::with_buckets(4).unwrap();
        for key in [1usize, 5, 9, 13] {
            set.set(key, key * 10);
        }

        // Act
        let removed = set.remove(9);

        // Assert
        assert_eq!(removed, Some(90));
        assert!(set.exists(1));
        assert!(set.exists(5));
        assert!(!set.exists(9));
        assert!(set.exists(13));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_remove_chain_head_and_tail() {
        let mut set = ExclusionSet::with_buckets(1).unwrap();
        for key in 0u32..4 {
            set.set(key, ());
        }

        // Newest entry (3) is the head, oldest (0) is the tail.
        assert_eq!(set.remove(3), Some(()));
        assert_eq!(set.remove(0), Some(()));

        assert!(set.exists(1));
        assert!(set.exists(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let mut set = ExclusionSet::with_buckets(3).unwrap();
        set.set(1usize, 'a');
        assert_eq!(set.remove(2), None);
        assert_eq!(set.remove(4), None, "same bucket as 1, different key");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_freed_slots_are_reused() {
        // Arrange
        let mut set = ExclusionSet::with_buckets(2).unwrap();
        set.set(0usize, 0);
        set.set(1, 1);
        set.remove(0);

        // Act
        set.set(2, 2);

        // Assert – the arena did not grow past two slots
        assert_eq!(set.slots.len(), 2);
        assert_eq!(set.get(2), Some(&2));
    }

    #[test]
    fn test_exists_tracks_latest_operation_per_key() {
        // Arrange – a fixed interleaving of set/remove over a handful of keys
        let mut set = ExclusionSet::with_buckets(3).unwrap();
        let mut expected = [false; 10];
        let ops: [(usize, bool); 14] = [
            (1, true),
            (4, true),
            (7, true),
            (4, false),
            (1, true),
            (9, true),
            (7, false),
            (7, true),
            (0, false),
            (3, true),
            (9, false),
            (6, true),
            (1, false),
            (3, true),
        ];

        // Act
        for (key, insert) in ops {
            if insert {
                set.set(key, key);
            } else {
                set.remove(key);
            }
            expected[key] = insert;
        }

        // Assert
        for (key, &present) in expected.iter().enumerate() {
            assert_eq!(set.exists(key), present, "key {key}");
        }
        assert_eq!(set.len(), expected.iter().filter(|p| **p).count());
    }

    #[test]
    fn test_clear_removes_every_key() {
        // Arrange
        let mut set = ExclusionSet::with_buckets(7).unwrap();
        for key in 0usize..81 {
            set.set(key, key);
        }

        // Act
        set.clear();

        // Assert
        assert!(set.is_empty());
        assert!((0usize..81).all(|k| !set.exists(k)));
        assert_eq!(set.bucket_count(), 7, "clear keeps the bucket array");
    }

    #[test]
    fn test_long_chain_drops_without_recursion() {
        // A single bucket with many entries is one long chain.
        let mut set = ExclusionSet::with_buckets(1).unwrap();
        for key in 0usize..5_000 {
            set.set(key, key);
        }
        assert_eq!(set.len(), 5_000);
        drop(set);
    }

    #[test]
    fn test_iter_visits_every_entry() {
        let mut set = ExclusionSet::with_buckets(4).unwrap();
        set.set(2usize, "b");
        set.set(6, "f");
        set.set(3, "c");
        let mut keys: Vec<usize> = set.iter().map(|(k, _)| k).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![2, 3, 6]);
    }

    #[test]
    fn test_debug_lists_entries() {
        let mut set = ExclusionSet::with_buckets(4).unwrap();
        set.set(1usize, "x");
        assert_eq!(format!("{set:?}"), r#"{1: "x"}"#);
    }

    // ── HintCells ─────────────────────────────────────────────────────────────

    #[test]
    fn test_mark_hints_stores_digit_text_for_non_empty_cells() {
        // Arrange
        let mut board = Board::empty();
        let a = CellIndex::new(0, 0).unwrap();
        let b = CellIndex::new(8, 8).unwrap();
        board.set(a, 5).unwrap();
        board.set(b, 9).unwrap();
        let mut hints = HintCells::for_game();

        // Act
        let marked = hints.mark_hints(&board);

        // Assert
        assert_eq!(marked, 2);
        assert_eq!(hints.get(a).map(String::as_str), Some("5"));
        assert_eq!(hints.get(b).map(String::as_str), Some("9"));
        assert!(!hints.is_hint(CellIndex::new(4, 4).unwrap()));
    }

    #[test]
    fn test_for_game_uses_thirty_buckets() {
        assert_eq!(HintCells::for_game().bucket_count(), HINT_BUCKETS);
    }
}
