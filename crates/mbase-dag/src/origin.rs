//! Growable origin bitsets.
//!
//! An origin bit marks reachability from one leaf or from one join node
//! discovered during a walk. Leaves take bits `0..n`; join bits are handed
//! out by an [`OriginPool`] as the walk finds them, so the number of bits is
//! unbounded and an [`OriginSet`] grows on demand.
//!
//! # Invariants
//!
//! - `OriginSet` never stores trailing zero words, so derived equality and
//!   hashing compare logical contents.

const WORD_BITS: usize = 64;

/// A set of origin bits backed by a growable `Vec<u64>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OriginSet {
    words: Vec<u64>,
}

impl OriginSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one bit.
    pub fn with_bit(bit: usize) -> Self {
        let mut set = Self::new();
        set.insert(bit);
        set
    }

    /// A set holding bits `0..n`.
    pub fn prefix(n: usize) -> Self {
        let mut words = vec![u64::MAX; n / WORD_BITS];
        let rem = n % WORD_BITS;
        if rem != 0 {
            words.push((1u64 << rem) - 1);
        }
        Self { words }
    }

    /// Set `bit`. Returns `true` if it was not already set.
    pub fn insert(&mut self, bit: usize) -> bool {
        let (word, mask) = locate(bit);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let was_set = self.words[word] & mask != 0;
        self.words[word] |= mask;
        !was_set
    }

    pub fn contains(&self, bit: usize) -> bool {
        let (word, mask) = locate(bit);
        self.words.get(word).is_some_and(|w| w & mask != 0)
    }

    /// In-place union. Returns `true` if any bit was added.
    pub fn union_with(&mut self, other: &OriginSet) -> bool {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    /// Returns `true` if every bit of `other` is also set here.
    pub fn is_superset(&self, other: &OriginSet) -> bool {
        other.words.iter().enumerate().all(|(i, theirs)| {
            let mine = self.words.get(i).copied().unwrap_or(0);
            mine & theirs == *theirs
        })
    }

    /// Number of set bits below `n`.
    pub fn count_below(&self, n: usize) -> usize {
        let full = n / WORD_BITS;
        let rem = n % WORD_BITS;
        let mut count: usize = self
            .words
            .iter()
            .take(full)
            .map(|w| w.count_ones() as usize)
            .sum();
        if rem != 0 {
            if let Some(w) = self.words.get(full) {
                count += (w & ((1u64 << rem) - 1)).count_ones() as usize;
            }
        }
        count
    }

    /// Total number of set bits.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..WORD_BITS)
                .filter(move |b| word & (1u64 << b) != 0)
                .map(move |b| i * WORD_BITS + b)
        })
    }
}

fn locate(bit: usize) -> (usize, u64) {
    (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
}

/// Allocator for origin bit positions. Fresh per walk.
#[derive(Debug, Default)]
pub struct OriginPool {
    next: usize,
}

impl OriginPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next unused bit.
    pub fn allocate(&mut self) -> usize {
        let bit = self.next;
        self.next += 1;
        bit
    }

    /// Number of bits allocated so far.
    pub fn len(&self) -> usize {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_grows_across_words() {
        let mut set = OriginSet::new();
        assert!(set.insert(3));
        assert!(set.insert(130));
        assert!(!set.insert(3));

        assert!(set.contains(3));
        assert!(set.contains(130));
        assert!(!set.contains(64));
        assert!(!set.contains(10_000));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 130]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn equality_ignores_construction_path() {
        let mut a = OriginSet::with_bit(1);
        a.union_with(&OriginSet::with_bit(70));

        let mut b = OriginSet::with_bit(70);
        b.insert(1);

        assert_eq!(a, b);
        assert_ne!(a, OriginSet::with_bit(1));
    }

    #[test]
    fn union_reports_change() {
        let mut a = OriginSet::with_bit(0);
        assert!(a.union_with(&OriginSet::with_bit(65)));
        assert!(!a.union_with(&OriginSet::with_bit(65)));
        assert!(!a.union_with(&OriginSet::new()));
    }

    #[test]
    fn superset_across_lengths() {
        let mut big = OriginSet::prefix(3);
        big.insert(100);
        let small = OriginSet::with_bit(2);

        assert!(big.is_superset(&small));
        assert!(!small.is_superset(&big));
        assert!(big.is_superset(&OriginSet::new()));
        assert!(OriginSet::new().is_superset(&OriginSet::new()));
    }

    #[test]
    fn prefix_sets_low_bits() {
        assert!(OriginSet::prefix(0).is_empty());
        assert_eq!(OriginSet::prefix(3).iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        let wide = OriginSet::prefix(64);
        assert_eq!(wide.len(), 64);
        assert!(!wide.contains(64));
        assert_eq!(OriginSet::prefix(65).len(), 65);
    }

    #[test]
    fn count_below_masks_join_bits() {
        let mut set = OriginSet::prefix(2);
        set.insert(5);
        set.insert(90);
        assert_eq!(set.count_below(2), 2);
        assert_eq!(set.count_below(6), 3);
        assert_eq!(set.count_below(64), 3);
        assert_eq!(set.count_below(200), 4);
    }

    #[test]
    fn pool_hands_out_sequential_bits() {
        let mut pool = OriginPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.allocate(), 0);
        assert_eq!(pool.allocate(), 1);
        assert_eq!(pool.len(), 2);
    }
}
