use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::domain::requirements::category::CategoryTag;

const WORD_BITS: usize = u64::BITS as usize;

/// The capabilities the resource tracker needs from a set of resource bits.
pub trait ResourceSet {
    fn has_any(&self, other: &Self) -> bool;

    fn union_with(&mut self, other: &Self);

    fn subtract(&mut self, other: &Self);

    fn is_empty(&self) -> bool;

    fn count(&self) -> usize;
}

/// Growable bit set whose bits index resources of a single category `C`.
///
/// The category marker keeps e.g. field bits from being merged into service bits by accident.
pub struct BitSet<C> {
    words: Vec<u64>,
    _marker: PhantomData<C>,
}

impl<C: CategoryTag> BitSet<C> {
    pub fn new() -> Self {
        Self { words: Vec::new(), _marker: PhantomData }
    }

    pub fn from_bits(bits: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new();
        for bit in bits {
            set.insert(bit);
        }
        set
    }

    pub fn insert(&mut self, bit: usize) {
        let (word, mask) = Self::locate(bit);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= mask;
    }

    pub fn remove(&mut self, bit: usize) {
        let (word, mask) = Self::locate(bit);
        if let Some(value) = self.words.get_mut(word) {
            *value &= !mask;
        }
        self.trim();
    }

    pub fn contains(&self, bit: usize) -> bool {
        let (word, mask) = Self::locate(bit);
        self.words.get(word).is_some_and(|value| value & mask != 0)
    }

    /// Iterates the set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(word_index, &word)| {
            (0..WORD_BITS).filter(move |bit| word & (1u64 << bit) != 0).map(move |bit| word_index * WORD_BITS + bit)
        })
    }

    /// Bits set in both `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        let words = self.words.iter().zip(other.words.iter()).map(|(a, b)| a & b).collect();
        let mut set = Self { words, _marker: PhantomData };
        set.trim();
        set
    }

    fn locate(bit: usize) -> (usize, u64) {
        (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl<C: CategoryTag> ResourceSet for BitSet<C> {
    fn has_any(&self, other: &Self) -> bool {
        self.words.iter().zip(other.words.iter()).any(|(a, b)| a & b != 0)
    }

    fn union_with(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (word, other_word) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= other_word;
        }
    }

    fn subtract(&mut self, other: &Self) {
        for (word, other_word) in self.words.iter_mut().zip(other.words.iter()) {
            *word &= !other_word;
        }
        self.trim();
    }

    fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }
}

impl<C: CategoryTag> Default for BitSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for BitSet<C> {
    fn clone(&self) -> Self {
        Self { words: self.words.clone(), _marker: PhantomData }
    }
}

impl<C> PartialEq for BitSet<C> {
    fn eq(&self, other: &Self) -> bool {
        let longest = self.words.len().max(other.words.len());
        (0..longest).all(|i| self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0))
    }
}

impl<C> Eq for BitSet<C> {}

impl<C> Hash for BitSet<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let used = self.words.iter().rposition(|word| *word != 0).map_or(0, |last| last + 1);
        self.words[..used].hash(state);
    }
}

impl<C: CategoryTag> FromIterator<usize> for BitSet<C> {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_bits(iter)
    }
}

impl<C: CategoryTag> fmt::Debug for BitSet<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", C::CATEGORY)?;
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::requirements::category::{ExternalServices, Fields};

    #[test]
    fn test_insert_and_iterate_across_words() {
        let set: BitSet<Fields> = [3, 64, 130].into_iter().collect();

        assert!(set.contains(3));
        assert!(set.contains(64));
        assert!(!set.contains(65));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 64, 130]);
        assert_eq!(set.count(), 3);
    }

    #[test]
    fn test_has_any_union_subtract() {
        let mut a: BitSet<ExternalServices> = BitSet::from_bits([1, 2]);
        let b: BitSet<ExternalServices> = BitSet::from_bits([2, 70]);

        assert!(a.has_any(&b));
        a.union_with(&b);
        assert_eq!(a.count(), 3);

        a.subtract(&b);
        assert_eq!(a, BitSet::from_bits([1]));
        assert!(!a.has_any(&b));
    }

    #[test]
    fn test_equality_ignores_trailing_empty_words() {
        let mut a: BitSet<Fields> = BitSet::from_bits([1, 200]);
        a.remove(200);

        assert_eq!(a, BitSet::from_bits([1]));
        assert!(BitSet::<Fields>::new().is_empty());
    }
}
