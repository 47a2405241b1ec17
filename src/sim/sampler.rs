//! Discrete weighted sampling
//!
//! A `WeightedTable` maps variants to integer weights and draws one variant
//! per sample with probability `weight / total`.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::{Error as WeightError, WeightedIndex};

/// Variant-to-weight table backed by `WeightedIndex`
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    items: Vec<T>,
    weights: Vec<u32>,
    index: WeightedIndex<u32>,
}

impl<T> WeightedTable<T> {
    /// Build a table from `(variant, weight)` pairs.
    ///
    /// Fails if the table is empty, all weights are zero, or the total overflows.
    pub fn new(entries: impl IntoIterator<Item = (T, u32)>) -> Result<Self, WeightError> {
        let (items, weights): (Vec<T>, Vec<u32>) = entries.into_iter().unzip();
        let index = WeightedIndex::new(&weights)?;
        Ok(Self {
            items,
            weights,
            index,
        })
    }

    /// Draw one variant
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        &self.items[self.index.sample(rng)]
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> u64 {
        self.weights.iter().map(|&w| w as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate `(variant, weight)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&T, u32)> {
        self.items.iter().zip(self.weights.iter().copied())
    }
}

impl<T: PartialEq> WeightedTable<T> {
    /// Probability of drawing `item` (sums duplicate entries)
    pub fn probability(&self, item: &T) -> f64 {
        let total = self.total_weight();
        if total == 0 {
            return 0.0;
        }
        let weight: u64 = self
            .iter()
            .filter(|(i, _)| *i == item)
            .map(|(_, w)| w as u64)
            .sum();
        weight as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_empty_table_rejected() {
        let entries: Vec<(char, u32)> = Vec::new();
        assert!(WeightedTable::new(entries).is_err());
    }

    #[test]
    fn test_all_zero_rejected() {
        assert!(WeightedTable::new([('a', 0), ('b', 0)]).is_err());
    }

    #[test]
    fn test_zero_weight_never_drawn() {
        let table = WeightedTable::new([('a', 0), ('b', 1)]).unwrap();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(*table.sample(&mut rng), 'b');
        }
    }

    #[test]
    fn test_probability() {
        let table = WeightedTable::new([('a', 70), ('b', 25), ('c', 5)]).unwrap();
        assert_eq!(table.total_weight(), 100);
        assert!((table.probability(&'a') - 0.70).abs() < 1e-9);
        assert!((table.probability(&'c') - 0.05).abs() < 1e-9);
        assert_eq!(table.probability(&'z'), 0.0);
    }

    #[test]
    fn test_sample_frequencies() {
        let table = WeightedTable::new([('a', 70), ('b', 25), ('c', 5)]).unwrap();
        let mut rng = Pcg32::seed_from_u64(42);
        let n = 20_000;
        let mut counts = [0u32; 3];
        for _ in 0..n {
            match table.sample(&mut rng) {
                'a' => counts[0] += 1,
                'b' => counts[1] += 1,
                _ => counts[2] += 1,
            }
        }
        let freq = |c: u32| c as f64 / n as f64;
        assert!((freq(counts[0]) - 0.70).abs() < 0.02);
        assert!((freq(counts[1]) - 0.25).abs() < 0.02);
        assert!((freq(counts[2]) - 0.05).abs() < 0.01);
    }
}
