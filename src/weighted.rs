use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Deterministic seed for weighted draws.
///
/// Every randomized selection in the engine derives from a fixed per-call-site
/// constant mixed with the city's stable identifier, so the same
/// (turn, city, context) always draws the same outcome on every machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed(u64);

impl Seed {
    pub fn from_raw(value: u64) -> Self {
        Seed(value)
    }

    /// Fold another value into the seed (splitmix64 finalizer).
    pub fn mix(self, value: u64) -> Self {
        let mut z = self
            .0
            .wrapping_add(value)
            .wrapping_add(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        Seed(z ^ (z >> 31))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Append-only collection of (item, weight) pairs.
///
/// Callers build the list in a fixed precedence order and rely on
/// `stable_sort_descending` breaking ties toward earlier-pushed items.
#[derive(Debug, Clone, Default)]
pub struct WeightedList<T> {
    entries: Vec<(T, i32)>,
}

impl<T> WeightedList<T> {
    pub fn new() -> Self {
        WeightedList {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, item: T, weight: i32) {
        self.entries.push((item, weight));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn item(&self, index: usize) -> &T {
        &self.entries[index].0
    }

    pub fn weight(&self, index: usize) -> i32 {
        self.entries[index].1
    }

    pub fn set_weight(&mut self, index: usize, weight: i32) {
        self.entries[index].1 = weight;
    }

    pub fn total_weight(&self) -> i64 {
        self.entries.iter().map(|(_, w)| *w as i64).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, i32)> {
        self.entries.iter().map(|(item, w)| (item, *w))
    }

    /// Sort by weight descending; equal weights keep insertion order.
    pub fn stable_sort_descending(&mut self) {
        self.entries.sort_by_key(|(_, w)| std::cmp::Reverse(*w));
    }

    /// Weighted-random draw restricted to items at or above `percent`% of the
    /// maximum weight in the list. Items strictly below the cutoff are
    /// discarded. Returns `None` for an empty list or when the surviving
    /// total weight is zero; callers must treat that as "no selection" and
    /// fall back.
    pub fn choose_above_percent_threshold(&self, percent: i32, seed: Seed) -> Option<&T> {
        let max_weight = self.entries.iter().map(|(_, w)| *w).max()?;
        let cutoff = (max_weight as i64 * percent as i64 / 100) as i32;

        let total: i64 = self
            .entries
            .iter()
            .filter(|(_, w)| *w >= cutoff)
            .map(|(_, w)| *w as i64)
            .sum();
        if total <= 0 {
            return None;
        }

        let mut rng = SmallRng::seed_from_u64(seed.value());
        let mut roll = rng.random_range(0..total);
        for (item, weight) in &self.entries {
            if *weight < cutoff {
                continue;
            }
            if roll < *weight as i64 {
                return Some(item);
            }
            roll -= *weight as i64;
        }
        None
    }
}
