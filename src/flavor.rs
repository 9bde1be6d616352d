use serde::{Deserialize, Serialize};

pub type FlavorId = usize;

/// Running sum of flavor contributions from every active source (strategies,
/// specialization, player-level strategies propagated down to the city).
///
/// Invariant: each entry equals the sum of contributions from the currently
/// active sources; removing a source subtracts exactly what it added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorAccumulator {
    values: Vec<i32>,
}

impl FlavorAccumulator {
    /// Sized by the externally-supplied flavor catalog count.
    pub fn new(flavor_count: usize) -> Self {
        FlavorAccumulator {
            values: vec![0; flavor_count],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, flavor: FlavorId) -> i32 {
        self.values.get(flavor).copied().unwrap_or(0)
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn add(&mut self, flavor: FlavorId, delta: i32) {
        debug_assert!(flavor < self.values.len(), "flavor {flavor} out of bounds");
        if let Some(value) = self.values.get_mut(flavor) {
            *value += delta;
        }
    }

    /// Apply a source's dense delta array with the given sign (+1 on
    /// activation, -1 on deactivation). Returns each non-zero change so the
    /// caller can log it.
    pub fn apply(&mut self, deltas: &[i32], sign: i32) -> Vec<(FlavorId, i32)> {
        debug_assert_eq!(deltas.len(), self.values.len(), "flavor array size mismatch");
        let mut changes = Vec::new();
        for (flavor, delta) in deltas.iter().enumerate() {
            if *delta == 0 {
                continue;
            }
            let change = delta * sign;
            self.values[flavor] += change;
            changes.push((flavor, change));
        }
        changes
    }

    /// Restore from a saved snapshot.
    pub fn restore(&mut self, values: &[i32]) {
        self.values.clear();
        self.values.extend_from_slice(values);
    }
}
