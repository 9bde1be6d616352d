use serde::{Deserialize, Serialize};

use crate::tunables::Tunables;

/// Output categories a city produces. The first six carry an expected
/// per-capita baseline; categories after `Faith` have no baseline and are
/// never ranked for deficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Yield {
    Food,
    Production,
    Gold,
    Science,
    Culture,
    Faith,
    Tourism,
}

pub const YIELD_COUNT: usize = 7;

impl Yield {
    pub const ALL: [Yield; YIELD_COUNT] = [
        Yield::Food,
        Yield::Production,
        Yield::Gold,
        Yield::Science,
        Yield::Culture,
        Yield::Faith,
        Yield::Tourism,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// True for the categories that participate in deficiency ranking.
    pub fn has_baseline(self) -> bool {
        self <= Yield::Faith
    }
}

/// Per-city yield deviation stats, recomputed once per turn before strategy
/// evaluation (deficiency predicates depend on it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldStats {
    /// `max(0, expected - actual)` per capita, times-100 fixed point.
    /// Used elsewhere to bias scoring toward filling gaps.
    modifier100: [i32; YIELD_COUNT],
    most_deficient: Option<Yield>,
    most_abundant: Option<Yield>,
}

impl Default for YieldStats {
    fn default() -> Self {
        YieldStats {
            modifier100: [0; YIELD_COUNT],
            most_deficient: None,
            most_abundant: None,
        }
    }
}

impl YieldStats {
    /// Compare each per-capita rate against its expected baseline.
    ///
    /// Categories without a baseline are measured against 100% of actual,
    /// so they never show a surplus or a deficit of their own.
    pub fn compute(rates100: &[i32; YIELD_COUNT], population: u32, tunables: &Tunables) -> Self {
        let pop = population.max(1) as i32;

        let mut modifier100 = [0; YIELD_COUNT];
        // score = -delta, so the front after a descending sort is the most
        // abundant category and the back the most deficient one
        let mut deviations: Vec<(Yield, i32)> = Vec::new();

        for yield_kind in Yield::ALL {
            let i = yield_kind.index();
            let per_pop100 = rates100[i] / pop;
            let expected100 = tunables.expected_yield_per_pop100(yield_kind).unwrap_or(100);
            let delta = expected100 - per_pop100;

            if yield_kind.has_baseline() {
                deviations.push((yield_kind, -delta));
            }
            modifier100[i] = delta.max(0);
        }

        deviations.sort_by_key(|(_, score)| std::cmp::Reverse(*score));

        let (front, front_score) = deviations[0];
        let (back, back_score) = deviations[deviations.len() - 1];

        YieldStats {
            modifier100,
            most_abundant: (front_score > 0).then_some(front),
            most_deficient: (back_score < 0).then_some(back),
        }
    }

    pub fn modifier100(&self, yield_kind: Yield) -> i32 {
        self.modifier100[yield_kind.index()]
    }

    pub fn most_deficient(&self) -> Option<Yield> {
        self.most_deficient
    }

    pub fn most_abundant(&self) -> Option<Yield> {
        self.most_abundant
    }
}
