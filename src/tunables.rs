use crate::yields::Yield;

/// Named numeric configuration for the decision engine.
///
/// Every constant that shapes a weight formula lives here rather than inline
/// at the call site, so the formulas are testable in isolation and hosts can
/// retune without touching engine code.
#[derive(Debug, Clone)]
pub struct Tunables {
    /// Expected per-capita yield, times-100 fixed point, for the
    /// baseline-bearing categories. Food is lower than the rest because
    /// consumption is already netted out of the rate.
    pub expected_food_per_pop100: i32,
    pub expected_production_per_pop100: i32,
    pub expected_gold_per_pop100: i32,
    pub expected_science_per_pop100: i32,
    pub expected_culture_per_pop100: i32,
    pub expected_faith_per_pop100: i32,

    /// Base weight for a unit promised to a military operation.
    pub operation_unit_base_weight: i32,
    /// Per-point offense-flavor bonus on operation/army unit weights.
    pub operation_unit_flavor_multiplier: i32,
    /// Base weight for a unit wanted by a forming army.
    pub army_unit_base_weight: i32,

    /// Suggest rushing a chosen build that takes longer than this many
    /// turns (scaled by the game speed's train percent).
    pub rush_over_turns: i32,
    /// Processes only enter the candidate list when raw production
    /// (times 100) is at least this, or nothing else is buildable.
    pub process_fallback_production100: i32,
    /// Weight pinned onto defense-valued processes at generation time.
    pub defense_process_weight: i32,

    /// Duration reweighting: `weight / turns^(base + turns * per_turn)`.
    pub reweight_base: f64,
    pub reweight_per_turn: f64,

    /// Percent-of-max-weight cutoff for the final weighted-random draw.
    pub production_choice_cutoff: i32,

    /// Population bands for the city-size strategy triggers.
    pub small_city_pop: u32,
    pub medium_city_pop: u32,
    pub large_city_pop: u32,

    /// Extra purchase weight for buildings whose invested production is
    /// below this percentage (encourages finishing partially-built items).
    pub hurry_finish_boost_below_pct: i32,

    /// Don't ask for new tile improvers this many turns after one was
    /// disbanded for lack of work.
    pub no_worker_after_disband_turns: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Tunables {
            expected_food_per_pop100: 50,
            expected_production_per_pop100: 100,
            expected_gold_per_pop100: 150,
            expected_science_per_pop100: 250,
            expected_culture_per_pop100: 250,
            expected_faith_per_pop100: 250,
            operation_unit_base_weight: 5000,
            operation_unit_flavor_multiplier: 250,
            army_unit_base_weight: 750,
            rush_over_turns: 15,
            process_fallback_production100: 500,
            defense_process_weight: 100,
            reweight_base: 0.15,
            reweight_per_turn: 0.015,
            production_choice_cutoff: 25,
            small_city_pop: 2,
            medium_city_pop: 7,
            large_city_pop: 15,
            hurry_finish_boost_below_pct: 50,
            no_worker_after_disband_turns: 12,
        }
    }
}

impl Tunables {
    /// Expected per-capita baseline for a category, or `None` when the
    /// category has no configured baseline.
    pub fn expected_yield_per_pop100(&self, yield_kind: Yield) -> Option<i32> {
        match yield_kind {
            Yield::Food => Some(self.expected_food_per_pop100),
            Yield::Production => Some(self.expected_production_per_pop100),
            Yield::Gold => Some(self.expected_gold_per_pop100),
            Yield::Science => Some(self.expected_science_per_pop100),
            Yield::Culture => Some(self.expected_culture_per_pop100),
            Yield::Faith => Some(self.expected_faith_per_pop100),
            Yield::Tourism => None,
        }
    }

    /// Penalize long builds super-linearly: cheap items far from completion
    /// are suppressed relative to quick wins, while near-complete expensive
    /// items are not over-penalized as the remaining turns shrink.
    pub fn reweight_by_turns_left(&self, original_weight: i32, turns_left: i32) -> i32 {
        let cost_factor = self.reweight_base + turns_left as f64 * self.reweight_per_turn;
        let divisor = (turns_left as f64).powf(cost_factor);
        (original_weight as f64 / divisor) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reweight_strictly_decreases_with_turns_left() {
        let t = Tunables::default();
        let mut previous = i32::MAX;
        for turns in 1..60 {
            let w = t.reweight_by_turns_left(100_000, turns);
            assert!(
                w < previous,
                "weight did not decrease at turns={turns}: {w} >= {previous}"
            );
            previous = w;
        }
    }

    #[test]
    fn reweight_is_identity_at_one_turn() {
        let t = Tunables::default();
        // 1^x == 1 for any exponent
        assert_eq!(t.reweight_by_turns_left(12345, 1), 12345);
    }

    #[test]
    fn baseline_lookup_matches_category() {
        let t = Tunables::default();
        assert_eq!(t.expected_yield_per_pop100(Yield::Food), Some(50));
        assert_eq!(t.expected_yield_per_pop100(Yield::Science), Some(250));
        assert_eq!(t.expected_yield_per_pop100(Yield::Tourism), None);
    }
}
