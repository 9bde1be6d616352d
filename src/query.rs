use crate::buildable::BuildKind;
use crate::catalog::{
    BuildingTypeId, ProcessTypeId, ProjectTypeId, StrategyId, TechId, UnitTypeId, VictoryId,
};
use crate::flavor::FlavorId;
use crate::yields::Yield;

pub type CityId = u64;
pub type PlayerId = u64;

/// Currency a purchase request is made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseCurrency {
    Gold,
    Faith,
}

/// Aggregate statistics about the tiles a city works. Consumed opaquely by
/// the building advisor's sanity check.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotStats {
    pub worked_tiles: u32,
    pub water_tiles: u32,
    pub hill_tiles: u32,
    pub forest_tiles: u32,
}

/// Read-only view of one city for the duration of an evaluation pass.
///
/// The host guarantees single-threaded turn execution, so implementations
/// may answer from live game state or from a snapshot; the engine treats
/// the answers as frozen for one pass either way.
pub trait CityView {
    fn id(&self) -> CityId;
    fn owner(&self) -> PlayerId;
    fn population(&self) -> u32;
    fn yield_rate100(&self, yield_kind: Yield) -> i32;
    fn raw_production_per_turn100(&self) -> i32;

    /// The item currently under construction, if any.
    fn current_build(&self) -> Option<(BuildKind, usize)>;
    fn is_building_wonder(&self) -> bool;
    fn is_human_automated(&self) -> bool;

    fn can_train(&self, unit: UnitTypeId, continuing: bool) -> bool;
    fn can_construct(&self, building: BuildingTypeId, continuing: bool) -> bool;
    fn can_create(&self, project: ProjectTypeId, continuing: bool) -> bool;
    fn can_maintain(&self, process: ProcessTypeId, continuing: bool) -> bool;
    fn can_purchase(&self, kind: BuildKind, index: usize, currency: PurchaseCurrency) -> bool;

    /// Estimated turns to finish the given item from the current state.
    fn turns_to_build(&self, kind: BuildKind, index: usize) -> i32;
    /// Percentage of a building's production cost already invested.
    fn invested_production_pct(&self, building: BuildingTypeId) -> i32;
    fn plot_stats(&self) -> PlotStats;

    // Facts consumed by the builtin strategy triggers.
    fn is_coastal(&self) -> bool;
    fn is_capital(&self) -> bool;
    fn is_under_blockade(&self) -> bool;
    fn is_threatened(&self) -> bool;
}

/// Read-only-plus-counters view of the city's owner.
///
/// The two skip counters are the only mutations the engine performs through
/// this trait; they are empire-wide pressure signals read by predicates on
/// later turns.
pub trait PlayerView {
    fn id(&self) -> PlayerId;
    fn is_minor_or_barbarian(&self) -> bool;
    fn has_tech(&self, tech: TechId) -> bool;

    /// Personality-and-grand-strategy offense flavor, used to scale
    /// operation/army unit weights.
    fn offense_flavor(&self) -> i32;
    fn personality_flavor(&self, flavor: FlavorId) -> i32;

    /// Unit the player's pending operation wants this city to build.
    fn unit_for_operation(&self, city: CityId) -> Option<UnitTypeId>;
    /// Unit a forming army wants from this city.
    fn unit_for_army(&self, city: CityId) -> Option<UnitTypeId>;
    /// True when the pending operation slot is valid and musters here.
    fn operation_musters_here(&self, city: CityId) -> bool;

    fn is_losing_money(&self) -> bool;
    fn is_early_expansion(&self) -> bool;
    fn has_supply_room(&self) -> bool;
    fn is_victory_valid(&self, victory: VictoryId) -> bool;
    /// Game-speed production scaling, 100 = normal speed.
    fn train_percent(&self) -> i32;
    /// Count of each building type across the whole empire, indexed by
    /// building type id.
    fn total_building_counts(&self) -> Vec<u32>;

    /// City-flavor deltas of the player's active player-level strategies,
    /// propagated into a newly founded city: (source name, dense deltas).
    fn active_city_flavors(&self) -> Vec<(String, Vec<i32>)>;

    fn ops_build_skipped(&self) -> i32;
    fn bump_ops_build_skipped(&mut self);
    fn reset_ops_build_skipped(&mut self);
    fn bump_settler_build_skipped(&mut self);
    fn reset_settler_build_skipped(&mut self);

    // Facts consumed by the builtin strategy triggers.
    fn worker_count(&self) -> u32;
    fn cities_needing_improvement(&self) -> u32;
    fn last_turn_worker_disbanded(&self) -> Option<u32>;
    fn has_enough_settlers(&self) -> bool;
}

/// Optional scripting veto: called after a trigger fires, may override the
/// result to false. `None` means no listener registered interest.
pub type VetoHook = dyn Fn(StrategyId, PlayerId, CityId) -> Option<bool>;
