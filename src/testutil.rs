//! Scenario-building helpers shared by unit and integration tests.
//!
//! `TestCity` and `TestPlayer` are plain-struct implementations of the host
//! traits where every answer is a public field, and `ScriptedAdvisor` is an
//! advisor whose weights and rejections come from lookup tables.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::advisors::{
    AdvisorSet, BuildingAdvisor, ProcessAdvisor, ProjectAdvisor, RejectReason, Sanity, SanityCtx,
    UnitAdvisor,
};
use crate::buildable::BuildKind;
use crate::catalog::{
    BuildingDef, BuildingTypeId, Catalog, ProcessTypeId, ProjectTypeId, TechId, UnitDef,
    UnitTypeId, VictoryId,
};
use crate::flavor::FlavorAccumulator;
use crate::log::{DecisionLog, LogRecord};
use crate::query::{CityId, CityView, PlayerId, PlayerView, PlotStats, PurchaseCurrency};
use crate::strategy::{CityStrategyAi, TriggerRegistry};
use crate::yields::{YIELD_COUNT, Yield};

// ---------------------------------------------------------------------------
// Catalog builders
// ---------------------------------------------------------------------------

/// Catalog with a representative flavor list and nothing else.
pub fn test_catalog() -> Catalog {
    Catalog::new(
        [
            "growth",
            "production",
            "gold",
            "science",
            "culture",
            "faith",
            "offense",
            "defense",
            "expansion",
            "infrastructure",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    )
}

pub fn combat_unit(name: &str) -> UnitDef {
    UnitDef {
        name: name.to_string(),
        combat: 20,
        military_support: true,
        ..UnitDef::default()
    }
}

pub fn settler_unit(name: &str) -> UnitDef {
    UnitDef {
        name: name.to_string(),
        founds_city: true,
        ..UnitDef::default()
    }
}

pub fn worker_unit(name: &str) -> UnitDef {
    UnitDef {
        name: name.to_string(),
        work_rate: 100,
        ..UnitDef::default()
    }
}

pub fn simple_building(name: &str) -> BuildingDef {
    BuildingDef {
        name: name.to_string(),
        ..BuildingDef::default()
    }
}

pub fn wonder(name: &str) -> BuildingDef {
    BuildingDef {
        name: name.to_string(),
        is_wonder: true,
        ..BuildingDef::default()
    }
}

// ---------------------------------------------------------------------------
// Host-trait fakes
// ---------------------------------------------------------------------------

/// City whose every trait answer is a field.
pub struct TestCity {
    pub id: CityId,
    pub owner: PlayerId,
    pub population: u32,
    pub yields100: [i32; YIELD_COUNT],
    pub raw_production100: i32,
    pub current_build: Option<(BuildKind, usize)>,
    pub building_wonder: bool,
    pub human_automated: bool,
    pub trainable: Vec<UnitTypeId>,
    pub constructible: Vec<BuildingTypeId>,
    pub creatable: Vec<ProjectTypeId>,
    pub maintainable: Vec<ProcessTypeId>,
    pub purchasable: Vec<(BuildKind, usize, PurchaseCurrency)>,
    pub build_turns: HashMap<(BuildKind, usize), i32>,
    pub invested_pct: HashMap<BuildingTypeId, i32>,
    pub plot: PlotStats,
    pub coastal: bool,
    pub capital: bool,
    pub blockaded: bool,
    pub threatened: bool,
}

impl Default for TestCity {
    fn default() -> Self {
        TestCity {
            id: 42,
            owner: 1,
            population: 5,
            yields100: [0; YIELD_COUNT],
            raw_production100: 0,
            current_build: None,
            building_wonder: false,
            human_automated: false,
            trainable: Vec::new(),
            constructible: Vec::new(),
            creatable: Vec::new(),
            maintainable: Vec::new(),
            purchasable: Vec::new(),
            build_turns: HashMap::new(),
            invested_pct: HashMap::new(),
            plot: PlotStats::default(),
            coastal: false,
            capital: false,
            blockaded: false,
            threatened: false,
        }
    }
}

impl CityView for TestCity {
    fn id(&self) -> CityId {
        self.id
    }

    fn owner(&self) -> PlayerId {
        self.owner
    }

    fn population(&self) -> u32 {
        self.population
    }

    fn yield_rate100(&self, yield_kind: Yield) -> i32 {
        self.yields100[yield_kind.index()]
    }

    fn raw_production_per_turn100(&self) -> i32 {
        self.raw_production100
    }

    fn current_build(&self) -> Option<(BuildKind, usize)> {
        self.current_build
    }

    fn is_building_wonder(&self) -> bool {
        self.building_wonder
    }

    fn is_human_automated(&self) -> bool {
        self.human_automated
    }

    fn can_train(&self, unit: UnitTypeId, _continuing: bool) -> bool {
        self.trainable.contains(&unit)
    }

    fn can_construct(&self, building: BuildingTypeId, _continuing: bool) -> bool {
        self.constructible.contains(&building)
    }

    fn can_create(&self, project: ProjectTypeId, _continuing: bool) -> bool {
        self.creatable.contains(&project)
    }

    fn can_maintain(&self, process: ProcessTypeId, _continuing: bool) -> bool {
        self.maintainable.contains(&process)
    }

    fn can_purchase(&self, kind: BuildKind, index: usize, currency: PurchaseCurrency) -> bool {
        self.purchasable.contains(&(kind, index, currency))
    }

    fn turns_to_build(&self, kind: BuildKind, index: usize) -> i32 {
        self.build_turns.get(&(kind, index)).copied().unwrap_or(1)
    }

    fn invested_production_pct(&self, building: BuildingTypeId) -> i32 {
        self.invested_pct.get(&building).copied().unwrap_or(0)
    }

    fn plot_stats(&self) -> PlotStats {
        self.plot
    }

    fn is_coastal(&self) -> bool {
        self.coastal
    }

    fn is_capital(&self) -> bool {
        self.capital
    }

    fn is_under_blockade(&self) -> bool {
        self.blockaded
    }

    fn is_threatened(&self) -> bool {
        self.threatened
    }
}

/// Player whose every trait answer is a field, plus the two mutable
/// pressure counters.
pub struct TestPlayer {
    pub id: PlayerId,
    pub minor: bool,
    pub techs: Vec<TechId>,
    pub offense_flavor: i32,
    pub personality_flavors: Vec<i32>,
    pub operation_unit: Option<UnitTypeId>,
    pub army_unit: Option<UnitTypeId>,
    pub operation_musters: bool,
    pub losing_money: bool,
    pub early_expansion: bool,
    pub supply_room: bool,
    pub valid_victories: Vec<VictoryId>,
    pub train_percent: i32,
    pub building_counts: Vec<u32>,
    pub city_flavor_sources: Vec<(String, Vec<i32>)>,
    pub ops_skipped: i32,
    pub settler_skipped: i32,
    pub worker_count: u32,
    pub cities_needing_improvement: u32,
    pub last_turn_worker_disbanded: Option<u32>,
    pub enough_settlers: bool,
}

impl Default for TestPlayer {
    fn default() -> Self {
        TestPlayer {
            id: 1,
            minor: false,
            techs: Vec::new(),
            offense_flavor: 0,
            personality_flavors: Vec::new(),
            operation_unit: None,
            army_unit: None,
            operation_musters: true,
            losing_money: false,
            early_expansion: false,
            supply_room: true,
            valid_victories: Vec::new(),
            train_percent: 100,
            building_counts: Vec::new(),
            city_flavor_sources: Vec::new(),
            ops_skipped: 0,
            settler_skipped: 0,
            worker_count: 1,
            cities_needing_improvement: 0,
            last_turn_worker_disbanded: None,
            enough_settlers: true,
        }
    }
}

impl PlayerView for TestPlayer {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn is_minor_or_barbarian(&self) -> bool {
        self.minor
    }

    fn has_tech(&self, tech: TechId) -> bool {
        self.techs.contains(&tech)
    }

    fn offense_flavor(&self) -> i32 {
        self.offense_flavor
    }

    fn personality_flavor(&self, flavor: usize) -> i32 {
        self.personality_flavors.get(flavor).copied().unwrap_or(0)
    }

    fn unit_for_operation(&self, _city: CityId) -> Option<UnitTypeId> {
        self.operation_unit
    }

    fn unit_for_army(&self, _city: CityId) -> Option<UnitTypeId> {
        self.army_unit
    }

    fn operation_musters_here(&self, _city: CityId) -> bool {
        self.operation_musters
    }

    fn is_losing_money(&self) -> bool {
        self.losing_money
    }

    fn is_early_expansion(&self) -> bool {
        self.early_expansion
    }

    fn has_supply_room(&self) -> bool {
        self.supply_room
    }

    fn is_victory_valid(&self, victory: VictoryId) -> bool {
        self.valid_victories.contains(&victory)
    }

    fn train_percent(&self) -> i32 {
        self.train_percent
    }

    fn total_building_counts(&self) -> Vec<u32> {
        self.building_counts.clone()
    }

    fn active_city_flavors(&self) -> Vec<(String, Vec<i32>)> {
        self.city_flavor_sources.clone()
    }

    fn ops_build_skipped(&self) -> i32 {
        self.ops_skipped
    }

    fn bump_ops_build_skipped(&mut self) {
        self.ops_skipped += 1;
    }

    fn reset_ops_build_skipped(&mut self) {
        self.ops_skipped = 0;
    }

    fn bump_settler_build_skipped(&mut self) {
        self.settler_skipped += 1;
    }

    fn reset_settler_build_skipped(&mut self) {
        self.settler_skipped = 0;
    }

    fn worker_count(&self) -> u32 {
        self.worker_count
    }

    fn cities_needing_improvement(&self) -> u32 {
        self.cities_needing_improvement
    }

    fn last_turn_worker_disbanded(&self) -> Option<u32> {
        self.last_turn_worker_disbanded
    }

    fn has_enough_settlers(&self) -> bool {
        self.enough_settlers
    }
}

// ---------------------------------------------------------------------------
// Scripted advisors
// ---------------------------------------------------------------------------

/// Advisor driven by lookup tables. Cloning shares the notification
/// counter, so a test can keep a handle after boxing.
#[derive(Clone, Default)]
pub struct ScriptedAdvisor {
    pub weights: HashMap<usize, i32>,
    pub rejects: HashMap<usize, RejectReason>,
    pub flavor_updates: Rc<Cell<u32>>,
}

impl ScriptedAdvisor {
    fn table_weight(&self, index: usize) -> i32 {
        self.weights.get(&index).copied().unwrap_or(0)
    }

    fn table_sanity(&self, index: usize, current_weight: i32) -> Sanity {
        match self.rejects.get(&index) {
            Some(reason) => Sanity::Reject(*reason),
            None => Sanity::Keep(current_weight),
        }
    }

    fn note_flavor_update(&self) {
        self.flavor_updates.set(self.flavor_updates.get() + 1);
    }
}

impl UnitAdvisor for ScriptedAdvisor {
    fn weight(&self, unit: UnitTypeId) -> i32 {
        self.table_weight(unit)
    }

    fn check_sanity(
        &self,
        unit: UnitTypeId,
        _for_operation: bool,
        _for_purchase: bool,
        current_weight: i32,
        _ctx: &SanityCtx,
    ) -> Sanity {
        self.table_sanity(unit, current_weight)
    }

    fn on_flavors_changed(&mut self, _flavors: &FlavorAccumulator) {
        self.note_flavor_update();
    }
}

impl BuildingAdvisor for ScriptedAdvisor {
    fn weight(&self, building: BuildingTypeId) -> i32 {
        self.table_weight(building)
    }

    fn check_sanity(
        &self,
        building: BuildingTypeId,
        current_weight: i32,
        _ctx: &SanityCtx,
    ) -> Sanity {
        self.table_sanity(building, current_weight)
    }

    fn on_flavors_changed(&mut self, _flavors: &FlavorAccumulator) {
        self.note_flavor_update();
    }
}

impl ProjectAdvisor for ScriptedAdvisor {
    fn weight(&self, project: ProjectTypeId) -> i32 {
        self.table_weight(project)
    }

    fn check_sanity(&self, project: ProjectTypeId, current_weight: i32) -> Sanity {
        self.table_sanity(project, current_weight)
    }

    fn on_flavors_changed(&mut self, _flavors: &FlavorAccumulator) {
        self.note_flavor_update();
    }
}

impl ProcessAdvisor for ScriptedAdvisor {
    fn weight(&self, process: ProcessTypeId) -> i32 {
        self.table_weight(process)
    }

    fn check_sanity(&self, process: ProcessTypeId, current_weight: i32) -> Sanity {
        self.table_sanity(process, current_weight)
    }

    fn on_flavors_changed(&mut self, _flavors: &FlavorAccumulator) {
        self.note_flavor_update();
    }
}

pub fn scripted_advisor() -> ScriptedAdvisor {
    ScriptedAdvisor::default()
}

/// Advisor set with empty tables in every seat.
pub fn scripted_advisors() -> AdvisorSet {
    advisors_with(scripted_advisor(), scripted_advisor())
}

/// Advisor set with the given unit and building advisors; the project and
/// process seats get empty tables.
pub fn advisors_with(unit: ScriptedAdvisor, building: ScriptedAdvisor) -> AdvisorSet {
    AdvisorSet {
        unit: Box::new(unit),
        building: Box::new(building),
        project: Box::new(scripted_advisor()),
        process: Box::new(scripted_advisor()),
    }
}

// ---------------------------------------------------------------------------
// Engine construction
// ---------------------------------------------------------------------------

/// Log sink sharing its record buffer, so a test can inspect records after
/// handing the sink to the engine.
#[derive(Clone, Default)]
pub struct SharedLog(pub Rc<RefCell<Vec<LogRecord>>>);

impl DecisionLog for SharedLog {
    fn record(&mut self, record: &LogRecord) {
        self.0.borrow_mut().push(record.clone());
    }
}

pub fn engine(catalog: &Catalog) -> CityStrategyAi {
    CityStrategyAi::new(catalog, &TriggerRegistry::builtin(), scripted_advisors(), None)
        .expect("builtin triggers cover the test catalog")
}

pub fn engine_with_advisors(catalog: &Catalog, advisors: AdvisorSet) -> CityStrategyAi {
    CityStrategyAi::new(catalog, &TriggerRegistry::builtin(), advisors, None)
        .expect("builtin triggers cover the test catalog")
}

pub fn engine_with_log(catalog: &Catalog, log: SharedLog) -> CityStrategyAi {
    CityStrategyAi::new(
        catalog,
        &TriggerRegistry::builtin(),
        scripted_advisors(),
        Some(Box::new(log)),
    )
    .expect("builtin triggers cover the test catalog")
}
