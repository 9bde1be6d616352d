use serde::{Deserialize, Serialize};

use crate::yields::Yield;

pub type StrategyId = usize;
pub type UnitTypeId = usize;
pub type BuildingTypeId = usize;
pub type ProjectTypeId = usize;
pub type ProcessTypeId = usize;
pub type SpecializationId = usize;
pub type TechId = usize;
pub type VictoryId = usize;

/// Which council seat a strategy's counsel text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisor {
    Military,
    Economic,
    Foreign,
    Science,
}

#[derive(Debug, Clone)]
pub struct AdvisorCounsel {
    pub advisor: Advisor,
    pub text: String,
    pub importance: i32,
}

/// A named, data-defined behavioral mode a city can adopt. Loaded once at
/// data-load time, never mutated, shared read-only by all cities.
#[derive(Debug, Clone)]
pub struct StrategyDef {
    pub name: String,
    /// Trigger identifier, resolved against the registry at engine
    /// construction.
    pub trigger: String,
    /// Dense per-flavor weight deltas applied on activation.
    pub flavors: Vec<i32>,
    pub weight_threshold: i32,
    /// Per-flavor modifiers applied to the threshold via the player's
    /// personality flavors.
    pub flavor_threshold_mods: Vec<i32>,
    pub tech_prereq: Option<TechId>,
    pub tech_obsolete: Option<TechId>,
    pub minimum_turns_executed: u32,
    /// Recheck the trigger every this many turns after adoption; zero means
    /// the strategy is never reconsidered once adopted.
    pub check_trigger_turns: u32,
    pub no_minor_civs: bool,
    pub permanent: bool,
    pub counsel: Option<AdvisorCounsel>,
}

impl StrategyDef {
    pub fn new(name: &str, trigger: &str, flavor_count: usize) -> Self {
        StrategyDef {
            name: name.to_string(),
            trigger: trigger.to_string(),
            flavors: vec![0; flavor_count],
            weight_threshold: 0,
            flavor_threshold_mods: vec![0; flavor_count],
            tech_prereq: None,
            tech_obsolete: None,
            minimum_turns_executed: 0,
            check_trigger_turns: 0,
            no_minor_civs: false,
            permanent: false,
            counsel: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnitDef {
    pub name: String,
    pub combat: i32,
    pub ranged_combat: i32,
    /// Can found a city (feeds the empire-wide settler pressure counter).
    pub founds_city: bool,
    pub work_rate: i32,
    /// Counts against the military unit supply cap.
    pub military_support: bool,
    pub supply_exempt: bool,
    pub spreads_religion: bool,
    pub removes_heresy: bool,
    pub faith_cost: i32,
    pub special: bool,
}

impl UnitDef {
    pub fn is_combat(&self) -> bool {
        self.combat > 0 || self.ranged_combat > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildingDef {
    pub name: String,
    pub is_wonder: bool,
    pub defense_modifier: i32,
    pub maintenance: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectDef {
    pub name: String,
    pub victory_prereq: Option<VictoryId>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessDef {
    pub name: String,
    /// Converts production into this yield while maintained.
    pub yield_kind: Option<Yield>,
    pub defense_value: i32,
}

/// Mutually exclusive focus mode for a city.
#[derive(Debug, Clone)]
pub struct SpecializationDef {
    pub name: String,
    pub flavors: Vec<i32>,
    pub yield_focus: Option<Yield>,
}

/// Read-only lookup tables keyed by integer identifiers.
///
/// Lists may contain holes (`None`); those are skipped by iteration, never
/// treated as errors.
#[derive(Debug, Default)]
pub struct Catalog {
    flavor_names: Vec<String>,
    strategies: Vec<Option<StrategyDef>>,
    units: Vec<Option<UnitDef>>,
    buildings: Vec<Option<BuildingDef>>,
    projects: Vec<Option<ProjectDef>>,
    processes: Vec<Option<ProcessDef>>,
    specializations: Vec<Option<SpecializationDef>>,
}

impl Catalog {
    pub fn new(flavor_names: Vec<String>) -> Self {
        Catalog {
            flavor_names,
            ..Catalog::default()
        }
    }

    pub fn flavor_count(&self) -> usize {
        self.flavor_names.len()
    }

    pub fn flavor_name(&self, flavor: usize) -> &str {
        self.flavor_names
            .get(flavor)
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    pub fn add_strategy(&mut self, def: StrategyDef) -> StrategyId {
        self.strategies.push(Some(def));
        self.strategies.len() - 1
    }

    /// Reserve an empty slot (data hole).
    pub fn add_strategy_hole(&mut self) -> StrategyId {
        self.strategies.push(None);
        self.strategies.len() - 1
    }

    pub fn add_unit(&mut self, def: UnitDef) -> UnitTypeId {
        self.units.push(Some(def));
        self.units.len() - 1
    }

    pub fn add_building(&mut self, def: BuildingDef) -> BuildingTypeId {
        self.buildings.push(Some(def));
        self.buildings.len() - 1
    }

    pub fn add_project(&mut self, def: ProjectDef) -> ProjectTypeId {
        self.projects.push(Some(def));
        self.projects.len() - 1
    }

    pub fn add_process(&mut self, def: ProcessDef) -> ProcessTypeId {
        self.processes.push(Some(def));
        self.processes.len() - 1
    }

    pub fn add_specialization(&mut self, def: SpecializationDef) -> SpecializationId {
        self.specializations.push(Some(def));
        self.specializations.len() - 1
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    pub fn strategy(&self, id: StrategyId) -> Option<&StrategyDef> {
        self.strategies.get(id).and_then(Option::as_ref)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn unit(&self, id: UnitTypeId) -> Option<&UnitDef> {
        self.units.get(id).and_then(Option::as_ref)
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn building(&self, id: BuildingTypeId) -> Option<&BuildingDef> {
        self.buildings.get(id).and_then(Option::as_ref)
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn project(&self, id: ProjectTypeId) -> Option<&ProjectDef> {
        self.projects.get(id).and_then(Option::as_ref)
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn process(&self, id: ProcessTypeId) -> Option<&ProcessDef> {
        self.processes.get(id).and_then(Option::as_ref)
    }

    pub fn specialization(&self, id: SpecializationId) -> Option<&SpecializationDef> {
        self.specializations.get(id).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holes_are_skippable_not_errors() {
        let mut catalog = Catalog::new(vec!["growth".into()]);
        let a = catalog.add_strategy(StrategyDef::new("A", "tiny_city", 1));
        let hole = catalog.add_strategy_hole();
        let b = catalog.add_strategy(StrategyDef::new("B", "small_city", 1));

        assert_eq!(catalog.strategy_count(), 3);
        assert!(catalog.strategy(a).is_some());
        assert!(catalog.strategy(hole).is_none());
        assert!(catalog.strategy(b).is_some());
        assert!(catalog.strategy(99).is_none());
    }

    #[test]
    fn flavor_name_falls_back_for_bad_index() {
        let catalog = Catalog::new(vec!["growth".into(), "offense".into()]);
        assert_eq!(catalog.flavor_name(1), "offense");
        assert_eq!(catalog.flavor_name(5), "unknown");
    }
}
