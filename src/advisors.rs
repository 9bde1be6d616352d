use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingTypeId, ProcessTypeId, ProjectTypeId, UnitTypeId};
use crate::flavor::FlavorAccumulator;
use crate::query::{CityView, PlayerView, PlotStats};

/// Why a candidate was rejected by a sanity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Impossible,
    NoSupply,
    TooExpensive,
    WrongTiming,
    Useless,
    UnitBalance,
}

/// Outcome of a kind-specific sanity check: either a re-derived weight or a
/// rejection with a reason code. Rejections are dropped and logged, never
/// fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanity {
    Keep(i32),
    Reject(RejectReason),
}

impl Sanity {
    /// Map the raw integer convention (≤0 rejects) onto a verdict.
    pub fn from_weight(weight: i32, reason: RejectReason) -> Self {
        if weight > 0 {
            Sanity::Keep(weight)
        } else {
            Sanity::Reject(reason)
        }
    }
}

/// Shared context handed to sanity checks.
pub struct SanityCtx<'a> {
    pub city: &'a dyn CityView,
    pub player: &'a dyn PlayerView,
    pub plot: PlotStats,
    pub existing_buildings: &'a [u32],
}

/// Production-AI collaborator for trainable units. Weights are the
/// collaborator's own business; the engine only feeds it flavor changes and
/// consumes weights/verdicts.
pub trait UnitAdvisor {
    fn weight(&self, unit: UnitTypeId) -> i32;
    fn check_sanity(
        &self,
        unit: UnitTypeId,
        for_operation: bool,
        for_purchase: bool,
        current_weight: i32,
        ctx: &SanityCtx,
    ) -> Sanity;
    fn on_flavors_changed(&mut self, flavors: &FlavorAccumulator);

    /// Embedded save state, carried inside the city save record.
    fn save_state(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
    fn load_state(&mut self, _state: &serde_json::Value) {}
}

pub trait BuildingAdvisor {
    fn weight(&self, building: BuildingTypeId) -> i32;
    fn check_sanity(&self, building: BuildingTypeId, current_weight: i32, ctx: &SanityCtx)
    -> Sanity;
    fn on_flavors_changed(&mut self, flavors: &FlavorAccumulator);

    fn save_state(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
    fn load_state(&mut self, _state: &serde_json::Value) {}
}

pub trait ProjectAdvisor {
    fn weight(&self, project: ProjectTypeId) -> i32;
    fn check_sanity(&self, project: ProjectTypeId, current_weight: i32) -> Sanity;
    fn on_flavors_changed(&mut self, flavors: &FlavorAccumulator);

    fn save_state(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
    fn load_state(&mut self, _state: &serde_json::Value) {}
}

pub trait ProcessAdvisor {
    fn weight(&self, process: ProcessTypeId) -> i32;
    fn check_sanity(&self, process: ProcessTypeId, current_weight: i32) -> Sanity;
    fn on_flavors_changed(&mut self, flavors: &FlavorAccumulator);

    fn save_state(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
    fn load_state(&mut self, _state: &serde_json::Value) {}
}

/// The four production-AI collaborators, one per buildable kind.
pub struct AdvisorSet {
    pub unit: Box<dyn UnitAdvisor>,
    pub building: Box<dyn BuildingAdvisor>,
    pub project: Box<dyn ProjectAdvisor>,
    pub process: Box<dyn ProcessAdvisor>,
}

impl AdvisorSet {
    /// Broadcast after any strategy or specialization transition so the
    /// collaborators can rebuild their weight tables.
    pub fn on_flavors_changed(&mut self, flavors: &FlavorAccumulator) {
        self.unit.on_flavors_changed(flavors);
        self.building.on_flavors_changed(flavors);
        self.project.on_flavors_changed(flavors);
        self.process.on_flavors_changed(flavors);
    }
}
