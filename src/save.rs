//! Serialization of the per-city decision state.
//!
//! Only durable state is saved: the flavor accumulator, the per-strategy
//! activation flags and adoption turns, the specialization pair, and each
//! advisor's embedded blob. Candidate lists and yield stats are transient
//! and recomputed on the first turn after a load.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, SpecializationId};
use crate::error::EngineError;
use crate::strategy::CityStrategyAi;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCityAi {
    pub flavors: Vec<i32>,
    pub active: Vec<bool>,
    pub turn_adopted: Vec<i32>,
    pub specialization: Option<SpecializationId>,
    pub default_specialization: Option<SpecializationId>,
    /// Unit, building, project, process advisor blobs, in that order.
    pub advisors: [serde_json::Value; 4],
}

impl CityStrategyAi {
    pub fn save(&self) -> SavedCityAi {
        SavedCityAi {
            flavors: self.flavors.values().to_vec(),
            active: self.active.clone(),
            turn_adopted: self.turn_adopted.clone(),
            specialization: self.specialization,
            default_specialization: self.default_specialization,
            advisors: [
                self.advisors.unit.save_state(),
                self.advisors.building.save_state(),
                self.advisors.project.save_state(),
                self.advisors.process.save_state(),
            ],
        }
    }

    /// Load a saved record into this engine. The save must match the
    /// catalog the engine was built against; a mismatch means the host
    /// loaded a save against different game data.
    pub fn restore(&mut self, catalog: &Catalog, saved: &SavedCityAi) -> Result<(), EngineError> {
        if saved.flavors.len() != catalog.flavor_count() {
            return Err(EngineError::SaveSizeMismatch {
                field: "flavors",
                expected: catalog.flavor_count(),
                found: saved.flavors.len(),
            });
        }
        if saved.active.len() != catalog.strategy_count() {
            return Err(EngineError::SaveSizeMismatch {
                field: "active",
                expected: catalog.strategy_count(),
                found: saved.active.len(),
            });
        }
        if saved.turn_adopted.len() != catalog.strategy_count() {
            return Err(EngineError::SaveSizeMismatch {
                field: "turn_adopted",
                expected: catalog.strategy_count(),
                found: saved.turn_adopted.len(),
            });
        }
        for specialization in [saved.specialization, saved.default_specialization]
            .into_iter()
            .flatten()
        {
            if catalog.specialization(specialization).is_none() {
                return Err(EngineError::UnknownSpecialization(specialization));
            }
        }

        self.flavors.restore(&saved.flavors);
        self.active.clone_from(&saved.active);
        self.turn_adopted.clone_from(&saved.turn_adopted);
        self.specialization = saved.specialization;
        self.default_specialization = saved.default_specialization;

        self.advisors.unit.load_state(&saved.advisors[0]);
        self.advisors.building.load_state(&saved.advisors[1]);
        self.advisors.project.load_state(&saved.advisors[2]);
        self.advisors.process.load_state(&saved.advisors[3]);
        self.advisors.on_flavors_changed(&self.flavors);

        Ok(())
    }
}
