pub mod advisors;
pub mod buildable;
pub mod catalog;
pub mod error;
pub mod flavor;
pub mod hurry;
pub mod log;
pub mod production;
pub mod query;
pub mod save;
pub mod strategy;
pub mod testutil;
pub mod tunables;
pub mod weighted;
pub mod yields;

pub use advisors::{AdvisorSet, RejectReason, Sanity, SanityCtx};
pub use buildable::{BuildKind, Buildable};
pub use catalog::{Catalog, SpecializationDef, StrategyDef};
pub use error::EngineError;
pub use hurry::HurryRequest;
pub use production::{ProductionDecision, ProductionOptions};
pub use query::{CityView, PlayerView, PurchaseCurrency};
pub use save::SavedCityAi;
pub use strategy::{CityStrategyAi, TriggerRegistry, TurnCtx};
pub use tunables::Tunables;
pub use weighted::{Seed, WeightedList};
pub use yields::{Yield, YieldStats};
