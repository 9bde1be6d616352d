use thiserror::Error;

/// Errors surfaced at engine construction or save restore. Per-turn decision
/// paths never fail; bad candidates are rejected and logged instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("strategy {strategy:?} names unknown trigger {trigger:?}")]
    UnknownTrigger { strategy: String, trigger: String },

    #[error("saved {field} has {found} entries, catalog expects {expected}")]
    SaveSizeMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("saved specialization id {0} not present in catalog")]
    UnknownSpecialization(usize),
}
