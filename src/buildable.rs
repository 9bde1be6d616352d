use serde::{Deserialize, Serialize};

/// What kind of item a candidate refers to. Operation and army units carry
/// the same catalog index space as plain units but are weighted differently
/// and tracked for the ops-skipped counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildKind {
    Unit,
    UnitForArmy,
    UnitForOperation,
    Building,
    Project,
    Process,
}

impl BuildKind {
    pub fn is_unit(self) -> bool {
        matches!(
            self,
            BuildKind::Unit | BuildKind::UnitForArmy | BuildKind::UnitForOperation
        )
    }
}

/// A candidate item a city could produce or purchase. Created transiently
/// each time a candidate list is built; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildable {
    pub kind: BuildKind,
    pub index: usize,
    pub turns_to_build: i32,
    /// Weight at the time the candidate was (re)scored.
    pub value: i32,
}

impl Buildable {
    pub fn new(kind: BuildKind, index: usize, turns_to_build: i32, value: i32) -> Self {
        Buildable {
            kind,
            index,
            turns_to_build,
            value,
        }
    }

    /// True when this candidate refers to the item the city is currently
    /// producing.
    pub fn matches_current(&self, current: Option<(BuildKind, usize)>) -> bool {
        match current {
            Some((kind, index)) => {
                index == self.index
                    && (kind == self.kind || (kind.is_unit() && self.kind.is_unit()))
            }
            None => false,
        }
    }
}
