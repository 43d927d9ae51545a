use thiserror::Error;

use super::StationId;

/// Reasons a line path mutation is refused.
///
/// `InvalidTopology` and `InvalidDistance` are caller mistakes and leave the
/// line untouched. `InvariantViolation` means a line's sections no longer form
/// a single path, which only happens through a bug or a corrupted snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid section: {0}")]
    InvalidTopology(#[from] TopologyViolation),
    #[error("invalid distance: {0}")]
    InvalidDistance(#[from] DistanceViolation),
    #[error("line path is malformed: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyViolation {
    #[error("a section cannot start and end at station {0}")]
    SelfLoop(StationId),
    #[error("stations {up} and {down} are both already on the line")]
    AlreadyConnected { up: StationId, down: StationId },
    #[error("neither station {up} nor station {down} is on the line")]
    Disconnected { up: StationId, down: StationId },
    #[error("station {0} is not on the line")]
    StationNotOnLine(StationId),
    #[error("a line must keep at least one section")]
    LastSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceViolation {
    #[error("distance must be greater than zero")]
    NotPositive,
    #[error("distance {requested} must be shorter than the section it splits ({existing})")]
    RemainderNotPositive { existing: u32, requested: u32 },
    #[error("combined distance of {first} and {second} is too large")]
    Overflow { first: u32, second: u32 },
}
