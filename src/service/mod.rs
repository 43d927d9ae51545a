mod line_service;
mod station_service;

pub use line_service::LineService;
pub use station_service::StationService;

use thiserror::Error;

use crate::constants::MAX_NAME_LENGTH;
use crate::models::{LineId, PathError, StationId};
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("line {0} does not exist")]
    LineNotFound(LineId),
    #[error("station {0} does not exist")]
    StationNotFound(StationId),
    #[error("invalid {field}: {reason}")]
    InvalidName { field: &'static str, reason: String },
    #[error("path update is missing {0}")]
    IncompletePath(String),
    #[error("name {0:?} is already taken")]
    DuplicateName(String),
    #[error("station {0} is still used by a line")]
    StationInUse(StationId),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Storage(StorageError),
}

/// How a failure should be reported to a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LineNotFound(_) | Self::StationNotFound(_) => ErrorKind::NotFound,
            Self::InvalidName { .. }
            | Self::IncompletePath(_)
            | Self::Path(PathError::InvalidTopology(_) | PathError::InvalidDistance(_)) => ErrorKind::Validation,
            Self::DuplicateName(_) | Self::StationInUse(_) => ErrorKind::Conflict,
            Self::Path(PathError::InvariantViolation(_)) | Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Machine-readable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::LineNotFound(_) => "LINE_NOT_FOUND",
            Self::StationNotFound(_) => "STATION_NOT_FOUND",
            Self::InvalidName { .. } => "INVALID_NAME",
            Self::IncompletePath(_) => "INCOMPLETE_PATH",
            Self::DuplicateName(_) => "DUPLICATE_NAME",
            Self::StationInUse(_) => "STATION_IN_USE",
            Self::Path(PathError::InvalidTopology(_)) => "INVALID_SECTION",
            Self::Path(PathError::InvalidDistance(_)) => "INVALID_DISTANCE",
            Self::Path(PathError::InvariantViolation(_)) | Self::Storage(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::DuplicateName(name) => Self::DuplicateName(name),
            StorageError::StationInUse(id) => Self::StationInUse(id),
            StorageError::UnknownStation(id) => Self::StationNotFound(id),
            StorageError::Rejected(path_error) => Self::Path(path_error),
            other => Self::Storage(other),
        }
    }
}

/// Trim a user-supplied name and check it is usable
fn validated_name(field: &'static str, raw: &str) -> Result<String, ServiceError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidName {
            field,
            reason: "must not be blank".to_string(),
        });
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ServiceError::InvalidName {
            field,
            reason: format!("must be at most {MAX_NAME_LENGTH} characters"),
        });
    }
    Ok(name.to_string())
}
