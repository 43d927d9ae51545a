#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]

pub mod logging;
pub mod constants;
pub mod models;
pub mod storage;
pub mod import;
pub mod api;
pub mod service;

pub use models::{Line, LineId, PathError, Section, Station, StationId};
pub use service::{LineService, ServiceError, StationService};
pub use storage::{LineRepository, MemoryStorage, StationRepository, StorageError};
