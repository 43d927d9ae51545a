mod file;
mod memory;

pub use file::{deserialize_snapshot_from_bytes, read_snapshot, serialize_snapshot_to_bytes, write_snapshot, Snapshot};
pub use memory::MemoryStorage;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Line, LineId, PathError, Station, StationId};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
    #[error("line {id} in snapshot is malformed: {source}")]
    InvalidLine { id: LineId, source: PathError },
    #[error("name {0:?} is already taken")]
    DuplicateName(String),
    #[error("station {0} is still used by a line")]
    StationInUse(StationId),
    #[error("station {0} does not exist")]
    UnknownStation(StationId),
    #[error(transparent)]
    Rejected(#[from] PathError),
}

/// Station lookup and persistence
#[allow(async_fn_in_trait)]
pub trait StationRepository {
    /// Insert or replace a station. Names are unique across stations.
    async fn save_station(&self, station: &Station) -> Result<(), StorageError>;

    /// Load a station by ID, `None` if it does not exist
    async fn load_station(&self, id: StationId) -> Result<Option<Station>, StorageError>;

    /// List all stations in creation order
    async fn list_stations(&self) -> Result<Vec<Station>, StorageError>;

    /// Delete a station. Returns `false` if it did not exist.
    /// Fails with `StationInUse` while any line passes through it.
    async fn delete_station(&self, id: StationId) -> Result<bool, StorageError>;
}

/// Line persistence
#[allow(async_fn_in_trait)]
pub trait LineRepository {
    /// Insert or replace a line. Names are unique across lines, and every
    /// station on the line must still exist (`UnknownStation` otherwise).
    async fn save_line(&self, line: &Line) -> Result<(), StorageError>;

    /// Load a line by ID, `None` if it does not exist
    async fn load_line(&self, id: LineId) -> Result<Option<Line>, StorageError>;

    /// List all lines in creation order
    async fn list_lines(&self) -> Result<Vec<Line>, StorageError>;

    /// Delete a line with all of its sections. Returns `false` if it did not exist.
    async fn delete_line(&self, id: LineId) -> Result<bool, StorageError>;

    /// Apply `edit` to a stored line as one unit of work.
    ///
    /// Concurrent edits of the same line are serialized with station deletion.
    /// If `edit` fails the stored line is left unchanged and the error comes
    /// back as `Rejected`. An edit that leaves a deleted station on the line
    /// fails with `UnknownStation`. Returns `None` if the line does not exist.
    async fn update_line<T, F>(&self, id: LineId, edit: F) -> Result<Option<T>, StorageError>
    where
        F: FnOnce(&mut Line) -> Result<T, PathError>;
}
