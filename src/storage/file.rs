use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::StorageError;
use crate::constants::CURRENT_SNAPSHOT_VERSION;
use crate::models::{Line, LineId, Station, StationId};

/// Everything the service keeps: all stations and all lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub stations: IndexMap<StationId, Station>,
    pub lines: IndexMap<LineId, Line>,
}

/// Serialize a snapshot to bytes with version header
///
/// # Errors
/// Returns an error if `MessagePack` serialization fails
pub fn serialize_snapshot_to_bytes(snapshot: &Snapshot) -> Result<Vec<u8>, StorageError> {
    let snapshot_bytes = rmp_serde::to_vec(snapshot)?;

    // Versioned format: [4 bytes u32 version][`MessagePack` data]
    let mut bytes = Vec::with_capacity(4 + snapshot_bytes.len());
    bytes.extend_from_slice(&CURRENT_SNAPSHOT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&snapshot_bytes);

    Ok(bytes)
}

/// Deserialize a snapshot from bytes with version header validation
///
/// Every restored line is checked to still form a single path.
///
/// # Errors
/// Returns an error if the data is truncated, the version is unsupported,
/// deserialization fails or a line is malformed
pub fn deserialize_snapshot_from_bytes(bytes: &[u8]) -> Result<Snapshot, StorageError> {
    let Some((version_bytes, snapshot_bytes)) = bytes.split_first_chunk::<4>() else {
        return Err(StorageError::InvalidSnapshot("too small".to_string()));
    };

    let version = u32::from_le_bytes(*version_bytes);
    if version != CURRENT_SNAPSHOT_VERSION {
        return Err(StorageError::UnsupportedVersion(version));
    }

    let snapshot: Snapshot = rmp_serde::from_slice(snapshot_bytes)?;

    for (id, line) in &snapshot.lines {
        if *id != line.id {
            return Err(StorageError::InvalidSnapshot(format!(
                "line {} stored under key {id}",
                line.id
            )));
        }
        line.validate()
            .map_err(|source| StorageError::InvalidLine { id: *id, source })?;
    }

    Ok(snapshot)
}

/// Read a snapshot file, `None` if the file does not exist yet
///
/// # Errors
/// Returns an error if the file cannot be read or decoded
pub fn read_snapshot(path: &Path) -> Result<Option<Snapshot>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => deserialize_snapshot_from_bytes(&bytes).map(Some),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write a snapshot file, replacing any previous one
///
/// The data goes to a sibling temporary file first and is then renamed over
/// the target, so a crash never leaves a half-written snapshot behind.
///
/// # Errors
/// Returns an error if encoding or any file operation fails
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), StorageError> {
    let bytes = serialize_snapshot_to_bytes(snapshot)?;
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, bytes).map_err(|source| StorageError::Io {
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}
