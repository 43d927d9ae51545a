use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::path::{Path, PathBuf};

use super::{read_snapshot, write_snapshot, LineRepository, Snapshot, StationRepository, StorageError};
use crate::debug_log;
use crate::models::{Line, LineId, PathError, Station, StationId};

/// In-memory store for stations and lines, optionally backed by a snapshot file.
///
/// All state sits behind one lock. Writes are applied to a working copy which
/// replaces the live state only once the change (and, with a backing file,
/// the file write) has succeeded. Writers are serialized through the
/// upgradable read lock, so readers keep seeing the previous state while a
/// write is prepared and are only held off for the final swap.
///
/// The file write is blocking I/O on the calling thread.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<Snapshot>,
    path: Option<PathBuf>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading the snapshot if the file exists
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or decoded
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let snapshot = read_snapshot(&path)?.unwrap_or_default();
        log::info!(
            "Loaded {} stations and {} lines from {}",
            snapshot.stations.len(),
            snapshot.lines.len(),
            path.display()
        );

        Ok(Self {
            state: RwLock::new(snapshot),
            path: Some(path),
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn commit<T>(&self, change: impl FnOnce(&mut Snapshot) -> Result<T, StorageError>) -> Result<T, StorageError> {
        let state = self.state.upgradable_read();
        let mut working = state.clone();
        let result = change(&mut working)?;

        if let Some(path) = &self.path {
            write_snapshot(path, &working)?;
            debug_log!("Wrote snapshot to {}", path.display());
        }

        *RwLockUpgradableReadGuard::upgrade(state) = working;
        Ok(result)
    }
}

fn ensure_unique_station_name(snapshot: &Snapshot, station: &Station) -> Result<(), StorageError> {
    let taken = snapshot
        .stations
        .values()
        .any(|other| other.id != station.id && other.name == station.name);
    if taken {
        return Err(StorageError::DuplicateName(station.name.clone()));
    }
    Ok(())
}

fn ensure_unique_line_name(snapshot: &Snapshot, line: &Line) -> Result<(), StorageError> {
    let taken = snapshot
        .lines
        .values()
        .any(|other| other.id != line.id && other.name == line.name);
    if taken {
        return Err(StorageError::DuplicateName(line.name.clone()));
    }
    Ok(())
}

fn ensure_stations_exist(snapshot: &Snapshot, line: &Line) -> Result<(), StorageError> {
    let missing = line
        .sections()
        .iter()
        .flat_map(|section| [&section.up_station, &section.down_station])
        .find(|station| !snapshot.stations.contains_key(&station.id));
    match missing {
        Some(station) => Err(StorageError::UnknownStation(station.id)),
        None => Ok(()),
    }
}

impl StationRepository for MemoryStorage {
    async fn save_station(&self, station: &Station) -> Result<(), StorageError> {
        self.commit(|snapshot| {
            ensure_unique_station_name(snapshot, station)?;
            snapshot.stations.insert(station.id, station.clone());
            Ok(())
        })
    }

    async fn load_station(&self, id: StationId) -> Result<Option<Station>, StorageError> {
        Ok(self.state.read().stations.get(&id).cloned())
    }

    async fn list_stations(&self) -> Result<Vec<Station>, StorageError> {
        Ok(self.state.read().stations.values().cloned().collect())
    }

    async fn delete_station(&self, id: StationId) -> Result<bool, StorageError> {
        self.commit(|snapshot| {
            let Some(station) = snapshot.stations.get(&id) else {
                return Ok(false);
            };
            if snapshot.lines.values().any(|line| line.contains_station(station)) {
                return Err(StorageError::StationInUse(id));
            }
            snapshot.stations.shift_remove(&id);
            Ok(true)
        })
    }
}

impl LineRepository for MemoryStorage {
    async fn save_line(&self, line: &Line) -> Result<(), StorageError> {
        self.commit(|snapshot| {
            ensure_unique_line_name(snapshot, line)?;
            ensure_stations_exist(snapshot, line)?;
            snapshot.lines.insert(line.id, line.clone());
            Ok(())
        })
    }

    async fn load_line(&self, id: LineId) -> Result<Option<Line>, StorageError> {
        Ok(self.state.read().lines.get(&id).cloned())
    }

    async fn list_lines(&self) -> Result<Vec<Line>, StorageError> {
        Ok(self.state.read().lines.values().cloned().collect())
    }

    async fn delete_line(&self, id: LineId) -> Result<bool, StorageError> {
        self.commit(|snapshot| Ok(snapshot.lines.shift_remove(&id).is_some()))
    }

    async fn update_line<T, F>(&self, id: LineId, edit: F) -> Result<Option<T>, StorageError>
    where
        F: FnOnce(&mut Line) -> Result<T, PathError>,
    {
        self.commit(|snapshot| {
            let Some(mut line) = snapshot.lines.get(&id).cloned() else {
                return Ok(None);
            };
            let result = edit(&mut line)?;
            ensure_unique_line_name(snapshot, &line)?;
            ensure_stations_exist(snapshot, &line)?;
            snapshot.lines.insert(id, line);
            Ok(Some(result))
        })
    }
}
