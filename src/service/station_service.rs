use std::sync::Arc;

use super::{validated_name, ServiceError};
use crate::api::{StationRequest, StationResponse};
use crate::models::{Station, StationId};
use crate::storage::{StationRepository, StorageError};

/// Station registry: creates, resolves and deletes stations
#[derive(Debug)]
pub struct StationService<S> {
    storage: Arc<S>,
}

impl<S> Clone for StationService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: StationRepository> StationService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// # Errors
    /// `InvalidName` for a blank name, `DuplicateName` if the name is taken
    pub async fn save_station(&self, request: StationRequest) -> Result<StationResponse, ServiceError> {
        let station = Station::new(validated_name("name", &request.name)?);
        self.storage.save_station(&station).await?;
        log::info!("Created station {} ({})", station.name, station.id);
        Ok(StationResponse::from(&station))
    }

    /// # Errors
    /// Returns an error if the storage fails
    pub async fn find_all_stations(&self) -> Result<Vec<StationResponse>, ServiceError> {
        let stations = self.storage.list_stations().await?;
        Ok(stations.iter().map(StationResponse::from).collect())
    }

    /// # Errors
    /// `StationNotFound` if no station has this ID
    pub async fn find_station(&self, id: StationId) -> Result<StationResponse, ServiceError> {
        self.find_by_id(id).await.map(|station| StationResponse::from(&station))
    }

    /// Resolve a station ID to the station itself
    ///
    /// # Errors
    /// `StationNotFound` if no station has this ID
    pub async fn find_by_id(&self, id: StationId) -> Result<Station, ServiceError> {
        self.storage
            .load_station(id)
            .await?
            .ok_or(ServiceError::StationNotFound(id))
    }

    /// # Errors
    /// `StationNotFound` if no station has this ID, `StationInUse` while a line passes through it
    pub async fn delete_station(&self, id: StationId) -> Result<(), ServiceError> {
        if !self.storage.delete_station(id).await? {
            return Err(ServiceError::StationNotFound(id));
        }
        log::info!("Deleted station {id}");
        Ok(())
    }

    /// Create every named station that does not exist yet, returning how many were added
    ///
    /// # Errors
    /// Returns an error if a name is invalid or the storage fails
    pub async fn seed(&self, names: &[String]) -> Result<usize, ServiceError> {
        let existing: Vec<String> = self
            .storage
            .list_stations()
            .await?
            .into_iter()
            .map(|station| station.name)
            .collect();

        let mut added = 0;
        for name in names {
            let name = validated_name("name", name)?;
            if existing.contains(&name) {
                continue;
            }
            match self.storage.save_station(&Station::new(name)).await {
                Ok(()) => added += 1,
                Err(StorageError::DuplicateName(_)) => {}
                Err(error) => return Err(error.into()),
            }
        }

        if added > 0 {
            log::info!("Seeded {added} stations");
        }
        Ok(added)
    }
}
