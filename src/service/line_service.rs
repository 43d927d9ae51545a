use std::sync::Arc;

use super::{validated_name, ServiceError, StationService};
use crate::api::{LineRequest, LineResponse, LineUpdateRequest, SectionRequest};
use crate::models::{Line, LineId, StationId};
use crate::storage::{LineRepository, StationRepository};

/// Use cases around lines: station resolution, path mutation and projection
#[derive(Debug)]
pub struct LineService<S> {
    storage: Arc<S>,
    stations: StationService<S>,
}

impl<S> Clone for LineService<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            stations: self.stations.clone(),
        }
    }
}

impl<S: StationRepository + LineRepository> LineService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            stations: StationService::new(Arc::clone(&storage)),
            storage,
        }
    }

    /// Create a line with its first section
    ///
    /// # Errors
    /// `StationNotFound` for an unknown endpoint, `InvalidName`/`DuplicateName`
    /// for a bad name, and path errors for an invalid initial section
    pub async fn save_line(&self, request: LineRequest) -> Result<LineResponse, ServiceError> {
        let name = validated_name("name", &request.name)?;
        let color = validated_name("color", &request.color)?;
        let up_station = self.stations.find_by_id(request.up_station_id).await?;
        let down_station = self.stations.find_by_id(request.down_station_id).await?;

        let line = Line::new(name, color, up_station, down_station, request.distance)?;
        self.storage.save_line(&line).await?;
        log::info!("Created line {} ({})", line.name, line.id);

        Ok(LineResponse::of(&line)?)
    }

    /// # Errors
    /// Returns an error if the storage fails or a stored line is malformed
    pub async fn find_all_lines(&self) -> Result<Vec<LineResponse>, ServiceError> {
        let lines = self.storage.list_lines().await?;
        lines
            .iter()
            .map(|line| LineResponse::of(line).map_err(ServiceError::from))
            .collect()
    }

    /// # Errors
    /// `LineNotFound` if no line has this ID
    pub async fn find_line(&self, id: LineId) -> Result<LineResponse, ServiceError> {
        let line = self.find_line_by_id(id).await?;
        Ok(LineResponse::of(&line)?)
    }

    /// Rename and recolor a line, and reset its path when the request carries one
    ///
    /// # Errors
    /// `LineNotFound`, `StationNotFound`, name errors, `IncompletePath` when only
    /// some path fields are given, and path errors for an invalid new path
    pub async fn update_line(&self, id: LineId, request: LineUpdateRequest) -> Result<LineResponse, ServiceError> {
        let name = validated_name("name", &request.name)?;
        let color = validated_name("color", &request.color)?;
        let requested_path = request
            .path()
            .map_err(|missing| ServiceError::IncompletePath(missing.join(", ")))?;
        let new_path = match requested_path {
            Some((up_station_id, down_station_id, distance)) => Some((
                self.stations.find_by_id(up_station_id).await?,
                self.stations.find_by_id(down_station_id).await?,
                distance,
            )),
            None => None,
        };
        let resets_path = new_path.is_some();

        let line = self
            .storage
            .update_line(id, move |line| {
                if let Some((up_station, down_station, distance)) = new_path {
                    line.reset_path(up_station, down_station, distance)?;
                }
                line.update(name, color);
                Ok(line.clone())
            })
            .await?
            .ok_or(ServiceError::LineNotFound(id))?;

        if resets_path {
            log::info!("Updated line {} ({}) and reset its path", line.name, line.id);
        } else {
            log::info!("Updated line {} ({})", line.name, line.id);
        }
        Ok(LineResponse::of(&line)?)
    }

    /// Delete a line and all of its sections, returning its ID
    ///
    /// # Errors
    /// `LineNotFound` if no line has this ID
    pub async fn delete_line(&self, id: LineId) -> Result<LineId, ServiceError> {
        if !self.storage.delete_line(id).await? {
            return Err(ServiceError::LineNotFound(id));
        }
        log::info!("Deleted line {id}");
        Ok(id)
    }

    /// Insert a section into a line's path
    ///
    /// # Errors
    /// `LineNotFound`, `StationNotFound`, or the path error that refused the section
    pub async fn add_section(&self, id: LineId, request: SectionRequest) -> Result<LineResponse, ServiceError> {
        self.find_line_by_id(id).await?;
        let up_station = self.stations.find_by_id(request.up_station_id).await?;
        let down_station = self.stations.find_by_id(request.down_station_id).await?;

        let line = self
            .storage
            .update_line(id, move |line| {
                line.add_section(up_station, down_station, request.distance)?;
                Ok(line.clone())
            })
            .await?
            .ok_or(ServiceError::LineNotFound(id))?;

        log::info!("Added section to line {} ({})", line.name, line.id);
        Ok(LineResponse::of(&line)?)
    }

    /// Take a station off a line's path
    ///
    /// # Errors
    /// `LineNotFound`, `StationNotFound`, or the path error that refused the removal
    pub async fn remove_section(&self, id: LineId, station_id: StationId) -> Result<LineResponse, ServiceError> {
        self.find_line_by_id(id).await?;
        let station = self.stations.find_by_id(station_id).await?;

        let line = self
            .storage
            .update_line(id, move |line| {
                line.remove_section(&station)?;
                Ok(line.clone())
            })
            .await?
            .ok_or(ServiceError::LineNotFound(id))?;

        log::info!("Removed station {station_id} from line {} ({})", line.name, line.id);
        Ok(LineResponse::of(&line)?)
    }

    async fn find_line_by_id(&self, id: LineId) -> Result<Line, ServiceError> {
        self.storage
            .load_line(id)
            .await?
            .ok_or(ServiceError::LineNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{StationRequest, StationResponse};
    use crate::models::{DistanceViolation, PathError, Station, TopologyViolation};
    use crate::storage::{MemoryStorage, StorageError};
    use futures::executor::block_on;
    use parking_lot::Mutex;

    struct Fixture {
        stations: StationService<MemoryStorage>,
        lines: LineService<MemoryStorage>,
    }

    impl Fixture {
        fn new() -> Self {
            let storage = Arc::new(MemoryStorage::new());
            Self {
                stations: StationService::new(Arc::clone(&storage)),
                lines: LineService::new(storage),
            }
        }

        fn station(&self, name: &str) -> StationResponse {
            block_on(self.stations.save_station(StationRequest { name: name.to_string() })).expect("created")
        }

        fn line(&self, name: &str, up: &StationResponse, down: &StationResponse, distance: u32) -> LineResponse {
            block_on(self.lines.save_line(LineRequest {
                name: name.to_string(),
                color: "bg-red-600".to_string(),
                up_station_id: up.id,
                down_station_id: down.id,
                distance,
            }))
            .expect("created")
        }

        fn add(&self, line: &LineResponse, up: &StationResponse, down: &StationResponse, distance: u32) -> Result<LineResponse, ServiceError> {
            block_on(self.lines.add_section(
                line.id,
                SectionRequest {
                    up_station_id: up.id,
                    down_station_id: down.id,
                    distance,
                },
            ))
        }
    }

    fn names(response: &LineResponse) -> Vec<&str> {
        response.stations.iter().map(|station| station.name.as_str()).collect()
    }

    #[test]
    fn test_save_line_projects_stations() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");

        let line = fixture.line("Line 1", &a, &b, 10);

        assert_eq!(names(&line), vec!["A", "B"]);
        assert_eq!(block_on(fixture.lines.find_line(line.id)).expect("found"), line);
    }

    #[test]
    fn test_save_line_with_unknown_station() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let missing = StationId::generate();

        let result = block_on(fixture.lines.save_line(LineRequest {
            name: "Line 1".to_string(),
            color: "red".to_string(),
            up_station_id: a.id,
            down_station_id: missing,
            distance: 10,
        }));

        assert!(matches!(result, Err(ServiceError::StationNotFound(id)) if id == missing));
        assert!(block_on(fixture.lines.find_all_lines()).expect("listed").is_empty());
    }

    #[test]
    fn test_duplicate_line_name() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        fixture.line("Line 1", &a, &b, 10);

        let result = block_on(fixture.lines.save_line(LineRequest {
            name: "Line 1".to_string(),
            color: "blue".to_string(),
            up_station_id: b.id,
            down_station_id: a.id,
            distance: 3,
        }));

        assert!(matches!(result, Err(ServiceError::DuplicateName(_))));
    }

    #[test]
    fn test_add_section_splits_and_extends() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let c = fixture.station("C");
        let d = fixture.station("D");
        let line = fixture.line("Line 1", &a, &b, 10);

        let line = fixture.add(&line, &a, &c, 4).expect("split");
        assert_eq!(names(&line), vec!["A", "C", "B"]);
        assert_eq!(line.sections[1].distance, 6);

        let line = fixture.add(&line, &b, &d, 5).expect("extend");
        assert_eq!(names(&line), vec!["A", "C", "B", "D"]);

        let stored = block_on(fixture.lines.find_line(line.id)).expect("found");
        assert_eq!(names(&stored), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_add_section_rejections_leave_line_untouched() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let c = fixture.station("C");
        let d = fixture.station("D");
        let line = fixture.line("Line 1", &a, &b, 5);

        assert!(matches!(
            fixture.add(&line, &a, &b, 3),
            Err(ServiceError::Path(PathError::InvalidTopology(TopologyViolation::AlreadyConnected { .. })))
        ));
        assert!(matches!(
            fixture.add(&line, &c, &d, 3),
            Err(ServiceError::Path(PathError::InvalidTopology(TopologyViolation::Disconnected { .. })))
        ));
        assert!(matches!(
            fixture.add(&line, &a, &c, 5),
            Err(ServiceError::Path(PathError::InvalidDistance(DistanceViolation::RemainderNotPositive { .. })))
        ));

        assert_eq!(block_on(fixture.lines.find_line(line.id)).expect("found"), line);
    }

    #[test]
    fn test_add_section_to_missing_line() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let line = fixture.line("Line 1", &a, &b, 5);
        block_on(fixture.lines.delete_line(line.id)).expect("deleted");

        assert!(matches!(
            fixture.add(&line, &a, &b, 3),
            Err(ServiceError::LineNotFound(id)) if id == line.id
        ));
    }

    #[test]
    fn test_remove_section() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let c = fixture.station("C");
        let line = fixture.line("Line 1", &a, &b, 10);
        fixture.add(&line, &b, &c, 5).expect("extend");

        let line = block_on(fixture.lines.remove_section(line.id, b.id)).expect("removed");
        assert_eq!(names(&line), vec!["A", "C"]);
        assert_eq!(line.sections[0].distance, 15);

        assert!(matches!(
            block_on(fixture.lines.remove_section(line.id, a.id)),
            Err(ServiceError::Path(PathError::InvalidTopology(TopologyViolation::LastSection)))
        ));
    }

    #[test]
    fn test_update_metadata_keeps_path() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let c = fixture.station("C");
        let line = fixture.line("Line 1", &a, &b, 10);
        fixture.add(&line, &b, &c, 5).expect("extend");

        let updated = block_on(fixture.lines.update_line(
            line.id,
            LineUpdateRequest {
                name: "Line 9".to_string(),
                color: "bg-gold-600".to_string(),
                up_station_id: None,
                down_station_id: None,
                distance: None,
            },
        ))
        .expect("updated");

        assert_eq!(updated.name, "Line 9");
        assert_eq!(updated.color, "bg-gold-600");
        assert_eq!(names(&updated), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_update_with_path_resets_sections() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let c = fixture.station("C");
        let line = fixture.line("Line 1", &a, &b, 10);
        fixture.add(&line, &b, &c, 5).expect("extend");

        let updated = block_on(fixture.lines.update_line(
            line.id,
            LineUpdateRequest {
                name: "Line 1".to_string(),
                color: "red".to_string(),
                up_station_id: Some(c.id),
                down_station_id: Some(a.id),
                distance: Some(12),
            },
        ))
        .expect("updated");

        assert_eq!(names(&updated), vec!["C", "A"]);
        assert_eq!(updated.sections.len(), 1);
    }

    #[test]
    fn test_update_with_partial_path_is_rejected() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let c = fixture.station("C");
        let line = fixture.line("Line 1", &a, &b, 10);

        let result = block_on(fixture.lines.update_line(
            line.id,
            LineUpdateRequest {
                name: "Line 9".to_string(),
                color: "red".to_string(),
                up_station_id: Some(c.id),
                down_station_id: None,
                distance: Some(4),
            },
        ));

        assert!(matches!(result, Err(ServiceError::IncompletePath(ref missing)) if missing == "downStationId"));
        assert_eq!(block_on(fixture.lines.find_line(line.id)).expect("found"), line);
    }

    #[test]
    fn test_update_missing_line() {
        let fixture = Fixture::new();

        let result = block_on(fixture.lines.update_line(
            LineId::generate(),
            LineUpdateRequest {
                name: "Line 1".to_string(),
                color: "red".to_string(),
                up_station_id: None,
                down_station_id: None,
                distance: None,
            },
        ));

        assert!(matches!(result, Err(ServiceError::LineNotFound(_))));
    }

    #[test]
    fn test_delete_line_releases_stations() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let line = fixture.line("Line 1", &a, &b, 10);

        assert!(matches!(
            block_on(fixture.stations.delete_station(a.id)),
            Err(ServiceError::StationInUse(_))
        ));

        assert_eq!(block_on(fixture.lines.delete_line(line.id)).expect("deleted"), line.id);
        assert!(matches!(
            block_on(fixture.lines.find_line(line.id)),
            Err(ServiceError::LineNotFound(_))
        ));
        assert!(matches!(
            block_on(fixture.lines.delete_line(line.id)),
            Err(ServiceError::LineNotFound(_))
        ));
        block_on(fixture.stations.delete_station(a.id)).expect("deleted");
    }

    #[test]
    fn test_find_all_lines() {
        let fixture = Fixture::new();
        let a = fixture.station("A");
        let b = fixture.station("B");
        let c = fixture.station("C");
        fixture.line("Line 1", &a, &b, 10);
        fixture.line("Line 2", &b, &c, 4);

        let lines = block_on(fixture.lines.find_all_lines()).expect("listed");

        assert_eq!(lines.len(), 2);
        assert_eq!(names(&lines[1]), vec!["B", "C"]);
    }

    /// Storage that deletes a station right before the next line edit runs,
    /// as if a concurrent request had landed between lookup and edit
    struct DeletesBeforeEdit {
        inner: MemoryStorage,
        doomed: Mutex<Option<StationId>>,
    }

    impl StationRepository for DeletesBeforeEdit {
        async fn save_station(&self, station: &Station) -> Result<(), StorageError> {
            self.inner.save_station(station).await
        }

        async fn load_station(&self, id: StationId) -> Result<Option<Station>, StorageError> {
            self.inner.load_station(id).await
        }

        async fn list_stations(&self) -> Result<Vec<Station>, StorageError> {
            self.inner.list_stations().await
        }

        async fn delete_station(&self, id: StationId) -> Result<bool, StorageError> {
            self.inner.delete_station(id).await
        }
    }

    impl LineRepository for DeletesBeforeEdit {
        async fn save_line(&self, line: &Line) -> Result<(), StorageError> {
            self.inner.save_line(line).await
        }

        async fn load_line(&self, id: LineId) -> Result<Option<Line>, StorageError> {
            self.inner.load_line(id).await
        }

        async fn list_lines(&self) -> Result<Vec<Line>, StorageError> {
            self.inner.list_lines().await
        }

        async fn delete_line(&self, id: LineId) -> Result<bool, StorageError> {
            self.inner.delete_line(id).await
        }

        async fn update_line<T, F>(&self, id: LineId, edit: F) -> Result<Option<T>, StorageError>
        where
            F: FnOnce(&mut Line) -> Result<T, PathError>,
        {
            let doomed = self.doomed.lock().take();
            if let Some(station_id) = doomed {
                self.inner.delete_station(station_id).await?;
            }
            self.inner.update_line(id, edit).await
        }
    }

    #[test]
    fn test_station_deleted_during_add_section_is_not_attached() {
        let storage = Arc::new(DeletesBeforeEdit {
            inner: MemoryStorage::new(),
            doomed: Mutex::new(None),
        });
        let stations = StationService::new(Arc::clone(&storage));
        let lines = LineService::new(Arc::clone(&storage));
        let station = |name: &str| {
            block_on(stations.save_station(StationRequest { name: name.to_string() })).expect("created")
        };
        let a = station("A");
        let b = station("B");
        let c = station("C");
        let line = block_on(lines.save_line(LineRequest {
            name: "Line 1".to_string(),
            color: "red".to_string(),
            up_station_id: a.id,
            down_station_id: b.id,
            distance: 10,
        }))
        .expect("created");

        *storage.doomed.lock() = Some(c.id);
        let result = block_on(lines.add_section(
            line.id,
            SectionRequest {
                up_station_id: b.id,
                down_station_id: c.id,
                distance: 5,
            },
        ));

        assert!(matches!(result, Err(ServiceError::StationNotFound(id)) if id == c.id));
        assert!(matches!(
            block_on(stations.find_station(c.id)),
            Err(ServiceError::StationNotFound(_))
        ));
        let stored = block_on(lines.find_line(line.id)).expect("found");
        assert_eq!(names(&stored), vec!["A", "B"]);
    }
}
