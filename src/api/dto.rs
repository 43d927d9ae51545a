use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Line, LineId, PathError, Section, Station, StationId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub name: String,
    pub color: String,
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: u32,
}

/// Rename/recolor a line. Supplying all three path fields also replaces the
/// line's sections with a single section between the given stations;
/// supplying only some of them is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineUpdateRequest {
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_station_id: Option<StationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_station_id: Option<StationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
}

impl LineUpdateRequest {
    /// The requested new path: `Ok(None)` when no path field is given
    ///
    /// # Errors
    /// Returns the names of the missing fields when only some are given
    pub fn path(&self) -> Result<Option<(StationId, StationId, u32)>, Vec<&'static str>> {
        match (self.up_station_id, self.down_station_id, self.distance) {
            (Some(up), Some(down), Some(distance)) => Ok(Some((up, down, distance))),
            (None, None, None) => Ok(None),
            (up, down, distance) => Err([
                ("upStationId", up.is_none()),
                ("downStationId", down.is_none()),
                ("distance", distance.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequest {
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationResponse {
    pub id: StationId,
    pub name: String,
    pub created_date: DateTime<Utc>,
}

impl From<&Station> for StationResponse {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id,
            name: station.name.clone(),
            created_date: station.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub up_station_id: StationId,
    pub down_station_id: StationId,
    pub distance: u32,
}

impl From<&Section> for SectionResponse {
    fn from(section: &Section) -> Self {
        Self {
            up_station_id: section.up_station.id,
            down_station_id: section.down_station.id,
            distance: section.distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    pub id: LineId,
    pub name: String,
    pub color: String,
    pub stations: Vec<StationResponse>,
    pub sections: Vec<SectionResponse>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

impl LineResponse {
    /// Project a line into its response, stations in path order
    ///
    /// # Errors
    /// Returns `InvariantViolation` if the line's sections do not form a single path
    pub fn of(line: &Line) -> Result<Self, PathError> {
        let stations = line.ordered_stations()?;
        let sections = line.ordered_sections()?;

        Ok(Self {
            id: line.id,
            name: line.name.clone(),
            color: line.color.clone(),
            stations: stations.iter().map(StationResponse::from).collect(),
            sections: sections.into_iter().map(SectionResponse::from).collect(),
            created_date: line.created_at,
            modified_date: line.modified_at,
        })
    }
}

/// Body of every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
