use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DistanceViolation, LineId, PathError, Section, Sections, Station, TopologyViolation};
use crate::debug_log;

/// A subway line: a named, colored path of stations.
///
/// The sections always form one simple directed path from a single first
/// station to a single last station. Every mutation either keeps that true or
/// fails without touching the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub color: String,
    sections: Sections,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

fn check_endpoints(up_station: &Station, down_station: &Station, distance: u32) -> Result<(), PathError> {
    if distance == 0 {
        return Err(DistanceViolation::NotPositive.into());
    }
    if up_station == down_station {
        return Err(TopologyViolation::SelfLoop(up_station.id).into());
    }
    Ok(())
}

/// Distance left over when `requested` is carved out of a section of length `existing`
fn remainder(existing: u32, requested: u32) -> Result<u32, PathError> {
    match existing.checked_sub(requested) {
        Some(left) if left > 0 => Ok(left),
        _ => Err(DistanceViolation::RemainderNotPositive { existing, requested }.into()),
    }
}

impl Line {
    /// Create a line with its initial section
    ///
    /// # Errors
    /// Returns an error if the distance is zero or both endpoints are the same station
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        up_station: Station,
        down_station: Station,
        distance: u32,
    ) -> Result<Self, PathError> {
        check_endpoints(&up_station, &down_station, distance)?;

        let id = LineId::generate();
        let now = Utc::now();
        let mut sections = Sections::new();
        sections.insert(Section::new(id, up_station, down_station, distance))?;

        Ok(Self {
            id,
            name: name.into(),
            color: color.into(),
            sections,
            created_at: now,
            modified_at: now,
        })
    }

    #[must_use]
    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Insert a section between two stations, one of which must already be on the line.
    ///
    /// When the known station already has a section leaving it (or arriving at
    /// it, for a known down-station) that section is split and keeps the
    /// remaining distance. Otherwise the path is extended at the matching end.
    ///
    /// # Errors
    /// - `InvalidTopology` if both or neither endpoints are already on the line
    /// - `InvalidDistance` if the distance is zero or not shorter than the section it splits
    pub fn add_section(&mut self, up_station: Station, down_station: Station, distance: u32) -> Result<(), PathError> {
        check_endpoints(&up_station, &down_station, distance)?;

        let up_on_line = self.sections.contains_station(&up_station.id);
        let down_on_line = self.sections.contains_station(&down_station.id);

        match (up_on_line, down_on_line) {
            (true, true) => {
                return Err(TopologyViolation::AlreadyConnected {
                    up: up_station.id,
                    down: down_station.id,
                }
                .into())
            }
            (false, false) => {
                return Err(TopologyViolation::Disconnected {
                    up: up_station.id,
                    down: down_station.id,
                }
                .into())
            }
            (true, false) => self.insert_after(up_station, down_station, distance)?,
            (false, true) => self.insert_before(up_station, down_station, distance)?,
        }

        self.touch();
        Ok(())
    }

    /// New down-station hangs off a known up-station: split its outgoing section or append
    fn insert_after(&mut self, up_station: Station, down_station: Station, distance: u32) -> Result<(), PathError> {
        if let Some(existing) = self.sections.by_up_station(&up_station.id) {
            let left = remainder(existing.distance, distance)?;
            let far_end = existing.down_station.clone();
            debug_log!(
                "Line {}: splitting {} -> {} at {}",
                self.name, up_station.name, far_end.name, down_station.name
            );

            self.sections.remove_by_up_station(&up_station.id);
            self.sections
                .insert(Section::new(self.id, down_station.clone(), far_end, left))?;
        }

        self.sections
            .insert(Section::new(self.id, up_station, down_station, distance))
    }

    /// New up-station leads into a known down-station: split its incoming section or prepend
    fn insert_before(&mut self, up_station: Station, down_station: Station, distance: u32) -> Result<(), PathError> {
        if let Some(existing) = self.sections.by_down_station(&down_station.id) {
            let left = remainder(existing.distance, distance)?;
            let near_end = existing.up_station.clone();
            debug_log!(
                "Line {}: splitting {} -> {} at {}",
                self.name, near_end.name, down_station.name, up_station.name
            );

            self.sections.remove_by_up_station(&near_end.id);
            self.sections
                .insert(Section::new(self.id, near_end, up_station.clone(), left))?;
        }

        self.sections
            .insert(Section::new(self.id, up_station, down_station, distance))
    }

    /// Take a station off the line.
    ///
    /// An inner station's two sections are joined into one spanning both
    /// distances; an end station just loses its only section.
    ///
    /// # Errors
    /// - `InvalidTopology` if the station is not on the line or the line has a single section
    /// - `InvalidDistance` if the joined distance does not fit
    pub fn remove_section(&mut self, station: &Station) -> Result<(), PathError> {
        let incoming = self.sections.by_down_station(&station.id).cloned();
        let outgoing = self.sections.by_up_station(&station.id).cloned();

        match (incoming, outgoing) {
            (None, None) => return Err(TopologyViolation::StationNotOnLine(station.id).into()),
            _ if self.sections.len() <= 1 => return Err(TopologyViolation::LastSection.into()),
            (Some(incoming), Some(outgoing)) => {
                let distance = incoming.distance.checked_add(outgoing.distance).ok_or(
                    DistanceViolation::Overflow {
                        first: incoming.distance,
                        second: outgoing.distance,
                    },
                )?;
                self.sections.remove_by_up_station(&incoming.up_station.id);
                self.sections.remove_by_up_station(&outgoing.up_station.id);
                self.sections.insert(Section::new(
                    self.id,
                    incoming.up_station,
                    outgoing.down_station,
                    distance,
                ))?;
            }
            (Some(section), None) | (None, Some(section)) => {
                self.sections.remove_by_up_station(&section.up_station.id);
            }
        }

        debug_log!("Line {}: removed station {}", self.name, station.name);
        self.touch();
        Ok(())
    }

    /// The station that starts the line
    ///
    /// # Errors
    /// Returns `InvariantViolation` if no station qualifies
    pub fn find_first_station(&self) -> Result<&Station, PathError> {
        self.sections.first_station().ok_or_else(|| {
            PathError::InvariantViolation(format!("line {} has no first station", self.id))
        })
    }

    /// The station that ends the line
    ///
    /// # Errors
    /// Returns `InvariantViolation` if no station qualifies
    pub fn find_last_station(&self) -> Result<&Station, PathError> {
        self.sections.last_station().ok_or_else(|| {
            PathError::InvariantViolation(format!("line {} has no last station", self.id))
        })
    }

    /// The section leaving the given station, or `None` at the end of the line
    #[must_use]
    pub fn section_by_up_station(&self, station: &Station) -> Option<&Section> {
        self.sections.by_up_station(&station.id)
    }

    /// Sections in path order, first station to last
    ///
    /// # Errors
    /// Returns `InvariantViolation` if the sections do not form a single path
    pub fn ordered_sections(&self) -> Result<Vec<&Section>, PathError> {
        if self.sections.is_empty() {
            return Ok(Vec::new());
        }

        let mut ordered = Vec::with_capacity(self.sections.len());
        let mut current = self.find_first_station()?;

        while let Some(section) = self.section_by_up_station(current) {
            if ordered.len() == self.sections.len() {
                return Err(PathError::InvariantViolation(format!(
                    "line {} loops back on itself",
                    self.id
                )));
            }
            ordered.push(section);
            current = &section.down_station;
        }

        if ordered.len() != self.sections.len() {
            return Err(PathError::InvariantViolation(format!(
                "line {} has {} sections but only {} are reachable from its first station",
                self.id,
                self.sections.len(),
                ordered.len()
            )));
        }

        Ok(ordered)
    }

    /// Stations in path order; empty when the line has no sections
    ///
    /// # Errors
    /// Returns `InvariantViolation` if the sections do not form a single path
    pub fn ordered_stations(&self) -> Result<Vec<Station>, PathError> {
        let sections = self.ordered_sections()?;
        let Some(first) = sections.first() else {
            return Ok(Vec::new());
        };

        let mut stations = Vec::with_capacity(sections.len() + 1);
        stations.push(first.up_station.clone());
        stations.extend(sections.iter().map(|section| section.down_station.clone()));
        Ok(stations)
    }

    #[must_use]
    pub fn contains_station(&self, station: &Station) -> bool {
        self.sections.contains_station(&station.id)
    }

    /// Rename and recolor. The path is left as is.
    pub fn update(&mut self, name: impl Into<String>, color: impl Into<String>) {
        self.name = name.into();
        self.color = color.into();
        self.touch();
    }

    /// Replace the whole path with a single section
    ///
    /// # Errors
    /// Returns an error if the distance is zero or both endpoints are the same station
    pub fn reset_path(&mut self, up_station: Station, down_station: Station, distance: u32) -> Result<(), PathError> {
        check_endpoints(&up_station, &down_station, distance)?;

        self.sections.clear();
        self.sections
            .insert(Section::new(self.id, up_station, down_station, distance))?;
        self.touch();
        Ok(())
    }

    /// Check that a line restored from storage still forms a single path
    ///
    /// # Errors
    /// Returns `InvariantViolation` describing the first problem found
    pub fn validate(&self) -> Result<(), PathError> {
        if self.sections.is_empty() {
            return Err(PathError::InvariantViolation(format!("line {} has no sections", self.id)));
        }
        for section in self.sections.iter() {
            if section.distance == 0 {
                return Err(PathError::InvariantViolation(format!(
                    "line {} has a section of zero length",
                    self.id
                )));
            }
            if section.line_id != self.id {
                return Err(PathError::InvariantViolation(format!(
                    "line {} holds a section of line {}",
                    self.id, section.line_id
                )));
            }
        }
        self.ordered_sections().map(|_| ())
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}
