use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{PathError, Section, Station, StationId};

/// The sections of one line, indexed for path walking.
///
/// Sections are keyed by their up-station so stepping forward along the path
/// is a single lookup. A second index maps each down-station back to the
/// up-station of its section. Serialized as a plain list; the indexes are
/// rebuilt on load and duplicate endpoints are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Section>", into = "Vec<Section>")]
pub struct Sections {
    by_up_station: IndexMap<StationId, Section>,
    up_by_down_station: HashMap<StationId, StationId>,
}

impl Sections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_up_station.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_up_station.is_empty()
    }

    /// Iterate sections in storage order (not path order)
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.by_up_station.values()
    }

    /// Section leaving the given station, if any
    #[must_use]
    pub fn by_up_station(&self, station: &StationId) -> Option<&Section> {
        self.by_up_station.get(station)
    }

    /// Section arriving at the given station, if any
    #[must_use]
    pub fn by_down_station(&self, station: &StationId) -> Option<&Section> {
        self.up_by_down_station
            .get(station)
            .and_then(|up| self.by_up_station.get(up))
    }

    #[must_use]
    pub fn contains_station(&self, station: &StationId) -> bool {
        self.by_up_station.contains_key(station) || self.up_by_down_station.contains_key(station)
    }

    /// The station that starts the path: an up-station that no section arrives at
    #[must_use]
    pub fn first_station(&self) -> Option<&Station> {
        self.by_up_station
            .values()
            .map(|section| &section.up_station)
            .find(|station| !self.up_by_down_station.contains_key(&station.id))
    }

    /// The station that ends the path: a down-station that no section leaves from
    #[must_use]
    pub fn last_station(&self) -> Option<&Station> {
        self.by_up_station
            .values()
            .map(|section| &section.down_station)
            .find(|station| !self.by_up_station.contains_key(&station.id))
    }

    /// Insert a section, refusing one whose endpoints are already taken in the
    /// same direction.
    pub(crate) fn insert(&mut self, section: Section) -> Result<(), PathError> {
        let up = section.up_station.id;
        let down = section.down_station.id;

        if self.by_up_station.contains_key(&up) {
            return Err(PathError::InvariantViolation(format!(
                "station {up} already has an outgoing section"
            )));
        }
        if self.up_by_down_station.contains_key(&down) {
            return Err(PathError::InvariantViolation(format!(
                "station {down} already has an incoming section"
            )));
        }

        self.up_by_down_station.insert(down, up);
        self.by_up_station.insert(up, section);
        Ok(())
    }

    /// Remove the section leaving the given station
    pub(crate) fn remove_by_up_station(&mut self, station: &StationId) -> Option<Section> {
        let section = self.by_up_station.shift_remove(station)?;
        self.up_by_down_station.remove(&section.down_station.id);
        Some(section)
    }

    pub(crate) fn clear(&mut self) {
        self.by_up_station.clear();
        self.up_by_down_station.clear();
    }
}

impl TryFrom<Vec<Section>> for Sections {
    type Error = PathError;

    fn try_from(list: Vec<Section>) -> Result<Self, Self::Error> {
        let mut sections = Self::new();
        for section in list {
            sections.insert(section)?;
        }
        Ok(sections)
    }
}

impl From<Sections> for Vec<Section> {
    fn from(sections: Sections) -> Self {
        sections.by_up_station.into_values().collect()
    }
}
