use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::StationId;

/// A station as seen by lines: an identity token with a display name.
///
/// Two stations are equal when their ids are equal; the name is carried for
/// presentation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Station {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: StationId::generate(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}

impl Hash for Station {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_equality_is_by_id() {
        let station = Station::new("Gangnam");
        let mut renamed = station.clone();
        renamed.name = "Yeoksam".to_string();

        assert_eq!(station, renamed);
        assert_ne!(station, Station::new("Gangnam"));
    }
}
