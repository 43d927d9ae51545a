use serde::{Deserialize, Serialize};

use super::{LineId, Station};

/// A directed, distance-weighted edge between two adjacent stations of a line.
///
/// `line_id` refers back to the owning line without owning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub line_id: LineId,
    pub up_station: Station,
    pub down_station: Station,
    pub distance: u32,
}

impl Section {
    #[must_use]
    pub fn new(line_id: LineId, up_station: Station, down_station: Station, distance: u32) -> Self {
        Self {
            line_id,
            up_station,
            down_station,
            distance,
        }
    }
}
