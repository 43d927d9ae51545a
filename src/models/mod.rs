mod error;
mod id;
mod line;
mod section;
mod sections;
mod station;

pub use error::{DistanceViolation, PathError, TopologyViolation};
pub use id::{LineId, StationId};
pub use line::Line;
pub use section::Section;
pub use sections::Sections;
pub use station::Station;
