/// Version written in front of every persisted snapshot
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

/// Longest accepted line or station name, in characters
pub const MAX_NAME_LENGTH: usize = 255;

/// Port the server binds to when `PORT` is not set
pub const DEFAULT_PORT: u16 = 8080;

/// Address the server binds to when `HOST` is not set
pub const DEFAULT_HOST: &str = "0.0.0.0";
