use std::env;
use std::path::PathBuf;
use thiserror::Error;

use subway_lines::constants::{DEFAULT_HOST, DEFAULT_PORT};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Snapshot file; state is kept in memory only when unset
    pub data_file: Option<PathBuf>,
    /// CSV file of station names created at startup
    pub stations_csv: Option<PathBuf>,
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `DATA_FILE` and `STATIONS_CSV`
    ///
    /// # Errors
    /// Returns an error if `PORT` is not a valid port number
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|error| ConfigError::InvalidValue {
                key: "PORT",
                value: value.clone(),
                reason: error.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_file: non_empty("DATA_FILE").map(PathBuf::from),
            stations_csv: non_empty("STATIONS_CSV").map(PathBuf::from),
        })
    }
}
