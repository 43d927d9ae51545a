pub mod csv;

pub use self::csv::parse_station_names;
