mod config;
mod error;
mod routes;

use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::sync::Arc;

use config::ServerConfig;
use routes::AppState;
use subway_lines::import::parse_station_names;
use subway_lines::storage::MemoryStorage;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let storage = match &config.data_file {
        Some(path) => MemoryStorage::open(path).map_err(io::Error::other)?,
        None => {
            log::warn!("DATA_FILE is not set, stations and lines are kept in memory only");
            MemoryStorage::new()
        }
    };
    let state = web::Data::new(AppState::new(Arc::new(storage)));

    if let Some(csv_path) = &config.stations_csv {
        let content = std::fs::read_to_string(csv_path)?;
        let names = parse_station_names(&content);
        let added = state.stations.seed(&names).await.map_err(io::Error::other)?;
        log::info!("Read {} station names from {}, {added} new", names.len(), csv_path.display());
    }

    log::info!("Starting server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes::configure::<MemoryStorage>)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
