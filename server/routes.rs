use actix_web::http::header;
use actix_web::{error, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

use subway_lines::api::{LineRequest, LineUpdateRequest, SectionRequest, StationRequest};
use subway_lines::models::{LineId, StationId};
use subway_lines::service::{LineService, StationService};
use subway_lines::storage::{LineRepository, StationRepository};

use crate::error::{invalid_id, malformed_body, ApiError};

/// Services shared by every worker
pub struct AppState<S> {
    pub stations: StationService<S>,
    pub lines: LineService<S>,
}

impl<S: StationRepository + LineRepository> AppState<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            stations: StationService::new(Arc::clone(&storage)),
            lines: LineService::new(storage),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionRemoval {
    station_id: StationId,
}

/// JSON extractor settings: malformed bodies get the same error shape as service failures
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = malformed_body(err.to_string());
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// An unparseable ID cannot name a resource
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let body = invalid_id(err.to_string());
        error::InternalError::from_response(err, HttpResponse::NotFound().json(body)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let body = malformed_body(err.to_string());
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

pub fn configure<S>(cfg: &mut web::ServiceConfig)
where
    S: StationRepository + LineRepository + 'static,
{
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config());

    cfg.service(
        web::resource("/stations")
            .route(web::post().to(create_station::<S>))
            .route(web::get().to(list_stations::<S>)),
    )
    .service(
        web::resource("/stations/{id}")
            .route(web::get().to(show_station::<S>))
            .route(web::delete().to(delete_station::<S>)),
    )
    .service(
        web::resource("/lines")
            .route(web::post().to(create_line::<S>))
            .route(web::get().to(list_lines::<S>)),
    )
    .service(
        web::resource("/lines/{id}")
            .route(web::get().to(show_line::<S>))
            .route(web::put().to(update_line::<S>))
            .route(web::delete().to(delete_line::<S>)),
    )
    .service(
        web::resource("/lines/{id}/sections")
            .route(web::post().to(add_section::<S>))
            .route(web::delete().to(remove_section::<S>)),
    );
}

async fn create_station<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    request: web::Json<StationRequest>,
) -> Result<HttpResponse, ApiError> {
    let station = state.stations.save_station(request.into_inner()).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/stations/{}", station.id)))
        .json(station))
}

async fn list_stations<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.stations.find_all_stations().await?))
}

async fn show_station<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    id: web::Path<StationId>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.stations.find_station(id.into_inner()).await?))
}

async fn delete_station<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    id: web::Path<StationId>,
) -> Result<HttpResponse, ApiError> {
    state.stations.delete_station(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn create_line<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    request: web::Json<LineRequest>,
) -> Result<HttpResponse, ApiError> {
    let line = state.lines.save_line(request.into_inner()).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/lines/{}", line.id)))
        .json(line))
}

async fn list_lines<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.lines.find_all_lines().await?))
}

async fn show_line<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    id: web::Path<LineId>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.lines.find_line(id.into_inner()).await?))
}

async fn update_line<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    id: web::Path<LineId>,
    request: web::Json<LineUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let line = state
        .lines
        .update_line(id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(line))
}

async fn delete_line<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    id: web::Path<LineId>,
) -> Result<HttpResponse, ApiError> {
    state.lines.delete_line(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_section<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    id: web::Path<LineId>,
    request: web::Json<SectionRequest>,
) -> Result<HttpResponse, ApiError> {
    let line = state
        .lines
        .add_section(id.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(line))
}

async fn remove_section<S: StationRepository + LineRepository>(
    state: web::Data<AppState<S>>,
    id: web::Path<LineId>,
    query: web::Query<SectionRemoval>,
) -> Result<HttpResponse, ApiError> {
    let line = state
        .lines
        .remove_section(id.into_inner(), query.station_id)
        .await?;
    Ok(HttpResponse::Ok().json(line))
}
