use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiError, ApiResponse, AppState};
use crate::db::{self, Address, AddressUpdate, NewAddress, RepoResult, Store};
use crate::distance::filter_nearby;
use crate::schema;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeletedAddress {
    pub status: &'static str,
    pub address: Address,
}

/// Run `work` on a connection owned by this request.
///
/// The connection lives inside the blocking task and is closed when the task
/// ends, whether `work` succeeded or not.
async fn with_session<T, F>(store: &Store, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
{
    let store = store.clone();
    let result = tokio::task::spawn_blocking(move || {
        let conn = store.session()?;
        work(&conn)
    })
    .await?;

    Ok(result?)
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health
pub async fn health_check() -> Json<ApiResponse<HealthStatus>> {
    debug!("health check ping");
    Json(ApiResponse::ok(HealthStatus { status: "ok" }))
}

/// POST /addresses/
pub async fn create_address(
    State(state): State<AppState>,
    payload: Result<Json<NewAddress>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Address>>), ApiError> {
    let Json(input) = payload?;
    info!(name = %input.name, "received request to create address");

    schema::validate_new_address(&input)?;

    let address = with_session(&state.store, move |conn| db::create_address(conn, &input)).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(address))))
}

/// GET /addresses/?limit=&offset=
pub async fn list_addresses(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Vec<Address>> {
    let Query(params) = params?;
    let page = schema::validate_page(params.limit, params.offset)?;
    info!(limit = page.limit, offset = page.offset, "fetching addresses");

    let addresses = with_session(&state.store, move |conn| db::list_addresses(conn, page)).await?;
    Ok(Json(ApiResponse::ok(addresses)))
}

/// GET /addresses/:id
pub async fn get_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Address> {
    let Path(id) = id?;

    let address = with_session(&state.store, move |conn| db::get_address_by_id(conn, id))
        .await?
        .ok_or(ApiError::NotFound { id })?;

    Ok(Json(ApiResponse::ok(address)))
}

/// PUT /addresses/:id
pub async fn update_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AddressUpdate>, JsonRejection>,
) -> ApiResult<Address> {
    let Path(id) = id?;
    let Json(input) = payload?;
    info!(id, "updating address");

    schema::validate_address_update(&input)?;

    let address = with_session(&state.store, move |conn| db::update_address(conn, id, &input)).await?;
    Ok(Json(ApiResponse::ok(address)))
}

/// DELETE /addresses/:id
pub async fn delete_address(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<DeletedAddress> {
    let Path(id) = id?;
    info!(id, "deleting address");

    let address = with_session(&state.store, move |conn| db::delete_address(conn, id)).await?;
    Ok(Json(ApiResponse::ok(DeletedAddress {
        status: "deleted",
        address,
    })))
}

/// GET /addresses/nearby/?lat=&lon=&radius_km=
pub async fn nearby_addresses(
    State(state): State<AppState>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> ApiResult<Vec<Address>> {
    let Query(params) = params?;
    let query = schema::validate_nearby(params.lat, params.lon, params.radius_km)?;
    info!(
        lat = query.lat,
        lon = query.lon,
        radius_km = query.radius_km,
        "searching nearby addresses"
    );

    let nearby = with_session(&state.store, move |conn| {
        let all = db::list_all_addresses(conn)?;
        Ok(filter_nearby(all, query.lat, query.lon, query.radius_km))
    })
    .await?;

    info!(count = nearby.len(), "found nearby addresses");
    Ok(Json(ApiResponse::ok(nearby)))
}
