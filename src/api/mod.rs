// 🌐 REST API - axum routes over the address store

pub mod error;
pub mod handlers;

use axum::{routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::Store;
use crate::schema::ValidationError;

pub use error::ApiError;

/// Shared application state. Holds no connection, only the way to open one.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationError>>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    pub fn error(message: impl Into<String>, details: Option<Vec<ValidationError>>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            details,
        }
    }
}

/// Build the full router. Collection routes answer with and without a trailing slash.
pub fn router(state: AppState) -> Router {
    use handlers::*;

    Router::new()
        .route("/health", get(health_check))
        .route("/addresses", get(list_addresses).post(create_address))
        .route("/addresses/", get(list_addresses).post(create_address))
        .route("/addresses/nearby", get(nearby_addresses))
        .route("/addresses/nearby/", get(nearby_addresses))
        .route(
            "/addresses/:id",
            get(get_address).put(update_address).delete(delete_address),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
