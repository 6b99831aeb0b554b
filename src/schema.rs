// 📐 Shape Layer - Request Validation
// Checks request bodies and query parameters before they reach the store.
// Every validator collects all problems instead of stopping at the first.

use crate::db::{AddressUpdate, NewAddress, Page};
use serde::Serialize;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T = ()> = Result<T, Vec<ValidationError>>;

fn finish<T>(value: T, errors: Vec<ValidationError>) -> ValidationResult<T> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

// ============================================================================
// FIELD CHECKS
// ============================================================================

fn check_name(name: &str, errors: &mut Vec<ValidationError>) {
    if name.trim().is_empty() {
        errors.push(ValidationError::new("name", "Required field is empty"));
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64, errors: &mut Vec<ValidationError>) {
    if !value.is_finite() {
        errors.push(ValidationError::new(field, "Must be a finite number"));
    } else if value < min || value > max {
        errors.push(ValidationError::new(
            field,
            format!("Must be between {min} and {max}, got {value}"),
        ));
    }
}

fn check_latitude(field: &str, value: f64, errors: &mut Vec<ValidationError>) {
    check_range(field, value, MIN_LATITUDE, MAX_LATITUDE, errors);
}

fn check_longitude(field: &str, value: f64, errors: &mut Vec<ValidationError>) {
    check_range(field, value, MIN_LONGITUDE, MAX_LONGITUDE, errors);
}

fn required<T>(field: &str, value: Option<T>, errors: &mut Vec<ValidationError>) -> Option<T> {
    if value.is_none() {
        errors.push(ValidationError::new(field, "Required parameter is missing"));
    }
    value
}

// ============================================================================
// VALIDATORS
// ============================================================================

pub fn validate_new_address(input: &NewAddress) -> ValidationResult {
    let mut errors = Vec::new();

    check_name(&input.name, &mut errors);
    check_latitude("latitude", input.latitude, &mut errors);
    check_longitude("longitude", input.longitude, &mut errors);

    finish((), errors)
}

/// Only the fields present in the update are checked
pub fn validate_address_update(input: &AddressUpdate) -> ValidationResult {
    let mut errors = Vec::new();

    if let Some(name) = &input.name {
        check_name(name, &mut errors);
    }
    if let Some(latitude) = input.latitude {
        check_latitude("latitude", latitude, &mut errors);
    }
    if let Some(longitude) = input.longitude {
        check_longitude("longitude", longitude, &mut errors);
    }

    finish((), errors)
}

/// Resolve optional `limit`/`offset` into a [`Page`], applying defaults
pub fn validate_page(limit: Option<i64>, offset: Option<i64>) -> ValidationResult<Page> {
    let mut errors = Vec::new();
    let page = Page {
        limit: limit.unwrap_or(Page::DEFAULT_LIMIT),
        offset: offset.unwrap_or(0),
    };

    if !(1..=Page::MAX_LIMIT).contains(&page.limit) {
        errors.push(ValidationError::new(
            "limit",
            format!("Must be between 1 and {}, got {}", Page::MAX_LIMIT, page.limit),
        ));
    }
    if page.offset < 0 {
        errors.push(ValidationError::new(
            "offset",
            format!("Must not be negative, got {}", page.offset),
        ));
    }

    finish(page, errors)
}

/// Validated parameters of a radius search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

pub fn validate_nearby(
    lat: Option<f64>,
    lon: Option<f64>,
    radius_km: Option<f64>,
) -> ValidationResult<NearbyQuery> {
    let mut errors = Vec::new();

    let lat = required("lat", lat, &mut errors);
    let lon = required("lon", lon, &mut errors);
    let radius_km = required("radius_km", radius_km, &mut errors);

    if let Some(lat) = lat {
        check_latitude("lat", lat, &mut errors);
    }
    if let Some(lon) = lon {
        check_longitude("lon", lon, &mut errors);
    }
    if let Some(radius) = radius_km {
        if !radius.is_finite() {
            errors.push(ValidationError::new("radius_km", "Must be a finite number"));
        } else if radius < 0.0 {
            errors.push(ValidationError::new(
                "radius_km",
                format!("Must not be negative, got {radius}"),
            ));
        }
    }

    match (lat, lon, radius_km) {
        (Some(lat), Some(lon), Some(radius_km)) if errors.is_empty() => {
            Ok(NearbyQuery { lat, lon, radius_km })
        }
        _ => Err(errors),
    }
}
