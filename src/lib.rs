// Address Book - Core Library
// Exposes the store, validation and distance filter; the HTTP layer sits behind the `server` feature

pub mod db;
pub mod distance;
pub mod schema;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod logging;

// Re-export commonly used types
pub use db::{
    Address, AddressUpdate, NewAddress, Page, RepoError, RepoResult, Store,
    setup_database, create_address, list_addresses, list_all_addresses,
    get_address_by_id, update_address, delete_address, count_addresses,
};
pub use distance::{filter_nearby, geodesic_distance_km, within_distance};
pub use schema::{
    NearbyQuery, ValidationError, ValidationResult,
    validate_new_address, validate_address_update, validate_page, validate_nearby,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
