// 🌍 Distance Filter - geodesic distance + radius predicate
//
// Distances are measured on the WGS-84 ellipsoid with Karney's algorithm.
// The nearby search is a plain linear scan over every stored record.

use crate::db::Address;
use geographiclib_rs::{Geodesic, InverseGeodesic};
use once_cell::sync::Lazy;
use tracing::debug;

static WGS84: Lazy<Geodesic> = Lazy::new(Geodesic::wgs84);

/// Geodesic distance between two lat/lon points, in kilometers
pub fn geodesic_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let meters: f64 = WGS84.inverse(lat1, lon1, lat2, lon2);
    meters / 1000.0
}

/// True iff the two points are at most `radius_km` apart
pub fn within_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius_km: f64) -> bool {
    let distance = geodesic_distance_km(lat1, lon1, lat2, lon2);
    debug!(lat1, lon1, lat2, lon2, distance_km = distance, "computed geodesic distance");

    distance <= radius_km
}

/// Keep the addresses lying within `radius_km` of (`lat`, `lon`), in input order
pub fn filter_nearby<I>(addresses: I, lat: f64, lon: f64, radius_km: f64) -> Vec<Address>
where
    I: IntoIterator<Item = Address>,
{
    addresses
        .into_iter()
        .filter(|addr| within_distance(lat, lon, addr.latitude, addr.longitude, radius_km))
        .collect()
}
