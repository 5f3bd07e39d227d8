//! Movement trend from the two newest position samples.

use crate::extract::number_field;
use crate::models::{PositionSample, TrendResult};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Displacement above which the object is considered to have moved.
pub const MOVEMENT_THRESHOLD_KM: f64 = 0.1;

/// Great-circle distance between two lat/lon points in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let rlat1 = lat1.to_radians();
    let rlat2 = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + rlat1.cos() * rlat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Compute the trend from samples ordered newest first (as returned by
/// `PositionLog::last_n`). Only the first two are used.
///
/// The pair is re-ordered by `fetched_at` so elapsed time is never negative,
/// even if insertion order and clock order disagree. Fewer than two samples
/// yields the default (all-empty) trend.
pub fn compute_trend(samples: &[PositionSample]) -> TrendResult {
    let (newer, older) = match samples {
        [a, b, ..] => (a, b),
        _ => return TrendResult::default(),
    };
    let (from, to) = if newer.fetched_at < older.fetched_at {
        (newer, older)
    } else {
        (older, newer)
    };

    let from_lat = number_field(&from.payload, "latitude");
    let from_lon = number_field(&from.payload, "longitude");
    let to_lat = number_field(&to.payload, "latitude");
    let to_lon = number_field(&to.payload, "longitude");

    let mut delta_km = 0.0;
    let mut movement = false;
    if let (Some(a1), Some(o1), Some(a2), Some(o2)) = (from_lat, from_lon, to_lat, to_lon) {
        delta_km = haversine_km(a1, o1, a2, o2);
        movement = delta_km > MOVEMENT_THRESHOLD_KM;
    }

    let dt_sec = (to.fetched_at - from.fetched_at).num_milliseconds() as f64 / 1000.0;

    TrendResult {
        movement,
        delta_km,
        dt_sec,
        velocity_kmh: number_field(&to.payload, "velocity"),
        from_time: Some(from.fetched_at),
        to_time: Some(to.fetched_at),
        from_lat,
        from_lon,
        to_lat,
        to_lon,
    }
}
