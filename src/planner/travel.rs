use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Upper distance bound (exclusive) and the minutes it takes.
const DISTANCE_BUCKETS: &[(f64, i64)] = &[
    (0.8, 10),
    (3.0, 18),
    (10.0, 32),
    (30.0, 60),
    (75.0, 95),
];
const LONG_HAUL_MINUTES: i64 = 120;
const SAME_CITY_MINUTES: i64 = 20;
const OTHER_CITY_MINUTES: i64 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Self { lat, lng })
            }
            _ => None,
        }
    }
}

/// Where an activity happens, as far as travel is concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub coordinates: Option<Coordinates>,
    pub city_id: Option<i64>,
    pub start: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelEstimate {
    pub distance_km: Option<f64>,
    pub minutes: i64,
    /// Latest departure that still reaches the next stop on time.
    pub leave_by: Option<DateTime<Utc>>,
}

pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn minutes_for_distance(km: f64) -> i64 {
    DISTANCE_BUCKETS
        .iter()
        .find(|(limit, _)| km < *limit)
        .map(|(_, minutes)| *minutes)
        .unwrap_or(LONG_HAUL_MINUTES)
}

pub fn estimate(from: &Stop, to: &Stop) -> TravelEstimate {
    let distance_km = match (from.coordinates, to.coordinates) {
        (Some(a), Some(b)) => Some(haversine_km(a, b)),
        _ => None,
    };
    let minutes = match distance_km {
        Some(km) => minutes_for_distance(km),
        None => match (from.city_id, to.city_id) {
            (Some(a), Some(b)) if a == b => SAME_CITY_MINUTES,
            _ => OTHER_CITY_MINUTES,
        },
    };
    let leave_by = match (from.start, to.start) {
        (Some(_), Some(next_start)) => Some(next_start - Duration::minutes(minutes)),
        _ => None,
    };
    TravelEstimate {
        distance_km,
        minutes,
        leave_by,
    }
}
