use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::load::{activity_minutes, day_load};
use super::timezone::{format_start, resolve_zone};
use super::travel::{estimate, Coordinates, Stop, TravelEstimate};
use crate::db::models::{ActivityDetail, Place, TripDetail};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryActivity {
    pub id: i64,
    pub title: String,
    pub time_label: String,
    pub time_zone: String,
    pub duration_minutes: i64,
    pub coordinates: Option<Coordinates>,
    /// Travel from the previous activity of the same day.
    pub travel: Option<TravelEstimate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day_id: i64,
    pub date: NaiveDate,
    pub title: Option<String>,
    pub city_ids: Vec<i64>,
    pub total_minutes: i64,
    pub overbooked: bool,
    pub activities: Vec<ItineraryActivity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub trip_id: i64,
    pub home_time_zone: Option<String>,
    pub days: Vec<ItineraryDay>,
}

/// Promoted place coordinates, else the activity's city.
fn coordinates_for(detail: &ActivityDetail, places: &HashMap<i64, &Place>) -> Option<Coordinates> {
    detail
        .activity
        .place_id
        .and_then(|id| places.get(&id))
        .and_then(|place| Coordinates::new(place.lat, place.lng))
        .or_else(|| {
            detail
                .city
                .as_ref()
                .and_then(|city| Coordinates::new(city.lat, city.lng))
        })
}

pub fn build_itinerary(trip: &TripDetail) -> Itinerary {
    let places: HashMap<i64, &Place> = trip.places.iter().map(|p| (p.id, p)).collect();
    let home_zone = trip.trip.home_time_zone.as_deref();

    let days = trip
        .days
        .iter()
        .map(|day| {
            let mut previous: Option<Stop> = None;
            let activities = day
                .activities
                .iter()
                .map(|detail| {
                    let activity = &detail.activity;
                    let tz = resolve_zone(
                        detail.city.as_ref().and_then(|c| c.time_zone.as_deref()),
                        activity.location.as_deref(),
                        home_zone,
                    );
                    let coordinates = coordinates_for(detail, &places);
                    let stop = Stop {
                        coordinates,
                        city_id: activity.city_id,
                        start: activity.start_time,
                    };
                    let travel = previous.as_ref().map(|prev| estimate(prev, &stop));
                    previous = Some(stop);

                    ItineraryActivity {
                        id: activity.id,
                        title: activity.title.clone(),
                        time_label: format_start(activity.start_time, tz),
                        time_zone: tz.name().to_string(),
                        duration_minutes: activity_minutes(activity.start_time, activity.end_time),
                        coordinates,
                        travel,
                    }
                })
                .collect();

            let load = day_load(
                day.activities
                    .iter()
                    .map(|d| (d.activity.start_time, d.activity.end_time)),
            );

            ItineraryDay {
                day_id: day.day.id,
                date: day.day.date,
                title: day.day.title.clone(),
                city_ids: day.day.city_ids.clone(),
                total_minutes: load.total_minutes,
                overbooked: load.overbooked,
                activities,
            }
        })
        .collect();

    Itinerary {
        trip_id: trip.trip.id,
        home_time_zone: trip.trip.home_time_zone.clone(),
        days,
    }
}
