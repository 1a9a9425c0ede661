use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::db::models::{Day, Idea, Place};
use crate::repository::NewActivity;

const DATE_PREFIX: &str = "date:";

/// Where a promoted idea or place should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayTarget {
    Id(i64),
    /// The trip's day on this date, created if it does not exist yet.
    Date(NaiveDate),
}

impl DayTarget {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(date) = raw.strip_prefix(DATE_PREFIX) {
            return NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .map(DayTarget::Date);
        }
        raw.parse().ok().filter(|id| *id > 0).map(DayTarget::Id)
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().filter(|id| *id > 0).map(DayTarget::Id),
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    pub day: DayTarget,
    pub start_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    #[error("cityId is required (set on place or day)")]
    MissingCity,

    #[error("day belongs to a different trip")]
    ForeignDay,
}

/// Rejects a target day from another trip.
pub fn check_same_trip(source_trip: i64, day: &Day) -> Result<(), PromotionError> {
    if day.trip_id != source_trip {
        return Err(PromotionError::ForeignDay);
    }
    Ok(())
}

pub fn activity_from_idea(idea: &Idea, day: &Day, promotion: &Promotion) -> NewActivity {
    NewActivity {
        title: idea.title.clone(),
        description: non_empty(idea.note.clone()),
        start_time: promotion.start_time,
        end_time: None,
        location: non_empty(promotion.location.clone()),
        category: non_empty(promotion.category.clone()).or_else(|| non_empty(idea.category.clone())),
        city_id: idea.city_id.or(day.city_id),
        place_id: None,
        idea_id: Some(idea.id),
    }
}

pub fn activity_from_place(
    place: &Place,
    day: &Day,
    promotion: &Promotion,
) -> Result<NewActivity, PromotionError> {
    let city_id = place
        .city_id
        .or(day.city_id)
        .ok_or(PromotionError::MissingCity)?;
    let location = non_empty(promotion.location.clone())
        .or_else(|| non_empty(place.address.clone()))
        .unwrap_or_else(|| place.name.clone());

    Ok(NewActivity {
        title: place.name.clone(),
        description: non_empty(place.notes.clone()),
        start_time: promotion.start_time,
        end_time: None,
        location: Some(location),
        category: non_empty(promotion.category.clone()).or_else(|| non_empty(place.tag.clone())),
        city_id: Some(city_id),
        place_id: Some(place.id),
        idea_id: None,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
