//! Lenient request-body fields. Clients send ids and coordinates as numbers
//! or numeric strings, and blank strings mean "not set".

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::itinerary::days::{parse_date_input, parse_instant};
use crate::itinerary::ordering::OrderScope;
use crate::itinerary::promotion::{DayTarget, Promotion};

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

/// Number or numeric string; anything else is treated as absent.
pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(value_to_i64)
        .filter(|id| *id > 0))
}

/// Array of ids; unparseable entries are dropped.
pub fn ids<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<i64>>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => Some(items.iter().filter_map(value_to_i64).collect()),
        _ => None,
    })
}

pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .as_ref()
        .and_then(value_to_f64))
}

/// For patches: absent leaves the value, `null` or `""` clears it.
pub fn float_patch<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<f64>>, D::Error> {
    Ok(Some(
        Option::<Value>::deserialize(d)?
            .as_ref()
            .and_then(value_to_f64),
    ))
}

/// String, or a number rendered as a string.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `None` for missing or blank input.
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn required(value: Option<String>, message: &str) -> AppResult<String> {
    present(value).ok_or_else(|| AppError::BadRequest(message.to_string()))
}

pub fn date(value: Option<String>, field: &str) -> AppResult<Option<NaiveDate>> {
    match present(value) {
        Some(raw) => parse_date_input(&raw)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("{field} must be a date (YYYY-MM-DD)"))),
        None => Ok(None),
    }
}

pub fn instant(value: Option<String>, field: &str) -> AppResult<Option<DateTime<Utc>>> {
    match present(value) {
        Some(raw) => parse_instant(&raw)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("{field} must be an ISO timestamp"))),
        None => Ok(None),
    }
}

pub fn time_zone(value: Option<String>) -> AppResult<Option<String>> {
    match present(value) {
        Some(name) => name
            .parse::<Tz>()
            .map(|tz| Some(tz.name().to_string()))
            .map_err(|_| AppError::BadRequest(format!("unknown time zone: {name}"))),
        None => Ok(None),
    }
}

/// Ordered id list from a reorder body.
pub fn order(value: &Value) -> Option<Vec<i64>> {
    value.as_array()?.iter().map(value_to_i64).collect()
}

/// `{ "order": [id, ...] }`
#[derive(Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub order: Value,
}

impl ReorderRequest {
    pub fn ids(&self, scope: OrderScope) -> AppResult<Vec<i64>> {
        order(&self.order).ok_or_else(|| AppError::BadRequest(scope.order_shape_error()))
    }
}

/// Body of the idea and place promote endpoints.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    #[serde(default)]
    pub day_id: Value,
    pub start_time: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

impl PromoteRequest {
    pub fn into_promotion(self) -> AppResult<Promotion> {
        let day = match &self.day_id {
            Value::Null => return Err(AppError::BadRequest("dayId is required to promote".into())),
            Value::String(s) if s.trim().is_empty() => {
                return Err(AppError::BadRequest("dayId is required to promote".into()))
            }
            value => DayTarget::from_json(value).ok_or_else(|| {
                AppError::BadRequest("dayId must be a day id or date:YYYY-MM-DD".into())
            })?,
        };
        Ok(Promotion {
            day,
            start_time: instant(self.start_time, "startTime")?,
            location: present(self.location),
            category: present(self.category),
        })
    }
}
