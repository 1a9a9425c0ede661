use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::Day;
use crate::error::{AppError, AppResult};
use crate::extractors::{DayKind, Editor, JsonBody, TripKind};
use crate::repository::{DayPatch, NewDay};
use crate::routes::payload;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/{id}/days", post(create_day))
        .route("/days/{id}", patch(update_day))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayRequest {
    date: Option<String>,
    title: Option<String>,
    note: Option<String>,
    #[serde(default, deserialize_with = "payload::id")]
    city_id: Option<i64>,
    #[serde(default, deserialize_with = "payload::ids")]
    city_ids: Option<Vec<i64>>,
}

async fn create_day(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<DayRequest>,
) -> AppResult<(StatusCode, Json<Day>)> {
    let date = payload::date(body.date, "date")?
        .ok_or_else(|| AppError::BadRequest("date is required (ISO string)".into()))?;

    let day = NewDay {
        date,
        title: payload::present(body.title),
        note: payload::present(body.note),
        city_id: body.city_id,
        city_ids: body.city_ids.unwrap_or_default(),
    };
    let day = state.repo.create_day(trip.id, day).await?;
    Ok((StatusCode::CREATED, Json(day)))
}

async fn update_day(
    State(state): State<AppState>,
    day: Editor<DayKind>,
    JsonBody(body): JsonBody<DayRequest>,
) -> AppResult<Json<Day>> {
    let patch = DayPatch {
        title: body.title,
        note: body.note,
        city_id: body.city_id,
        city_ids: body.city_ids,
    };
    Ok(Json(state.repo.update_day(day.id, patch).await?))
}
