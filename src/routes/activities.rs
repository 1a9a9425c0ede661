use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::ActivityDetail;
use crate::error::{AppError, AppResult};
use crate::extractors::{ActivityKind, DayKind, Editor, JsonBody};
use crate::itinerary::ordering::OrderScope;
use crate::repository::{ActivityPatch, NewActivity};
use crate::routes::payload::{self, ReorderRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/days/{id}/activities", post(create_activity))
        .route("/days/{id}/activities/reorder", post(reorder_activities))
        .route(
            "/activities/{id}",
            patch(update_activity).delete(delete_activity),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityRequest {
    title: Option<String>,
    description: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    location: Option<String>,
    category: Option<String>,
    #[serde(default, deserialize_with = "payload::id")]
    city_id: Option<i64>,
}

async fn create_activity(
    State(state): State<AppState>,
    day: Editor<DayKind>,
    JsonBody(body): JsonBody<ActivityRequest>,
) -> AppResult<(StatusCode, Json<ActivityDetail>)> {
    let title = payload::required(body.title, "title is required")?;
    let start_time = payload::instant(body.start_time, "startTime")?;
    let end_time = payload::instant(body.end_time, "endTime")?;

    let city_id = match body.city_id {
        Some(id) => Some(id),
        None => state
            .repo
            .day(day.id)
            .await?
            .ok_or_else(|| AppError::not_found("Day"))?
            .city_id,
    };
    let city_id = city_id
        .ok_or_else(|| AppError::BadRequest("cityId is required (or set on the day)".into()))?;

    let activity = NewActivity {
        title,
        description: payload::present(body.description),
        start_time,
        end_time,
        location: payload::present(body.location),
        category: payload::present(body.category),
        city_id: Some(city_id),
        ..Default::default()
    };
    let detail = state.repo.create_activity(day.id, activity).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn reorder_activities(
    State(state): State<AppState>,
    day: Editor<DayKind>,
    JsonBody(body): JsonBody<ReorderRequest>,
) -> AppResult<Json<Vec<ActivityDetail>>> {
    let scope = OrderScope::DayActivities(day.id);
    let ids = body.ids(scope)?;
    state.repo.reorder(scope, &ids).await?;
    Ok(Json(state.repo.day_activities(day.id).await?))
}

async fn update_activity(
    State(state): State<AppState>,
    activity: Editor<ActivityKind>,
    JsonBody(body): JsonBody<ActivityRequest>,
) -> AppResult<Json<ActivityDetail>> {
    let patch = ActivityPatch {
        title: payload::present(body.title),
        description: body.description,
        start_time: payload::instant(body.start_time, "startTime")?,
        end_time: payload::instant(body.end_time, "endTime")?,
        location: body.location,
        category: body.category,
        city_id: body.city_id,
    };
    Ok(Json(state.repo.update_activity(activity.id, patch).await?))
}

async fn delete_activity(
    State(state): State<AppState>,
    activity: Editor<ActivityKind>,
) -> AppResult<StatusCode> {
    state.repo.delete_activity(activity.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
