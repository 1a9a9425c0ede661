use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::TripDetail;
use crate::error::{AppError, AppResult};
use crate::extractors::{Editor, JsonBody, MaybeUser, Owner, Reader, TripKind};
use crate::itinerary::days::check_span;
use crate::planner::{build_itinerary, Itinerary};
use crate::repository::{NewTrip, TripPatch};
use crate::routes::payload;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route(
            "/trips/{id}",
            get(get_trip).patch(update_trip).delete(delete_trip),
        )
        .route("/trips/{id}/itinerary", get(itinerary))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTripRequest {
    name: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    home_time_zone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTripRequest {
    name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    start_date: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    end_date: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    home_time_zone: Option<Option<String>>,
}

async fn list_trips(
    State(state): State<AppState>,
    user: MaybeUser,
) -> AppResult<Json<Vec<TripDetail>>> {
    let member = user.id();
    if member.is_none() && !state.config.auth.allow_anonymous_read {
        return Err(AppError::Unauthorized("not authenticated".into()));
    }
    Ok(Json(state.repo.list_trips(member).await?))
}

async fn create_trip(
    State(state): State<AppState>,
    user: MaybeUser,
    JsonBody(body): JsonBody<CreateTripRequest>,
) -> AppResult<(StatusCode, Json<TripDetail>)> {
    let trip = NewTrip {
        name: payload::required(body.name, "name is required")?,
        start_date: payload::date(body.start_date, "startDate")?,
        end_date: payload::date(body.end_date, "endDate")?,
        home_time_zone: payload::time_zone(body.home_time_zone)?,
    };
    check_span(trip.start_date, trip.end_date)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let detail = state.repo.create_trip(trip, user.id()).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_trip(
    State(state): State<AppState>,
    trip: Reader<TripKind>,
) -> AppResult<Json<TripDetail>> {
    state
        .repo
        .trip_detail(trip.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Trip"))
}

async fn update_trip(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<UpdateTripRequest>,
) -> AppResult<Json<TripDetail>> {
    let patch = TripPatch {
        name: payload::present(body.name),
        start_date: body
            .start_date
            .map(|v| payload::date(v, "startDate"))
            .transpose()?,
        end_date: body
            .end_date
            .map(|v| payload::date(v, "endDate"))
            .transpose()?,
        home_time_zone: body
            .home_time_zone
            .map(payload::time_zone)
            .transpose()?,
    };
    Ok(Json(state.repo.update_trip(trip.id, patch).await?))
}

async fn delete_trip(State(state): State<AppState>, trip: Owner) -> AppResult<StatusCode> {
    tracing::debug!(trip_id = trip.id, user_id = trip.user.id, "Owner deleting trip");
    state.repo.delete_trip(trip.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn itinerary(
    State(state): State<AppState>,
    trip: Reader<TripKind>,
) -> AppResult<Json<Itinerary>> {
    let detail = state
        .repo
        .trip_detail(trip.id)
        .await?
        .ok_or_else(|| AppError::not_found("Trip"))?;
    Ok(Json(build_itinerary(&detail)))
}
