use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::City;
use crate::error::AppResult;
use crate::extractors::{CityKind, Editor, JsonBody, Reader, TripKind};
use crate::itinerary::ordering::OrderScope;
use crate::repository::{CityPatch, NewCity};
use crate::routes::payload::{self, ReorderRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/{id}/cities", get(list_cities).post(create_city))
        .route("/trips/{id}/cities/reorder", post(reorder_cities))
        .route("/cities/{id}", patch(update_city).delete(delete_city))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCityRequest {
    name: Option<String>,
    country: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    notes: Option<String>,
    time_zone: Option<String>,
    #[serde(default, deserialize_with = "payload::float")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "payload::float")]
    lng: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCityRequest {
    name: Option<String>,
    country: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    notes: Option<String>,
    time_zone: Option<String>,
    #[serde(default, deserialize_with = "payload::float_patch")]
    lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "payload::float_patch")]
    lng: Option<Option<f64>>,
    #[serde(default, deserialize_with = "payload::id")]
    position: Option<i64>,
}

async fn list_cities(
    State(state): State<AppState>,
    trip: Reader<TripKind>,
) -> AppResult<Json<Vec<City>>> {
    Ok(Json(state.repo.list_cities(trip.id).await?))
}

async fn create_city(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<CreateCityRequest>,
) -> AppResult<(StatusCode, Json<City>)> {
    let city = NewCity {
        name: payload::required(body.name, "name is required")?,
        country: payload::present(body.country),
        start_date: payload::date(body.start_date, "startDate")?,
        end_date: payload::date(body.end_date, "endDate")?,
        notes: payload::present(body.notes),
        time_zone: payload::time_zone(body.time_zone)?,
        lat: body.lat,
        lng: body.lng,
    };
    let city = state.repo.create_city(trip.id, city).await?;
    Ok((StatusCode::CREATED, Json(city)))
}

async fn reorder_cities(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<ReorderRequest>,
) -> AppResult<Json<Vec<City>>> {
    let scope = OrderScope::TripCities(trip.id);
    let ids = body.ids(scope)?;
    state.repo.reorder(scope, &ids).await?;
    Ok(Json(state.repo.list_cities(trip.id).await?))
}

async fn update_city(
    State(state): State<AppState>,
    city: Editor<CityKind>,
    JsonBody(body): JsonBody<UpdateCityRequest>,
) -> AppResult<Json<City>> {
    let patch = CityPatch {
        name: payload::present(body.name),
        country: body.country,
        start_date: payload::date(body.start_date, "startDate")?,
        end_date: payload::date(body.end_date, "endDate")?,
        notes: body.notes,
        time_zone: payload::time_zone(body.time_zone)?,
        lat: body.lat,
        lng: body.lng,
        position: body.position,
    };
    Ok(Json(state.repo.update_city(city.id, patch).await?))
}

async fn delete_city(
    State(state): State<AppState>,
    city: Editor<CityKind>,
) -> AppResult<StatusCode> {
    state.repo.delete_city(city.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
