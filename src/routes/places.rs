use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::models::{Activity, Place};
use crate::error::{AppError, AppResult};
use crate::extractors::{Editor, JsonBody, PlaceKind, Reader, TripKind};
use crate::planner::{parse_place_link, ParsedLink};
use crate::repository::{NewPlace, PlacePatch};
use crate::routes::payload::{self, PromoteRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/{id}/places", get(list_places).post(create_place))
        .route("/places/parse-link", post(parse_link))
        .route("/places/{id}", patch(update_place).delete(delete_place))
        .route("/places/{id}/promote", post(promote_place))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePlaceRequest {
    name: Option<String>,
    address: Option<String>,
    #[serde(default, deserialize_with = "payload::float")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "payload::float")]
    lng: Option<f64>,
    tag: Option<String>,
    link: Option<String>,
    notes: Option<String>,
    #[serde(default, deserialize_with = "payload::id")]
    city_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePlaceRequest {
    name: Option<String>,
    address: Option<String>,
    #[serde(default, deserialize_with = "payload::float_patch")]
    lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "payload::float_patch")]
    lng: Option<Option<f64>>,
    tag: Option<String>,
    link: Option<String>,
    notes: Option<String>,
    #[serde(default, deserialize_with = "payload::id")]
    city_id: Option<i64>,
}

#[derive(Deserialize)]
struct ParseLinkRequest {
    link: Option<String>,
    url: Option<String>,
}

/// Response of both promote endpoints.
#[derive(Serialize)]
pub struct Promoted {
    pub activity: Activity,
}

async fn list_places(
    State(state): State<AppState>,
    trip: Reader<TripKind>,
) -> AppResult<Json<Vec<Place>>> {
    Ok(Json(state.repo.list_places(trip.id).await?))
}

async fn create_place(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<CreatePlaceRequest>,
) -> AppResult<(StatusCode, Json<Place>)> {
    let name = payload::required(body.name, "name is required")?;
    let city_id = body
        .city_id
        .ok_or_else(|| AppError::BadRequest("cityId is required".into()))?;

    let place = NewPlace {
        name,
        address: payload::present(body.address),
        lat: body.lat,
        lng: body.lng,
        tag: payload::present(body.tag),
        link: payload::present(body.link),
        notes: payload::present(body.notes),
        city_id: Some(city_id),
    };
    let place = state.repo.create_place(trip.id, place).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

async fn update_place(
    State(state): State<AppState>,
    place: Editor<PlaceKind>,
    JsonBody(body): JsonBody<UpdatePlaceRequest>,
) -> AppResult<Json<Place>> {
    let patch = PlacePatch {
        name: payload::present(body.name),
        address: body.address,
        lat: body.lat,
        lng: body.lng,
        tag: body.tag,
        link: body.link,
        notes: body.notes,
        city_id: body.city_id,
    };
    Ok(Json(state.repo.update_place(place.id, patch).await?))
}

async fn delete_place(
    State(state): State<AppState>,
    place: Editor<PlaceKind>,
) -> AppResult<StatusCode> {
    state.repo.delete_place(place.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn promote_place(
    State(state): State<AppState>,
    place: Editor<PlaceKind>,
    JsonBody(body): JsonBody<PromoteRequest>,
) -> AppResult<(StatusCode, Json<Promoted>)> {
    let promotion = body.into_promotion()?;
    let activity = state.repo.promote_place(place.id, promotion).await?;
    Ok((StatusCode::CREATED, Json(Promoted { activity })))
}

async fn parse_link(JsonBody(body): JsonBody<ParseLinkRequest>) -> AppResult<Json<ParsedLink>> {
    let raw = payload::present(body.link)
        .or_else(|| payload::present(body.url))
        .ok_or_else(|| AppError::BadRequest("link is required".into()))?;
    parse_place_link(&raw)
        .map(Json)
        .ok_or_else(|| AppError::BadRequest("link is required".into()))
}
