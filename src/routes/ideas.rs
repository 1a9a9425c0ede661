use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::{Idea, IdeaStatus};
use crate::error::{AppError, AppResult};
use crate::extractors::{Editor, IdeaKind, JsonBody, Reader, TripKind};
use crate::itinerary::ordering::OrderScope;
use crate::repository::{IdeaPatch, NewIdea};
use crate::routes::payload::{self, PromoteRequest, ReorderRequest};
use crate::routes::places::Promoted;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/{id}/ideas", get(list_ideas).post(create_idea))
        .route("/trips/{id}/ideas/reorder", post(reorder_ideas))
        .route("/ideas/{id}", patch(update_idea).delete(delete_idea))
        .route("/ideas/{id}/promote", post(promote_idea))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdeaRequest {
    title: Option<String>,
    link: Option<String>,
    note: Option<String>,
    category: Option<String>,
    #[serde(default, deserialize_with = "payload::id")]
    city_id: Option<i64>,
    status: Option<String>,
}

async fn list_ideas(
    State(state): State<AppState>,
    trip: Reader<TripKind>,
) -> AppResult<Json<Vec<Idea>>> {
    Ok(Json(state.repo.list_ideas(trip.id).await?))
}

async fn create_idea(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<IdeaRequest>,
) -> AppResult<(StatusCode, Json<Idea>)> {
    let idea = NewIdea {
        title: payload::required(body.title, "title is required")?,
        link: payload::present(body.link),
        note: payload::present(body.note),
        category: payload::present(body.category),
        city_id: body.city_id,
    };
    let idea = state.repo.create_idea(trip.id, idea).await?;
    Ok((StatusCode::CREATED, Json(idea)))
}

async fn reorder_ideas(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<ReorderRequest>,
) -> AppResult<Json<Vec<Idea>>> {
    let scope = OrderScope::TripIdeas(trip.id);
    let ids = body.ids(scope)?;
    state.repo.reorder(scope, &ids).await?;
    Ok(Json(state.repo.list_ideas(trip.id).await?))
}

async fn update_idea(
    State(state): State<AppState>,
    idea: Editor<IdeaKind>,
    JsonBody(body): JsonBody<IdeaRequest>,
) -> AppResult<Json<Idea>> {
    let status = payload::present(body.status)
        .map(|raw| raw.parse::<IdeaStatus>())
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let patch = IdeaPatch {
        title: payload::present(body.title),
        link: body.link,
        note: body.note,
        category: body.category,
        city_id: body.city_id,
        status,
    };
    Ok(Json(state.repo.update_idea(idea.id, patch).await?))
}

async fn delete_idea(
    State(state): State<AppState>,
    idea: Editor<IdeaKind>,
) -> AppResult<StatusCode> {
    state.repo.delete_idea(idea.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn promote_idea(
    State(state): State<AppState>,
    idea: Editor<IdeaKind>,
    JsonBody(body): JsonBody<PromoteRequest>,
) -> AppResult<(StatusCode, Json<Promoted>)> {
    let promotion = body.into_promotion()?;
    let activity = state.repo.promote_idea(idea.id, promotion).await?;
    Ok((StatusCode::CREATED, Json(Promoted { activity })))
}
