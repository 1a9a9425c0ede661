use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::{MembershipDetail, Role};
use crate::error::{AppError, AppResult};
use crate::extractors::{Editor, JsonBody, TripKind};
use crate::routes::payload;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/trips/{id}/memberships",
        get(list_memberships).post(add_membership),
    )
}

#[derive(Deserialize)]
struct AddMemberRequest {
    email: Option<String>,
    role: Option<String>,
}

async fn list_memberships(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
) -> AppResult<Json<Vec<MembershipDetail>>> {
    Ok(Json(state.repo.list_memberships(trip.id).await?))
}

/// Adds a member, or changes the role of an existing one.
async fn add_membership(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<AddMemberRequest>,
) -> AppResult<(StatusCode, Json<MembershipDetail>)> {
    let email = payload::required(body.email, "email is required")?;
    let role = match payload::present(body.role) {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => Role::Viewer,
    };
    // Ownership only comes from creating the trip.
    if role == Role::Owner {
        return Err(AppError::BadRequest("role must be editor or viewer".into()));
    }

    let membership = state.repo.upsert_membership(trip.id, &email, role).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}
