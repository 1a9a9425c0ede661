use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::password;
use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, JsonBody};
use crate::repository::NewUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// -- Cookie helpers --

fn token_cookie(name: &str, token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_token_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

fn credentials(email: Option<String>, password: Option<String>) -> AppResult<(String, String)> {
    let email = email.map(|e| e.trim().to_string()).unwrap_or_default();
    let password = password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".into(),
        ));
    }
    Ok((email, password))
}

fn signed_in(state: &AppState, status: StatusCode, user: User) -> AppResult<Response> {
    let token = state.tokens.issue(user.id)?;
    let cookie = token_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.tokens.ttl().num_seconds(),
    );
    Ok((status, [(header::SET_COOKIE, cookie)], Json(user)).into_response())
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> AppResult<Response> {
    let (email, password) = credentials(body.email, body.password)?;
    if state.repo.user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email already registered".into()));
    }

    let password_hash = password::hash(password, state.config.auth.bcrypt_cost).await?;
    let user = state
        .repo
        .create_user(NewUser {
            email,
            password_hash,
            name: body.name.filter(|n| !n.trim().is_empty()),
        })
        .await?;

    signed_in(&state, StatusCode::CREATED, user)
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> AppResult<Response> {
    let (email, password) = credentials(body.email, body.password)?;
    let invalid = || AppError::Unauthorized("invalid credentials".into());

    let found = state.repo.user_by_email(&email).await?.ok_or_else(invalid)?;
    if !password::verify(password, found.password_hash).await? {
        tracing::debug!(email = %email, "Rejected login");
        return Err(invalid());
    }

    signed_in(&state, StatusCode::OK, found.user)
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        StatusCode::NO_CONTENT,
        [(
            header::SET_COOKIE,
            clear_token_cookie(&state.config.auth.cookie_name),
        )],
    )
        .into_response()
}

/// GET /auth/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<User>> {
    let user = state
        .repo
        .user_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("not authenticated".into()))?;
    Ok(Json(user))
}
