pub mod activities;
pub mod auth;
pub mod cities;
pub mod days;
pub mod health;
pub mod ideas;
pub mod logistics;
pub mod memberships;
pub mod payload;
pub mod places;
pub mod trips;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The whole JSON API.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(trips::router())
        .merge(memberships::router())
        .merge(days::router())
        .merge(activities::router())
        .merge(logistics::router())
        .merge(cities::router())
        .merge(places::router())
        .merge(ideas::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
