//! Checklist, expenses, media and bookings: the trip's practical side.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::{Booking, ChecklistItem, Expense, Media};
use crate::error::{AppError, AppResult};
use crate::extractors::{BookingKind, ChecklistKind, Editor, ExpenseKind, JsonBody, Reader, TripKind};
use crate::repository::{BookingPatch, NewBooking, NewChecklistItem, NewExpense, NewMedia};
use crate::routes::payload;
use crate::state::AppState;

const DEFAULT_CURRENCY: &str = "JPY";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/trips/{id}/checklist",
            get(list_checklist).post(create_checklist_item),
        )
        .route("/checklist/{id}/toggle", patch(toggle_checklist_item))
        .route("/checklist/{id}", delete(delete_checklist_item))
        .route(
            "/trips/{id}/expenses",
            get(list_expenses).post(create_expense),
        )
        .route("/expenses/{id}", delete(delete_expense))
        .route("/trips/{id}/media", post(create_media))
        .route(
            "/trips/{id}/bookings",
            get(list_bookings).post(create_booking),
        )
        .route(
            "/bookings/{id}",
            patch(update_booking).delete(delete_booking),
        )
}

// -- Checklist --

#[derive(Deserialize)]
struct ChecklistRequest {
    title: Option<String>,
    category: Option<String>,
}

async fn list_checklist(
    State(state): State<AppState>,
    trip: Reader<TripKind>,
) -> AppResult<Json<Vec<ChecklistItem>>> {
    Ok(Json(state.repo.list_checklist(trip.id).await?))
}

async fn create_checklist_item(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<ChecklistRequest>,
) -> AppResult<(StatusCode, Json<ChecklistItem>)> {
    let item = NewChecklistItem {
        title: payload::required(body.title, "title is required")?,
        category: payload::present(body.category),
    };
    let item = state.repo.create_checklist_item(trip.id, item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn toggle_checklist_item(
    State(state): State<AppState>,
    item: Editor<ChecklistKind>,
) -> AppResult<Json<ChecklistItem>> {
    Ok(Json(state.repo.toggle_checklist_item(item.id).await?))
}

async fn delete_checklist_item(
    State(state): State<AppState>,
    item: Editor<ChecklistKind>,
) -> AppResult<StatusCode> {
    state.repo.delete_checklist_item(item.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Expenses --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseRequest {
    #[serde(default, deserialize_with = "payload::text")]
    amount: Option<String>,
    currency: Option<String>,
    category: Option<String>,
    note: Option<String>,
    incurred_at: Option<String>,
}

/// Amounts are stored as entered; they only need to read as a number.
fn parse_amount(raw: Option<String>) -> AppResult<String> {
    let amount = payload::required(raw, "amount is required")?;
    match amount.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(amount),
        _ => Err(AppError::BadRequest("amount must be a number".into())),
    }
}

async fn list_expenses(
    State(state): State<AppState>,
    trip: Reader<TripKind>,
) -> AppResult<Json<Vec<Expense>>> {
    Ok(Json(state.repo.list_expenses(trip.id).await?))
}

async fn create_expense(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<ExpenseRequest>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let expense = NewExpense {
        amount: parse_amount(body.amount)?,
        currency: payload::present(body.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        category: payload::present(body.category),
        note: payload::present(body.note),
        incurred_at: payload::instant(body.incurred_at, "incurredAt")?,
    };
    let expense = state.repo.create_expense(trip.id, expense).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn delete_expense(
    State(state): State<AppState>,
    expense: Editor<ExpenseKind>,
) -> AppResult<StatusCode> {
    state.repo.delete_expense(expense.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Media --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaRequest {
    url: Option<String>,
    caption: Option<String>,
    location: Option<String>,
    taken_at: Option<String>,
}

async fn create_media(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<MediaRequest>,
) -> AppResult<(StatusCode, Json<Media>)> {
    let media = NewMedia {
        url: payload::required(body.url, "url is required")?,
        caption: payload::present(body.caption),
        location: payload::present(body.location),
        taken_at: payload::instant(body.taken_at, "takenAt")?,
    };
    let media = state.repo.create_media(trip.id, media).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

// -- Bookings --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingRequest {
    title: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    date_time: Option<String>,
    location: Option<String>,
    confirmation_code: Option<String>,
    link: Option<String>,
    note: Option<String>,
    #[serde(default, deserialize_with = "payload::id")]
    day_id: Option<i64>,
    #[serde(default, deserialize_with = "payload::id")]
    city_id: Option<i64>,
}

async fn list_bookings(
    State(state): State<AppState>,
    trip: Reader<TripKind>,
) -> AppResult<Json<Vec<Booking>>> {
    Ok(Json(state.repo.list_bookings(trip.id).await?))
}

async fn create_booking(
    State(state): State<AppState>,
    trip: Editor<TripKind>,
    JsonBody(body): JsonBody<BookingRequest>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = NewBooking {
        title: payload::required(body.title, "title is required")?,
        kind: payload::present(body.kind),
        date_time: payload::instant(body.date_time, "dateTime")?,
        location: payload::present(body.location),
        confirmation_code: payload::present(body.confirmation_code),
        link: payload::present(body.link),
        note: payload::present(body.note),
        day_id: body.day_id,
        city_id: body.city_id,
    };
    let booking = state.repo.create_booking(trip.id, booking).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn update_booking(
    State(state): State<AppState>,
    booking: Editor<BookingKind>,
    JsonBody(body): JsonBody<BookingRequest>,
) -> AppResult<Json<Booking>> {
    let patch = BookingPatch {
        title: payload::present(body.title),
        kind: body.kind,
        date_time: payload::instant(body.date_time, "dateTime")?,
        location: body.location,
        confirmation_code: body.confirmation_code,
        link: body.link,
        note: body.note,
        day_id: body.day_id,
        city_id: body.city_id,
    };
    Ok(Json(state.repo.update_booking(booking.id, patch).await?))
}

async fn delete_booking(
    State(state): State<AppState>,
    booking: Editor<BookingKind>,
) -> AppResult<StatusCode> {
    state.repo.delete_booking(booking.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
