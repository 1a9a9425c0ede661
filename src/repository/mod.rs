// Repository pattern - isolates all database side effects
mod sqlite;

pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::access::AccessStore;
use crate::db::models::*;
use crate::itinerary::ordering::OrderScope;
use crate::itinerary::promotion::Promotion;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Invalid(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTrip {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub home_time_zone: Option<String>,
}

/// `None` leaves a field alone; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TripPatch {
    pub name: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub home_time_zone: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewDay {
    pub date: NaiveDate,
    pub title: Option<String>,
    pub note: Option<String>,
    pub city_id: Option<i64>,
    pub city_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct DayPatch {
    pub title: Option<String>,
    pub note: Option<String>,
    pub city_id: Option<i64>,
    /// Replaces the day's city list; the first entry becomes the primary
    /// city unless `city_id` is also given.
    pub city_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewActivity {
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub city_id: Option<i64>,
    pub place_id: Option<i64>,
    pub idea_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub city_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewBooking {
    pub title: String,
    pub kind: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub confirmation_code: Option<String>,
    pub link: Option<String>,
    pub note: Option<String>,
    pub day_id: Option<i64>,
    pub city_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub title: Option<String>,
    pub kind: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub confirmation_code: Option<String>,
    pub link: Option<String>,
    pub note: Option<String>,
    pub day_id: Option<i64>,
    pub city_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewChecklistItem {
    pub title: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: String,
    pub currency: String,
    pub category: Option<String>,
    pub note: Option<String>,
    pub incurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewMedia {
    pub url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCity {
    pub name: String,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub time_zone: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CityPatch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub time_zone: Option<String>,
    pub lat: Option<Option<f64>>,
    pub lng: Option<Option<f64>>,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPlace {
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub tag: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub city_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct PlacePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub lat: Option<Option<f64>>,
    pub lng: Option<Option<f64>>,
    pub tag: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub city_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewIdea {
    pub title: String,
    pub link: Option<String>,
    pub note: Option<String>,
    pub category: Option<String>,
    pub city_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub link: Option<String>,
    pub note: Option<String>,
    pub category: Option<String>,
    pub city_id: Option<i64>,
    pub status: Option<IdeaStatus>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;

    async fn user_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>>;

    async fn user_by_id(&self, id: i64) -> RepoResult<Option<User>>;
}

#[async_trait]
pub trait TripStore: Send + Sync {
    async fn count_trips(&self) -> RepoResult<i64>;

    /// Trips newest first. With a user, only trips they own or belong to.
    async fn list_trips(&self, member: Option<i64>) -> RepoResult<Vec<TripDetail>>;

    async fn trip_detail(&self, id: i64) -> RepoResult<Option<TripDetail>>;

    /// Creates the trip, its owner membership and its calendar days.
    async fn create_trip(&self, trip: NewTrip, owner: Option<i64>) -> RepoResult<TripDetail>;

    async fn update_trip(&self, id: i64, patch: TripPatch) -> RepoResult<TripDetail>;

    async fn delete_trip(&self, id: i64) -> RepoResult<()>;

    /// Inserts a day for every missing date between the trip's start and
    /// end date. Returns how many were created.
    async fn ensure_trip_days(&self, id: i64) -> RepoResult<usize>;

    async fn list_memberships(&self, trip_id: i64) -> RepoResult<Vec<MembershipDetail>>;

    async fn upsert_membership(
        &self,
        trip_id: i64,
        email: &str,
        role: Role,
    ) -> RepoResult<MembershipDetail>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Fails with `Conflict` when the trip already has a day on that date.
    async fn create_day(&self, trip_id: i64, day: NewDay) -> RepoResult<Day>;

    async fn update_day(&self, id: i64, patch: DayPatch) -> RepoResult<Day>;

    async fn day(&self, id: i64) -> RepoResult<Option<Day>>;

    async fn day_activities(&self, day_id: i64) -> RepoResult<Vec<ActivityDetail>>;

    async fn create_activity(&self, day_id: i64, activity: NewActivity)
        -> RepoResult<ActivityDetail>;

    async fn update_activity(&self, id: i64, patch: ActivityPatch) -> RepoResult<ActivityDetail>;

    async fn delete_activity(&self, id: i64) -> RepoResult<()>;

    /// Schedules the idea and marks it promoted in one transaction.
    async fn promote_idea(&self, idea_id: i64, promotion: Promotion) -> RepoResult<Activity>;

    /// Schedules the place. The place itself is left untouched.
    async fn promote_place(&self, place_id: i64, promotion: Promotion) -> RepoResult<Activity>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Renumbers the scope so its positions run `1..=N` in the requested
    /// order, members left out of `ids` trailing in their current order.
    async fn reorder(&self, scope: OrderScope, ids: &[i64]) -> RepoResult<()>;
}

#[async_trait]
pub trait LogisticsStore: Send + Sync {
    async fn list_checklist(&self, trip_id: i64) -> RepoResult<Vec<ChecklistItem>>;
    async fn create_checklist_item(
        &self,
        trip_id: i64,
        item: NewChecklistItem,
    ) -> RepoResult<ChecklistItem>;
    async fn toggle_checklist_item(&self, id: i64) -> RepoResult<ChecklistItem>;
    async fn delete_checklist_item(&self, id: i64) -> RepoResult<()>;

    async fn list_expenses(&self, trip_id: i64) -> RepoResult<Vec<Expense>>;
    async fn create_expense(&self, trip_id: i64, expense: NewExpense) -> RepoResult<Expense>;
    async fn delete_expense(&self, id: i64) -> RepoResult<()>;

    async fn create_media(&self, trip_id: i64, media: NewMedia) -> RepoResult<Media>;

    async fn list_bookings(&self, trip_id: i64) -> RepoResult<Vec<Booking>>;
    async fn create_booking(&self, trip_id: i64, booking: NewBooking) -> RepoResult<Booking>;
    async fn update_booking(&self, id: i64, patch: BookingPatch) -> RepoResult<Booking>;
    async fn delete_booking(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait LibraryStore: Send + Sync {
    async fn list_cities(&self, trip_id: i64) -> RepoResult<Vec<City>>;
    async fn create_city(&self, trip_id: i64, city: NewCity) -> RepoResult<City>;
    async fn update_city(&self, id: i64, patch: CityPatch) -> RepoResult<City>;
    async fn delete_city(&self, id: i64) -> RepoResult<()>;

    async fn list_places(&self, trip_id: i64) -> RepoResult<Vec<Place>>;
    async fn create_place(&self, trip_id: i64, place: NewPlace) -> RepoResult<Place>;
    async fn update_place(&self, id: i64, patch: PlacePatch) -> RepoResult<Place>;
    async fn delete_place(&self, id: i64) -> RepoResult<()>;

    async fn list_ideas(&self, trip_id: i64) -> RepoResult<Vec<Idea>>;
    async fn create_idea(&self, trip_id: i64, idea: NewIdea) -> RepoResult<Idea>;
    async fn update_idea(&self, id: i64, patch: IdeaPatch) -> RepoResult<Idea>;
    async fn delete_idea(&self, id: i64) -> RepoResult<()>;
}

/// Everything the HTTP layer needs from storage.
pub trait TripRepository:
    AccessStore + UserStore + TripStore + ScheduleStore + OrderStore + LogisticsStore + LibraryStore
{
}

impl<T> TripRepository for T where
    T: AccessStore
        + UserStore
        + TripStore
        + ScheduleStore
        + OrderStore
        + LogisticsStore
        + LibraryStore
{
}
