use async_trait::async_trait;

use crate::db::models::Role;
use crate::error::{AppError, AppResult};
use crate::repository::RepoResult;

/// Kind of record an id refers to, used to find the trip that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Trip,
    Day,
    Activity,
    Booking,
    Idea,
    Place,
    City,
    ChecklistItem,
    Expense,
}

impl Scope {
    /// Name used in "<resource> not found" messages.
    pub fn resource(&self) -> &'static str {
        match self {
            Scope::Trip => "Trip",
            Scope::Day => "Day",
            Scope::Activity => "Activity",
            Scope::Booking => "Booking",
            Scope::Idea => "Idea",
            Scope::Place => "Place",
            Scope::City => "City",
            Scope::ChecklistItem => "Checklist item",
            Scope::Expense => "Expense",
        }
    }
}

#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Trip id the record belongs to, or `None` if the record does not exist.
    async fn owning_trip(&self, scope: Scope, id: i64) -> RepoResult<Option<i64>>;

    /// Owner when the trip's owner_id matches, else the membership role.
    async fn role_for(&self, trip_id: i64, user_id: i64) -> RepoResult<Option<Role>>;
}

/// The trip a request is acting on, after the role check passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub trip_id: i64,
    pub role: Option<Role>,
}

async fn resolve<S: AccessStore + ?Sized>(store: &S, scope: Scope, id: i64) -> AppResult<i64> {
    store
        .owning_trip(scope, id)
        .await?
        .ok_or_else(|| AppError::not_found(scope.resource()))
}

async fn role<S: AccessStore + ?Sized>(
    store: &S,
    trip_id: i64,
    user_id: Option<i64>,
) -> AppResult<Option<Role>> {
    match user_id {
        Some(user_id) => Ok(store.role_for(trip_id, user_id).await?),
        None => Ok(None),
    }
}

/// Allows owners and editors of the trip that owns `id`.
pub async fn require_editor<S: AccessStore + ?Sized>(
    store: &S,
    scope: Scope,
    id: i64,
    user_id: Option<i64>,
) -> AppResult<Grant> {
    let trip_id = resolve(store, scope, id).await?;
    match role(store, trip_id, user_id).await? {
        None => Err(AppError::Forbidden("no access to this trip".into())),
        Some(role) if role.can_edit() => Ok(Grant {
            trip_id,
            role: Some(role),
        }),
        Some(_) => Err(AppError::Forbidden("view-only access".into())),
    }
}

pub async fn require_owner<S: AccessStore + ?Sized>(
    store: &S,
    scope: Scope,
    id: i64,
    user_id: Option<i64>,
) -> AppResult<Grant> {
    let grant = require_editor(store, scope, id, user_id).await?;
    if grant.role != Some(Role::Owner) {
        return Err(AppError::Forbidden("only the trip owner can do that".into()));
    }
    Ok(grant)
}

/// Allows any member. Requests without a user pass only when anonymous
/// reads are enabled.
pub async fn require_reader<S: AccessStore + ?Sized>(
    store: &S,
    scope: Scope,
    id: i64,
    user_id: Option<i64>,
    allow_anonymous: bool,
) -> AppResult<Grant> {
    let trip_id = resolve(store, scope, id).await?;
    let role = role(store, trip_id, user_id).await?;
    match (user_id, role) {
        (_, Some(role)) => Ok(Grant {
            trip_id,
            role: Some(role),
        }),
        (None, None) if allow_anonymous => Ok(Grant {
            trip_id,
            role: None,
        }),
        (None, None) => Err(AppError::Unauthorized("not authenticated".into())),
        (Some(_), None) => Err(AppError::Forbidden("no access to this trip".into())),
    }
}
