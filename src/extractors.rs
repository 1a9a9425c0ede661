use std::marker::PhantomData;

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::access::{self, Grant, Scope};
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated user. Rejects with 401 when there is no valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.ok_or_else(|| AppError::Unauthorized("not authenticated".into()))
    }
}

/// Optional user extractor: `None` instead of 401 when not authenticated.
/// Invalid or expired tokens count as no token.
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.map(|u| u.id)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = request_token(parts, &state.config.auth.cookie_name)
            .and_then(|token| state.tokens.verify(token))
            .map(|id| CurrentUser { id });
        Ok(MaybeUser(user))
    }
}

/// Bearer header first, then the auth cookie.
fn request_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    bearer.or_else(|| cookie_value(parts, cookie_name))
}

pub fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}

/// Marker tying a path id to the kind of record it names.
pub trait ScopeKind: Send + Sync + 'static {
    const SCOPE: Scope;
}

macro_rules! scope_kinds {
    ($($name:ident => $scope:ident),* $(,)?) => {
        $(
            pub struct $name;

            impl ScopeKind for $name {
                const SCOPE: Scope = Scope::$scope;
            }
        )*
    };
}

scope_kinds! {
    TripKind => Trip,
    DayKind => Day,
    ActivityKind => Activity,
    BookingKind => Booking,
    IdeaKind => Idea,
    PlaceKind => Place,
    CityKind => City,
    ChecklistKind => ChecklistItem,
    ExpenseKind => Expense,
}

async fn path_id(parts: &mut Parts, state: &AppState) -> Result<i64, AppError> {
    let Path(id) = Path::<i64>::from_request_parts(parts, state)
        .await
        .map_err(|_| AppError::BadRequest("invalid id".into()))?;
    Ok(id)
}

/// Path id of a record the user may edit (trip owner or editor).
pub struct Editor<K> {
    pub id: i64,
    pub grant: Grant,
    pub user: CurrentUser,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ScopeKind> FromRequestParts<AppState> for Editor<K> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = path_id(parts, state).await?;
        let user = MaybeUser::from_request_parts(parts, state).await?;
        let grant = access::require_editor(&*state.repo, K::SCOPE, id, user.id()).await?;
        // require_editor only passes with a role, which needs a user.
        let user = user
            .0
            .ok_or_else(|| AppError::Forbidden("no access to this trip".into()))?;
        Ok(Self {
            id,
            grant,
            user,
            _kind: PhantomData,
        })
    }
}

/// Path id of a trip the user owns.
pub struct Owner {
    pub id: i64,
    pub user: CurrentUser,
}

impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = path_id(parts, state).await?;
        let user = MaybeUser::from_request_parts(parts, state).await?;
        access::require_owner(&*state.repo, Scope::Trip, id, user.id()).await?;
        let user = user
            .0
            .ok_or_else(|| AppError::Forbidden("no access to this trip".into()))?;
        Ok(Self { id, user })
    }
}

/// Path id of a record the caller may read.
pub struct Reader<K> {
    pub id: i64,
    pub grant: Grant,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ScopeKind> FromRequestParts<AppState> for Reader<K> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = path_id(parts, state).await?;
        let user = MaybeUser::from_request_parts(parts, state).await?;
        let grant = access::require_reader(
            &*state.repo,
            K::SCOPE,
            id,
            user.id(),
            state.config.auth.allow_anonymous_read,
        )
        .await?;
        Ok(Self {
            id,
            grant,
            _kind: PhantomData,
        })
    }
}

/// `Json<T>` whose rejections use the API's error body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}
