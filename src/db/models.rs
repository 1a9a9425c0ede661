use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-trip role. Owners and editors may mutate; viewers may only read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    pub fn can_edit(&self) -> bool {
        matches!(self, Role::Owner | Role::Editor)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    #[default]
    Open,
    Promoted,
}

impl IdeaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaStatus::Open => "open",
            IdeaStatus::Promoted => "promoted",
        }
    }
}

impl FromStr for IdeaStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IdeaStatus::Open),
            "promoted" => Ok(IdeaStatus::Promoted),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

macro_rules! sql_text_enum {
    ($ty:ty) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

sql_text_enum!(Role);
sql_text_enum!(IdeaStatus);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub created_at: String,
}

impl User {
    pub(crate) const COLUMNS: &'static str = "id, email, name, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// A user row together with its password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub home_time_zone: Option<String>,
    pub owner_id: Option<i64>,
    pub created_at: String,
}

impl Trip {
    pub(crate) const COLUMNS: &'static str =
        "id, name, start_date, end_date, home_time_zone, owner_id, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            home_time_zone: row.get("home_time_zone")?,
            owner_id: row.get("owner_id")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: i64,
    pub trip_id: i64,
    pub user_id: i64,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUser {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipDetail {
    #[serde(flatten)]
    pub membership: Membership,
    pub user: MemberUser,
}

impl MembershipDetail {
    pub(crate) const COLUMNS: &'static str =
        "m.id, m.trip_id, m.user_id, m.role, m.created_at, u.email, u.name";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let membership = Membership {
            id: row.get(0)?,
            trip_id: row.get(1)?,
            user_id: row.get(2)?,
            role: row.get(3)?,
            created_at: row.get(4)?,
        };
        let user = MemberUser {
            id: membership.user_id,
            email: row.get(5)?,
            name: row.get(6)?,
        };
        Ok(Self { membership, user })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: i64,
    pub trip_id: i64,
    pub name: String,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub time_zone: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub position: i64,
    pub created_at: String,
}

impl City {
    pub(crate) const COLUMNS: &'static str = "id, trip_id, name, country, start_date, end_date, notes, time_zone, lat, lng, position, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            trip_id: row.get("trip_id")?,
            name: row.get("name")?,
            country: row.get("country")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            notes: row.get("notes")?,
            time_zone: row.get("time_zone")?,
            lat: row.get("lat")?,
            lng: row.get("lng")?,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub id: i64,
    pub trip_id: i64,
    pub date: NaiveDate,
    pub title: Option<String>,
    pub note: Option<String>,
    pub city_id: Option<i64>,
    /// Every city the day touches, primary city first.
    pub city_ids: Vec<i64>,
    pub created_at: String,
}

impl Day {
    pub(crate) const COLUMNS: &'static str = "id, trip_id, date, title, note, city_id, created_at";

    /// `city_ids` is loaded from `day_cities` separately.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            trip_id: row.get("trip_id")?,
            date: row.get("date")?,
            title: row.get("title")?,
            note: row.get("note")?,
            city_id: row.get("city_id")?,
            city_ids: Vec::new(),
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub day_id: i64,
    pub city_id: Option<i64>,
    pub place_id: Option<i64>,
    pub idea_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub position: i64,
    pub created_at: String,
}

impl Activity {
    pub(crate) const COLUMNS: &'static str = "id, day_id, city_id, place_id, idea_id, title, description, start_time, end_time, location, category, position, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            day_id: row.get("day_id")?,
            city_id: row.get("city_id")?,
            place_id: row.get("place_id")?,
            idea_id: row.get("idea_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            start_time: row.get("start_time")?,
            end_time: row.get("end_time")?,
            location: row.get("location")?,
            category: row.get("category")?,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: Activity,
    pub city: Option<City>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetail {
    #[serde(flatten)]
    pub day: Day,
    pub city: Option<City>,
    pub activities: Vec<ActivityDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub trip_id: i64,
    pub day_id: Option<i64>,
    pub city_id: Option<i64>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub confirmation_code: Option<String>,
    pub link: Option<String>,
    pub note: Option<String>,
    pub created_at: String,
}

impl Booking {
    pub(crate) const COLUMNS: &'static str = "id, trip_id, day_id, city_id, title, type, date_time, location, confirmation_code, link, note, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            trip_id: row.get("trip_id")?,
            day_id: row.get("day_id")?,
            city_id: row.get("city_id")?,
            title: row.get("title")?,
            kind: row.get("type")?,
            date_time: row.get("date_time")?,
            location: row.get("location")?,
            confirmation_code: row.get("confirmation_code")?,
            link: row.get("link")?,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: i64,
    pub trip_id: i64,
    pub title: String,
    pub category: Option<String>,
    pub done: bool,
    pub created_at: String,
}

impl ChecklistItem {
    pub(crate) const COLUMNS: &'static str = "id, trip_id, title, category, done, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            trip_id: row.get("trip_id")?,
            title: row.get("title")?,
            category: row.get("category")?,
            done: row.get("done")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub trip_id: i64,
    /// Decimal amount kept as text so no precision is lost.
    pub amount: String,
    pub currency: String,
    pub category: Option<String>,
    pub note: Option<String>,
    pub incurred_at: Option<DateTime<Utc>>,
    pub created_at: String,
}

impl Expense {
    pub(crate) const COLUMNS: &'static str =
        "id, trip_id, amount, currency, category, note, incurred_at, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            trip_id: row.get("trip_id")?,
            amount: row.get("amount")?,
            currency: row.get("currency")?,
            category: row.get("category")?,
            note: row.get("note")?,
            incurred_at: row.get("incurred_at")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    pub trip_id: i64,
    pub url: String,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: String,
}

impl Media {
    pub(crate) const COLUMNS: &'static str =
        "id, trip_id, url, caption, location, taken_at, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            trip_id: row.get("trip_id")?,
            url: row.get("url")?,
            caption: row.get("caption")?,
            location: row.get("location")?,
            taken_at: row.get("taken_at")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: i64,
    pub trip_id: i64,
    pub city_id: Option<i64>,
    pub title: String,
    pub link: Option<String>,
    pub note: Option<String>,
    pub category: Option<String>,
    pub status: IdeaStatus,
    pub position: i64,
    pub created_at: String,
}

impl Idea {
    pub(crate) const COLUMNS: &'static str =
        "id, trip_id, city_id, title, link, note, category, status, position, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            trip_id: row.get("trip_id")?,
            city_id: row.get("city_id")?,
            title: row.get("title")?,
            link: row.get("link")?,
            note: row.get("note")?,
            category: row.get("category")?,
            status: row.get("status")?,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: i64,
    pub trip_id: i64,
    pub city_id: Option<i64>,
    pub name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub tag: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl Place {
    pub(crate) const COLUMNS: &'static str =
        "id, trip_id, city_id, name, address, lat, lng, tag, link, notes, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            trip_id: row.get("trip_id")?,
            city_id: row.get("city_id")?,
            name: row.get("name")?,
            address: row.get("address")?,
            lat: row.get("lat")?,
            lng: row.get("lng")?,
            tag: row.get("tag")?,
            link: row.get("link")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// A trip with everything the itinerary screens render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: Trip,
    pub cities: Vec<City>,
    pub days: Vec<DayDetail>,
    pub checklist: Vec<ChecklistItem>,
    pub expenses: Vec<Expense>,
    pub media: Vec<Media>,
    pub ideas: Vec<Idea>,
    pub bookings: Vec<Booking>,
    pub places: Vec<Place>,
    pub memberships: Vec<MembershipDetail>,
}
