use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::schedule::attach_cities;
use super::{ensure_changed, fetch, query_all, query_one, SqliteRepository};
use crate::db::models::*;
use crate::itinerary::days::{check_span, missing_dates};
use crate::repository::{NewTrip, RepoResult, RepositoryError, TripPatch, TripStore};

/// Fills in the trip's missing calendar days.
fn fill_days(conn: &Connection, trip_id: i64) -> RepoResult<usize> {
    let Some((start, end)) = query_one(
        conn,
        "SELECT start_date, end_date FROM trips WHERE id = ?1",
        params![trip_id],
        |row| {
            Ok((
                row.get::<_, Option<NaiveDate>>(0)?,
                row.get::<_, Option<NaiveDate>>(1)?,
            ))
        },
    )?
    else {
        return Err(RepositoryError::NotFound("Trip"));
    };

    check_span(start, end).map_err(|e| RepositoryError::Invalid(e.to_string()))?;

    let existing: Vec<NaiveDate> = query_all(
        conn,
        "SELECT date FROM days WHERE trip_id = ?1",
        params![trip_id],
        |row| row.get(0),
    )?;

    let missing = missing_dates(start, end, &existing);
    if missing.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn.prepare("INSERT OR IGNORE INTO days (trip_id, date) VALUES (?1, ?2)")?;
    let mut created = 0;
    for date in &missing {
        created += stmt.execute(params![trip_id, date])?;
    }
    tracing::debug!(trip_id, created, "Filled trip days");
    Ok(created)
}

fn load_detail(conn: &Connection, trip_id: i64) -> RepoResult<Option<TripDetail>> {
    let Some(trip) = query_one(
        conn,
        &format!("SELECT {} FROM trips WHERE id = ?1", Trip::COLUMNS),
        params![trip_id],
        Trip::from_row,
    )?
    else {
        return Ok(None);
    };

    let cities = query_all(
        conn,
        &format!(
            "SELECT {} FROM cities WHERE trip_id = ?1 ORDER BY position, id",
            City::COLUMNS
        ),
        params![trip_id],
        City::from_row,
    )?;
    let mut city_index: HashMap<i64, City> =
        cities.iter().map(|c| (c.id, c.clone())).collect();

    let mut day_cities: HashMap<i64, Vec<i64>> = HashMap::new();
    for (day_id, city_id) in query_all(
        conn,
        "SELECT dc.day_id, dc.city_id FROM day_cities dc
         JOIN days d ON d.id = dc.day_id
         WHERE d.trip_id = ?1
         ORDER BY dc.day_id, dc.position",
        params![trip_id],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )? {
        day_cities.entry(day_id).or_default().push(city_id);
    }

    let activities = query_all(
        conn,
        &format!(
            "SELECT {} FROM activities
             WHERE day_id IN (SELECT id FROM days WHERE trip_id = ?1)
             ORDER BY position, start_time",
            Activity::COLUMNS
        ),
        params![trip_id],
        Activity::from_row,
    )?;
    let mut by_day: HashMap<i64, Vec<ActivityDetail>> = HashMap::new();
    for detail in attach_cities(conn, activities, &mut city_index)? {
        by_day.entry(detail.activity.day_id).or_default().push(detail);
    }

    let days = query_all(
        conn,
        &format!(
            "SELECT {} FROM days WHERE trip_id = ?1 ORDER BY date",
            Day::COLUMNS
        ),
        params![trip_id],
        Day::from_row,
    )?
    .into_iter()
    .map(|mut day| {
        day.city_ids = day_cities
            .remove(&day.id)
            .unwrap_or_else(|| day.city_id.into_iter().collect());
        DayDetail {
            city: day.city_id.and_then(|id| city_index.get(&id).cloned()),
            activities: by_day.remove(&day.id).unwrap_or_default(),
            day,
        }
    })
    .collect();

    Ok(Some(TripDetail {
        checklist: query_all(
            conn,
            &format!(
                "SELECT {} FROM checklist_items WHERE trip_id = ?1 ORDER BY id",
                ChecklistItem::COLUMNS
            ),
            params![trip_id],
            ChecklistItem::from_row,
        )?,
        expenses: query_all(
            conn,
            &format!(
                "SELECT {} FROM expenses WHERE trip_id = ?1 ORDER BY id",
                Expense::COLUMNS
            ),
            params![trip_id],
            Expense::from_row,
        )?,
        media: query_all(
            conn,
            &format!(
                "SELECT {} FROM media WHERE trip_id = ?1 ORDER BY id",
                Media::COLUMNS
            ),
            params![trip_id],
            Media::from_row,
        )?,
        ideas: query_all(
            conn,
            &format!(
                "SELECT {} FROM ideas WHERE trip_id = ?1 ORDER BY position, created_at DESC",
                Idea::COLUMNS
            ),
            params![trip_id],
            Idea::from_row,
        )?,
        bookings: query_all(
            conn,
            &format!(
                "SELECT {} FROM bookings WHERE trip_id = ?1 ORDER BY date_time, created_at DESC",
                Booking::COLUMNS
            ),
            params![trip_id],
            Booking::from_row,
        )?,
        places: query_all(
            conn,
            &format!(
                "SELECT {} FROM places WHERE trip_id = ?1 ORDER BY created_at DESC, id DESC",
                Place::COLUMNS
            ),
            params![trip_id],
            Place::from_row,
        )?,
        memberships: memberships(conn, trip_id)?,
        trip,
        cities,
        days,
    }))
}

fn memberships(conn: &Connection, trip_id: i64) -> RepoResult<Vec<MembershipDetail>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM trip_memberships m JOIN users u ON u.id = m.user_id
             WHERE m.trip_id = ?1 ORDER BY m.id",
            MembershipDetail::COLUMNS
        ),
        params![trip_id],
        MembershipDetail::from_row,
    )
}

fn fresh_detail(conn: &Connection, trip_id: i64) -> RepoResult<TripDetail> {
    fill_days(conn, trip_id)?;
    load_detail(conn, trip_id)?.ok_or(RepositoryError::NotFound("Trip"))
}

#[async_trait]
impl TripStore for SqliteRepository {
    async fn count_trips(&self) -> RepoResult<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM trips", [], |row| row.get(0))?)
    }

    async fn list_trips(&self, member: Option<i64>) -> RepoResult<Vec<TripDetail>> {
        let conn = self.conn()?;
        let ids: Vec<i64> = match member {
            Some(user_id) => query_all(
                &conn,
                "SELECT id FROM trips
                 WHERE owner_id = ?1
                    OR id IN (SELECT trip_id FROM trip_memberships WHERE user_id = ?1)
                 ORDER BY created_at DESC, id DESC",
                params![user_id],
                |row| row.get(0),
            )?,
            None => query_all(
                &conn,
                "SELECT id FROM trips ORDER BY created_at DESC, id DESC",
                [],
                |row| row.get(0),
            )?,
        };

        ids.into_iter()
            .map(|id| fresh_detail(&conn, id))
            .collect()
    }

    async fn trip_detail(&self, id: i64) -> RepoResult<Option<TripDetail>> {
        let conn = self.conn()?;
        match fresh_detail(&conn, id) {
            Ok(detail) => Ok(Some(detail)),
            Err(RepositoryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_trip(&self, trip: NewTrip, owner: Option<i64>) -> RepoResult<TripDetail> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO trips (name, start_date, end_date, home_time_zone, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                trip.name,
                trip.start_date,
                trip.end_date,
                trip.home_time_zone,
                owner
            ],
        )?;
        let trip_id = tx.last_insert_rowid();
        if let Some(user_id) = owner {
            tx.execute(
                "INSERT INTO trip_memberships (trip_id, user_id, role) VALUES (?1, ?2, ?3)",
                params![trip_id, user_id, Role::Owner],
            )?;
        }
        let detail = fresh_detail(&tx, trip_id)?;
        tx.commit()?;

        tracing::info!(trip_id, name = %detail.trip.name, "Created trip");
        Ok(detail)
    }

    async fn update_trip(&self, id: i64, patch: TripPatch) -> RepoResult<TripDetail> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let rows = tx.execute(
            "UPDATE trips SET
                name = COALESCE(?1, name),
                start_date = CASE WHEN ?2 THEN ?3 ELSE start_date END,
                end_date = CASE WHEN ?4 THEN ?5 ELSE end_date END,
                home_time_zone = CASE WHEN ?6 THEN ?7 ELSE home_time_zone END
             WHERE id = ?8",
            params![
                patch.name,
                patch.start_date.is_some(),
                patch.start_date.flatten(),
                patch.end_date.is_some(),
                patch.end_date.flatten(),
                patch.home_time_zone.is_some(),
                patch.home_time_zone.flatten(),
                id,
            ],
        )?;
        ensure_changed(rows, "Trip")?;
        let detail = fresh_detail(&tx, id)?;
        tx.commit()?;
        Ok(detail)
    }

    async fn delete_trip(&self, id: i64) -> RepoResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM trips WHERE id = ?1", params![id])?;
        ensure_changed(rows, "Trip")?;
        tracing::info!(trip_id = id, "Deleted trip");
        Ok(())
    }

    async fn ensure_trip_days(&self, id: i64) -> RepoResult<usize> {
        let conn = self.conn()?;
        fill_days(&conn, id)
    }

    async fn list_memberships(&self, trip_id: i64) -> RepoResult<Vec<MembershipDetail>> {
        let conn = self.conn()?;
        memberships(&conn, trip_id)
    }

    async fn upsert_membership(
        &self,
        trip_id: i64,
        email: &str,
        role: Role,
    ) -> RepoResult<MembershipDetail> {
        if role == Role::Owner {
            return Err(RepositoryError::Invalid(
                "role must be editor or viewer".into(),
            ));
        }
        let conn = self.conn()?;
        let owner_id: Option<i64> = fetch(
            &conn,
            "SELECT owner_id FROM trips WHERE id = ?1",
            params![trip_id],
            |row| row.get(0),
            "Trip",
        )?;
        let user_id: i64 = fetch(
            &conn,
            "SELECT id FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
            "User",
        )?;
        if owner_id == Some(user_id) {
            return Err(RepositoryError::Invalid(
                "the trip owner's role cannot be changed".into(),
            ));
        }
        conn.execute(
            "INSERT INTO trip_memberships (trip_id, user_id, role) VALUES (?1, ?2, ?3)
             ON CONFLICT(trip_id, user_id) DO UPDATE SET role = excluded.role",
            params![trip_id, user_id, role],
        )?;
        tracing::info!(trip_id, user_id, %role, "Saved membership");
        fetch(
            &conn,
            &format!(
                "SELECT {} FROM trip_memberships m JOIN users u ON u.id = m.user_id
                 WHERE m.trip_id = ?1 AND m.user_id = ?2",
                MembershipDetail::COLUMNS
            ),
            params![trip_id, user_id],
            MembershipDetail::from_row,
            "Membership",
        )
    }
}
