use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::{
    constraint_error, ensure_changed, ensure_in_trip, fetch, next_position, query_all,
    query_one, trip_of_existing, SqliteRepository,
};
use crate::access::Scope;
use crate::db::models::{Activity, ActivityDetail, City, Day, Idea, Place};
use crate::itinerary::promotion::{
    activity_from_idea, activity_from_place, check_same_trip, DayTarget, Promotion,
};
use crate::repository::{
    ActivityPatch, DayPatch, NewActivity, NewDay, RepoResult, RepositoryError, ScheduleStore,
};

pub(super) fn load_day(conn: &Connection, id: i64) -> RepoResult<Option<Day>> {
    let Some(mut day) = query_one(
        conn,
        &format!("SELECT {} FROM days WHERE id = ?1", Day::COLUMNS),
        params![id],
        Day::from_row,
    )?
    else {
        return Ok(None);
    };
    day.city_ids = query_all(
        conn,
        "SELECT city_id FROM day_cities WHERE day_id = ?1 ORDER BY position",
        params![id],
        |row| row.get(0),
    )?;
    if day.city_ids.is_empty() {
        day.city_ids.extend(day.city_id);
    }
    Ok(Some(day))
}

fn write_day_cities(conn: &Connection, day_id: i64, city_ids: &[i64]) -> RepoResult<()> {
    conn.execute("DELETE FROM day_cities WHERE day_id = ?1", params![day_id])?;
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO day_cities (day_id, city_id, position) VALUES (?1, ?2, ?3)",
    )?;
    for (position, city_id) in city_ids.iter().enumerate() {
        stmt.execute(params![day_id, city_id, position as i64 + 1])
            .map_err(|e| constraint_error(e, String::new))?;
    }
    Ok(())
}

fn insert_day(conn: &Connection, trip_id: i64, day: &NewDay) -> RepoResult<i64> {
    ensure_in_trip(
        conn,
        trip_id,
        Scope::City,
        day.city_id.into_iter().chain(day.city_ids.iter().copied()),
    )?;
    let primary = day.city_id.or_else(|| day.city_ids.first().copied());
    conn.execute(
        "INSERT INTO days (trip_id, date, title, note, city_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![trip_id, day.date, day.title, day.note, primary],
    )
    .map_err(|e| constraint_error(e, || format!("a day for {} already exists", day.date)))?;
    let id = conn.last_insert_rowid();
    write_day_cities(conn, id, &day.city_ids)?;
    Ok(id)
}

/// Resolves a promotion target, creating the dated day when needed.
fn resolve_target(
    conn: &Connection,
    trip_id: i64,
    target: DayTarget,
    city_id: Option<i64>,
) -> RepoResult<Day> {
    let day_id = match target {
        DayTarget::Id(id) => id,
        DayTarget::Date(date) => match day_on(conn, trip_id, date)? {
            Some(id) => id,
            None => {
                tracing::debug!(trip_id, %date, "Creating day for promotion");
                let new_day = NewDay {
                    date,
                    title: None,
                    note: None,
                    city_id,
                    city_ids: Vec::new(),
                };
                insert_day(conn, trip_id, &new_day)?
            }
        },
    };
    let day = load_day(conn, day_id)?.ok_or(RepositoryError::NotFound("Day"))?;
    check_same_trip(trip_id, &day).map_err(|e| RepositoryError::Invalid(e.to_string()))?;
    Ok(day)
}

fn day_on(conn: &Connection, trip_id: i64, date: NaiveDate) -> RepoResult<Option<i64>> {
    query_one(
        conn,
        "SELECT id FROM days WHERE trip_id = ?1 AND date = ?2",
        params![trip_id, date],
        |row| row.get(0),
    )
}

pub(super) fn insert_activity(
    conn: &Connection,
    day_id: i64,
    activity: &NewActivity,
) -> RepoResult<i64> {
    let trip_id = trip_of_existing(conn, Scope::Day, day_id)?;
    ensure_in_trip(conn, trip_id, Scope::City, activity.city_id)?;
    ensure_in_trip(conn, trip_id, Scope::Place, activity.place_id)?;
    ensure_in_trip(conn, trip_id, Scope::Idea, activity.idea_id)?;
    let position = next_position(conn, "activities", "day_id", day_id)?;
    conn.execute(
        "INSERT INTO activities
            (day_id, city_id, place_id, idea_id, title, description, start_time, end_time,
             location, category, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            day_id,
            activity.city_id,
            activity.place_id,
            activity.idea_id,
            activity.title,
            activity.description,
            activity.start_time,
            activity.end_time,
            activity.location,
            activity.category,
            position,
        ],
    )
    .map_err(|e| constraint_error(e, String::new))?;
    Ok(conn.last_insert_rowid())
}

fn load_activity(conn: &Connection, id: i64) -> RepoResult<Activity> {
    fetch(
        conn,
        &format!("SELECT {} FROM activities WHERE id = ?1", Activity::COLUMNS),
        params![id],
        Activity::from_row,
        "Activity",
    )
}

/// Pairs each activity with its city, loading every city once.
pub(super) fn attach_cities(
    conn: &Connection,
    activities: Vec<Activity>,
    known: &mut HashMap<i64, City>,
) -> RepoResult<Vec<ActivityDetail>> {
    let mut details = Vec::with_capacity(activities.len());
    for activity in activities {
        let city = match activity.city_id {
            Some(city_id) => {
                if !known.contains_key(&city_id) {
                    if let Some(city) = query_one(
                        conn,
                        &format!("SELECT {} FROM cities WHERE id = ?1", City::COLUMNS),
                        params![city_id],
                        City::from_row,
                    )? {
                        known.insert(city_id, city);
                    }
                }
                known.get(&city_id).cloned()
            }
            None => None,
        };
        details.push(ActivityDetail { activity, city });
    }
    Ok(details)
}

fn activity_detail(conn: &Connection, id: i64) -> RepoResult<ActivityDetail> {
    let activity = load_activity(conn, id)?;
    let mut details = attach_cities(conn, vec![activity], &mut HashMap::new())?;
    details.pop().ok_or(RepositoryError::NotFound("Activity"))
}

#[async_trait]
impl ScheduleStore for SqliteRepository {
    async fn create_day(&self, trip_id: i64, day: NewDay) -> RepoResult<Day> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = insert_day(&tx, trip_id, &day)?;
        tx.commit()?;
        load_day(&conn, id)?.ok_or(RepositoryError::NotFound("Day"))
    }

    async fn update_day(&self, id: i64, patch: DayPatch) -> RepoResult<Day> {
        let primary: Option<Option<i64>> = match (patch.city_id, &patch.city_ids) {
            (Some(city_id), _) => Some(Some(city_id)),
            (None, Some(ids)) => Some(ids.first().copied()),
            (None, None) => None,
        };

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let trip_id = trip_of_existing(&tx, Scope::Day, id)?;
        ensure_in_trip(
            &tx,
            trip_id,
            Scope::City,
            patch
                .city_id
                .into_iter()
                .chain(patch.city_ids.iter().flatten().copied()),
        )?;
        let rows = tx
            .execute(
                "UPDATE days SET
                    title = COALESCE(?1, title),
                    note = COALESCE(?2, note),
                    city_id = CASE WHEN ?3 THEN ?4 ELSE city_id END
                 WHERE id = ?5",
                params![patch.title, patch.note, primary.is_some(), primary.flatten(), id],
            )
            .map_err(|e| constraint_error(e, String::new))?;
        ensure_changed(rows, "Day")?;
        if let Some(ref city_ids) = patch.city_ids {
            write_day_cities(&tx, id, city_ids)?;
        }
        tx.commit()?;
        load_day(&conn, id)?.ok_or(RepositoryError::NotFound("Day"))
    }

    async fn day(&self, id: i64) -> RepoResult<Option<Day>> {
        let conn = self.conn()?;
        load_day(&conn, id)
    }

    async fn day_activities(&self, day_id: i64) -> RepoResult<Vec<ActivityDetail>> {
        let conn = self.conn()?;
        let activities = query_all(
            &conn,
            &format!(
                "SELECT {} FROM activities WHERE day_id = ?1 ORDER BY position, start_time",
                Activity::COLUMNS
            ),
            params![day_id],
            Activity::from_row,
        )?;
        attach_cities(&conn, activities, &mut HashMap::new())
    }

    async fn create_activity(
        &self,
        day_id: i64,
        activity: NewActivity,
    ) -> RepoResult<ActivityDetail> {
        let conn = self.conn()?;
        let id = insert_activity(&conn, day_id, &activity)?;
        activity_detail(&conn, id)
    }

    async fn update_activity(&self, id: i64, patch: ActivityPatch) -> RepoResult<ActivityDetail> {
        let conn = self.conn()?;
        let trip_id = trip_of_existing(&conn, Scope::Activity, id)?;
        ensure_in_trip(&conn, trip_id, Scope::City, patch.city_id)?;
        let rows = conn
            .execute(
                "UPDATE activities SET
                    title = COALESCE(?1, title),
                    description = COALESCE(?2, description),
                    start_time = COALESCE(?3, start_time),
                    end_time = COALESCE(?4, end_time),
                    location = COALESCE(?5, location),
                    category = COALESCE(?6, category),
                    city_id = COALESCE(?7, city_id)
                 WHERE id = ?8",
                params![
                    patch.title,
                    patch.description,
                    patch.start_time,
                    patch.end_time,
                    patch.location,
                    patch.category,
                    patch.city_id,
                    id,
                ],
            )
            .map_err(|e| constraint_error(e, String::new))?;
        ensure_changed(rows, "Activity")?;
        activity_detail(&conn, id)
    }

    async fn delete_activity(&self, id: i64) -> RepoResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM activities WHERE id = ?1", params![id])?;
        ensure_changed(rows, "Activity")
    }

    async fn promote_idea(&self, idea_id: i64, promotion: Promotion) -> RepoResult<Activity> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let idea = fetch(
            &tx,
            &format!("SELECT {} FROM ideas WHERE id = ?1", Idea::COLUMNS),
            params![idea_id],
            Idea::from_row,
            "Idea",
        )?;
        let day = resolve_target(&tx, idea.trip_id, promotion.day, idea.city_id)?;
        let draft = activity_from_idea(&idea, &day, &promotion);
        let activity_id = insert_activity(&tx, day.id, &draft)?;
        tx.execute(
            "UPDATE ideas SET status = 'promoted' WHERE id = ?1",
            params![idea_id],
        )?;
        let activity = load_activity(&tx, activity_id)?;
        tx.commit()?;

        tracing::info!(idea_id, day_id = day.id, activity_id, "Promoted idea");
        Ok(activity)
    }

    async fn promote_place(&self, place_id: i64, promotion: Promotion) -> RepoResult<Activity> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let place = fetch(
            &tx,
            &format!("SELECT {} FROM places WHERE id = ?1", Place::COLUMNS),
            params![place_id],
            Place::from_row,
            "Place",
        )?;
        let day = resolve_target(&tx, place.trip_id, promotion.day, place.city_id)?;
        let draft = activity_from_place(&place, &day, &promotion)
            .map_err(|e| RepositoryError::Invalid(e.to_string()))?;
        let activity_id = insert_activity(&tx, day.id, &draft)?;
        let activity = load_activity(&tx, activity_id)?;
        tx.commit()?;

        tracing::info!(place_id, day_id = day.id, activity_id, "Promoted place");
        Ok(activity)
    }
}
