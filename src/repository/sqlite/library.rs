use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::{
    constraint_error, ensure_changed, ensure_in_trip, fetch, next_position, query_all,
    trip_of_existing, SqliteRepository,
};
use crate::access::Scope;
use crate::db::models::{City, Idea, Place};
use crate::repository::{
    CityPatch, IdeaPatch, LibraryStore, NewCity, NewIdea, NewPlace, PlacePatch, RepoResult,
};

fn city(conn: &Connection, id: i64) -> RepoResult<City> {
    fetch(
        conn,
        &format!("SELECT {} FROM cities WHERE id = ?1", City::COLUMNS),
        params![id],
        City::from_row,
        "City",
    )
}

fn place(conn: &Connection, id: i64) -> RepoResult<Place> {
    fetch(
        conn,
        &format!("SELECT {} FROM places WHERE id = ?1", Place::COLUMNS),
        params![id],
        Place::from_row,
        "Place",
    )
}

fn idea(conn: &Connection, id: i64) -> RepoResult<Idea> {
    fetch(
        conn,
        &format!("SELECT {} FROM ideas WHERE id = ?1", Idea::COLUMNS),
        params![id],
        Idea::from_row,
        "Idea",
    )
}

#[async_trait]
impl LibraryStore for SqliteRepository {
    async fn list_cities(&self, trip_id: i64) -> RepoResult<Vec<City>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {} FROM cities WHERE trip_id = ?1 ORDER BY position, id",
                City::COLUMNS
            ),
            params![trip_id],
            City::from_row,
        )
    }

    async fn create_city(&self, trip_id: i64, new: NewCity) -> RepoResult<City> {
        let conn = self.conn()?;
        let position = next_position(&conn, "cities", "trip_id", trip_id)?;
        conn.execute(
            "INSERT INTO cities
                (trip_id, name, country, start_date, end_date, notes, time_zone, lat, lng, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                trip_id,
                new.name,
                new.country,
                new.start_date,
                new.end_date,
                new.notes,
                new.time_zone,
                new.lat,
                new.lng,
                position,
            ],
        )?;
        city(&conn, conn.last_insert_rowid())
    }

    async fn update_city(&self, id: i64, patch: CityPatch) -> RepoResult<City> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE cities SET
                name = COALESCE(?1, name),
                country = COALESCE(?2, country),
                start_date = COALESCE(?3, start_date),
                end_date = COALESCE(?4, end_date),
                notes = COALESCE(?5, notes),
                time_zone = COALESCE(?6, time_zone),
                lat = CASE WHEN ?7 THEN ?8 ELSE lat END,
                lng = CASE WHEN ?9 THEN ?10 ELSE lng END,
                position = COALESCE(?11, position)
             WHERE id = ?12",
            params![
                patch.name,
                patch.country,
                patch.start_date,
                patch.end_date,
                patch.notes,
                patch.time_zone,
                patch.lat.is_some(),
                patch.lat.flatten(),
                patch.lng.is_some(),
                patch.lng.flatten(),
                patch.position,
                id,
            ],
        )?;
        ensure_changed(rows, "City")?;
        city(&conn, id)
    }

    async fn delete_city(&self, id: i64) -> RepoResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM cities WHERE id = ?1", params![id])?;
        ensure_changed(rows, "City")
    }

    async fn list_places(&self, trip_id: i64) -> RepoResult<Vec<Place>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {} FROM places WHERE trip_id = ?1 ORDER BY created_at DESC, id DESC",
                Place::COLUMNS
            ),
            params![trip_id],
            Place::from_row,
        )
    }

    async fn create_place(&self, trip_id: i64, new: NewPlace) -> RepoResult<Place> {
        let conn = self.conn()?;
        ensure_in_trip(&conn, trip_id, Scope::City, new.city_id)?;
        conn.execute(
            "INSERT INTO places (trip_id, city_id, name, address, lat, lng, tag, link, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                trip_id,
                new.city_id,
                new.name,
                new.address,
                new.lat,
                new.lng,
                new.tag,
                new.link,
                new.notes,
            ],
        )
        .map_err(|e| constraint_error(e, String::new))?;
        place(&conn, conn.last_insert_rowid())
    }

    async fn update_place(&self, id: i64, patch: PlacePatch) -> RepoResult<Place> {
        let conn = self.conn()?;
        let trip_id = trip_of_existing(&conn, Scope::Place, id)?;
        ensure_in_trip(&conn, trip_id, Scope::City, patch.city_id)?;
        let rows = conn
            .execute(
                "UPDATE places SET
                    name = COALESCE(?1, name),
                    address = COALESCE(?2, address),
                    lat = CASE WHEN ?3 THEN ?4 ELSE lat END,
                    lng = CASE WHEN ?5 THEN ?6 ELSE lng END,
                    tag = COALESCE(?7, tag),
                    link = COALESCE(?8, link),
                    notes = COALESCE(?9, notes),
                    city_id = COALESCE(?10, city_id)
                 WHERE id = ?11",
                params![
                    patch.name,
                    patch.address,
                    patch.lat.is_some(),
                    patch.lat.flatten(),
                    patch.lng.is_some(),
                    patch.lng.flatten(),
                    patch.tag,
                    patch.link,
                    patch.notes,
                    patch.city_id,
                    id,
                ],
            )
            .map_err(|e| constraint_error(e, String::new))?;
        ensure_changed(rows, "Place")?;
        place(&conn, id)
    }

    async fn delete_place(&self, id: i64) -> RepoResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM places WHERE id = ?1", params![id])?;
        ensure_changed(rows, "Place")
    }

    async fn list_ideas(&self, trip_id: i64) -> RepoResult<Vec<Idea>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {} FROM ideas WHERE trip_id = ?1 ORDER BY position, created_at DESC",
                Idea::COLUMNS
            ),
            params![trip_id],
            Idea::from_row,
        )
    }

    async fn create_idea(&self, trip_id: i64, new: NewIdea) -> RepoResult<Idea> {
        let conn = self.conn()?;
        ensure_in_trip(&conn, trip_id, Scope::City, new.city_id)?;
        let position = next_position(&conn, "ideas", "trip_id", trip_id)?;
        conn.execute(
            "INSERT INTO ideas (trip_id, city_id, title, link, note, category, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                trip_id,
                new.city_id,
                new.title,
                new.link,
                new.note,
                new.category,
                position,
            ],
        )
        .map_err(|e| constraint_error(e, String::new))?;
        idea(&conn, conn.last_insert_rowid())
    }

    async fn update_idea(&self, id: i64, patch: IdeaPatch) -> RepoResult<Idea> {
        let conn = self.conn()?;
        let trip_id = trip_of_existing(&conn, Scope::Idea, id)?;
        ensure_in_trip(&conn, trip_id, Scope::City, patch.city_id)?;
        let rows = conn
            .execute(
                "UPDATE ideas SET
                    title = COALESCE(?1, title),
                    link = COALESCE(?2, link),
                    note = COALESCE(?3, note),
                    category = COALESCE(?4, category),
                    city_id = COALESCE(?5, city_id),
                    status = COALESCE(?6, status)
                 WHERE id = ?7",
                params![
                    patch.title,
                    patch.link,
                    patch.note,
                    patch.category,
                    patch.city_id,
                    patch.status,
                    id,
                ],
            )
            .map_err(|e| constraint_error(e, String::new))?;
        ensure_changed(rows, "Idea")?;
        idea(&conn, id)
    }

    async fn delete_idea(&self, id: i64) -> RepoResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM ideas WHERE id = ?1", params![id])?;
        ensure_changed(rows, "Idea")
    }
}
