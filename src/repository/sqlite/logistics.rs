use async_trait::async_trait;
use rusqlite::params;

use super::{
    constraint_error, ensure_changed, ensure_in_trip, fetch, query_all, trip_of_existing,
    SqliteRepository,
};
use crate::access::Scope;
use crate::db::models::{Booking, ChecklistItem, Expense, Media};
use crate::repository::{
    BookingPatch, LogisticsStore, NewBooking, NewChecklistItem, NewExpense, NewMedia, RepoResult,
};

#[async_trait]
impl LogisticsStore for SqliteRepository {
    async fn list_checklist(&self, trip_id: i64) -> RepoResult<Vec<ChecklistItem>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {} FROM checklist_items WHERE trip_id = ?1 ORDER BY id",
                ChecklistItem::COLUMNS
            ),
            params![trip_id],
            ChecklistItem::from_row,
        )
    }

    async fn create_checklist_item(
        &self,
        trip_id: i64,
        item: NewChecklistItem,
    ) -> RepoResult<ChecklistItem> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO checklist_items (trip_id, title, category) VALUES (?1, ?2, ?3)",
            params![trip_id, item.title, item.category],
        )?;
        fetch(
            &conn,
            &format!(
                "SELECT {} FROM checklist_items WHERE id = ?1",
                ChecklistItem::COLUMNS
            ),
            params![conn.last_insert_rowid()],
            ChecklistItem::from_row,
            "Checklist item",
        )
    }

    async fn toggle_checklist_item(&self, id: i64) -> RepoResult<ChecklistItem> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE checklist_items SET done = NOT done WHERE id = ?1",
            params![id],
        )?;
        ensure_changed(rows, "Checklist item")?;
        fetch(
            &conn,
            &format!(
                "SELECT {} FROM checklist_items WHERE id = ?1",
                ChecklistItem::COLUMNS
            ),
            params![id],
            ChecklistItem::from_row,
            "Checklist item",
        )
    }

    async fn delete_checklist_item(&self, id: i64) -> RepoResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM checklist_items WHERE id = ?1", params![id])?;
        ensure_changed(rows, "Checklist item")
    }

    async fn list_expenses(&self, trip_id: i64) -> RepoResult<Vec<Expense>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {} FROM expenses WHERE trip_id = ?1 ORDER BY incurred_at, id",
                Expense::COLUMNS
            ),
            params![trip_id],
            Expense::from_row,
        )
    }

    async fn create_expense(&self, trip_id: i64, expense: NewExpense) -> RepoResult<Expense> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (trip_id, amount, currency, category, note, incurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                trip_id,
                expense.amount,
                expense.currency,
                expense.category,
                expense.note,
                expense.incurred_at
            ],
        )?;
        fetch(
            &conn,
            &format!("SELECT {} FROM expenses WHERE id = ?1", Expense::COLUMNS),
            params![conn.last_insert_rowid()],
            Expense::from_row,
            "Expense",
        )
    }

    async fn delete_expense(&self, id: i64) -> RepoResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        ensure_changed(rows, "Expense")
    }

    async fn create_media(&self, trip_id: i64, media: NewMedia) -> RepoResult<Media> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO media (trip_id, url, caption, location, taken_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![trip_id, media.url, media.caption, media.location, media.taken_at],
        )?;
        fetch(
            &conn,
            &format!("SELECT {} FROM media WHERE id = ?1", Media::COLUMNS),
            params![conn.last_insert_rowid()],
            Media::from_row,
            "Media",
        )
    }

    async fn list_bookings(&self, trip_id: i64) -> RepoResult<Vec<Booking>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {} FROM bookings WHERE trip_id = ?1 ORDER BY date_time, created_at DESC",
                Booking::COLUMNS
            ),
            params![trip_id],
            Booking::from_row,
        )
    }

    async fn create_booking(&self, trip_id: i64, booking: NewBooking) -> RepoResult<Booking> {
        let conn = self.conn()?;
        ensure_in_trip(&conn, trip_id, Scope::Day, booking.day_id)?;
        ensure_in_trip(&conn, trip_id, Scope::City, booking.city_id)?;
        conn.execute(
            "INSERT INTO bookings
                (trip_id, day_id, city_id, title, type, date_time, location,
                 confirmation_code, link, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                trip_id,
                booking.day_id,
                booking.city_id,
                booking.title,
                booking.kind,
                booking.date_time,
                booking.location,
                booking.confirmation_code,
                booking.link,
                booking.note,
            ],
        )
        .map_err(|e| constraint_error(e, String::new))?;
        fetch(
            &conn,
            &format!("SELECT {} FROM bookings WHERE id = ?1", Booking::COLUMNS),
            params![conn.last_insert_rowid()],
            Booking::from_row,
            "Booking",
        )
    }

    async fn update_booking(&self, id: i64, patch: BookingPatch) -> RepoResult<Booking> {
        let conn = self.conn()?;
        let trip_id = trip_of_existing(&conn, Scope::Booking, id)?;
        ensure_in_trip(&conn, trip_id, Scope::Day, patch.day_id)?;
        ensure_in_trip(&conn, trip_id, Scope::City, patch.city_id)?;
        let rows = conn
            .execute(
                "UPDATE bookings SET
                    title = COALESCE(?1, title),
                    type = COALESCE(?2, type),
                    date_time = COALESCE(?3, date_time),
                    location = COALESCE(?4, location),
                    confirmation_code = COALESCE(?5, confirmation_code),
                    link = COALESCE(?6, link),
                    note = COALESCE(?7, note),
                    day_id = COALESCE(?8, day_id),
                    city_id = COALESCE(?9, city_id)
                 WHERE id = ?10",
                params![
                    patch.title,
                    patch.kind,
                    patch.date_time,
                    patch.location,
                    patch.confirmation_code,
                    patch.link,
                    patch.note,
                    patch.day_id,
                    patch.city_id,
                    id,
                ],
            )
            .map_err(|e| constraint_error(e, String::new))?;
        ensure_changed(rows, "Booking")?;
        fetch(
            &conn,
            &format!("SELECT {} FROM bookings WHERE id = ?1", Booking::COLUMNS),
            params![id],
            Booking::from_row,
            "Booking",
        )
    }

    async fn delete_booking(&self, id: i64) -> RepoResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
        ensure_changed(rows, "Booking")
    }
}
