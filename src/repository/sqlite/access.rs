use async_trait::async_trait;
use rusqlite::params;

use super::{query_one, SqliteRepository};
use crate::access::{AccessStore, Scope};
use crate::db::models::Role;
use crate::repository::RepoResult;

pub(super) fn owning_trip_sql(scope: Scope) -> &'static str {
    match scope {
        Scope::Trip => "SELECT id FROM trips WHERE id = ?1",
        Scope::Day => "SELECT trip_id FROM days WHERE id = ?1",
        Scope::Activity => {
            "SELECT d.trip_id FROM activities a JOIN days d ON d.id = a.day_id WHERE a.id = ?1"
        }
        Scope::Booking => "SELECT trip_id FROM bookings WHERE id = ?1",
        Scope::Idea => "SELECT trip_id FROM ideas WHERE id = ?1",
        Scope::Place => "SELECT trip_id FROM places WHERE id = ?1",
        Scope::City => "SELECT trip_id FROM cities WHERE id = ?1",
        Scope::ChecklistItem => "SELECT trip_id FROM checklist_items WHERE id = ?1",
        Scope::Expense => "SELECT trip_id FROM expenses WHERE id = ?1",
    }
}

#[async_trait]
impl AccessStore for SqliteRepository {
    async fn owning_trip(&self, scope: Scope, id: i64) -> RepoResult<Option<i64>> {
        let conn = self.conn()?;
        query_one(&conn, owning_trip_sql(scope), params![id], |row| row.get(0))
    }

    async fn role_for(&self, trip_id: i64, user_id: i64) -> RepoResult<Option<Role>> {
        let conn = self.conn()?;
        // Only trips.owner_id confers ownership; a stored 'owner' row never does.
        let role: Option<Option<Role>> = query_one(
            &conn,
            "SELECT CASE
                    WHEN t.owner_id = ?2 THEN 'owner'
                    WHEN m.role = 'owner' THEN 'editor'
                    ELSE m.role
                END
             FROM trips t
             LEFT JOIN trip_memberships m ON m.trip_id = t.id AND m.user_id = ?2
             WHERE t.id = ?1",
            params![trip_id, user_id],
            |row| row.get(0),
        )?;
        Ok(role.flatten())
    }
}
