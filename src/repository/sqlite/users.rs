use async_trait::async_trait;
use rusqlite::params;

use super::{constraint_error, fetch, query_one, SqliteRepository};
use crate::db::models::{User, UserCredentials};
use crate::repository::{NewUser, RepoResult, UserStore};

#[async_trait]
impl UserStore for SqliteRepository {
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (email, password_hash, name) VALUES (?1, ?2, ?3)",
            params![user.email, user.password_hash, user.name],
        )
        .map_err(|e| constraint_error(e, || "email already registered".into()))?;

        let id = conn.last_insert_rowid();
        tracing::info!(user_id = id, "Registered user");
        fetch(
            &conn,
            &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
            params![id],
            User::from_row,
            "User",
        )
    }

    async fn user_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let conn = self.conn()?;
        query_one(
            &conn,
            &format!(
                "SELECT {}, password_hash FROM users WHERE email = ?1",
                User::COLUMNS
            ),
            params![email],
            |row| {
                Ok(UserCredentials {
                    user: User::from_row(row)?,
                    password_hash: row.get("password_hash")?,
                })
            },
        )
    }

    async fn user_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let conn = self.conn()?;
        query_one(
            &conn,
            &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
            params![id],
            User::from_row,
        )
    }
}
