use async_trait::async_trait;
use rusqlite::params;

use super::{query_all, SqliteRepository};
use crate::itinerary::ordering::{plan_positions, OrderScope};
use crate::repository::{OrderStore, RepoResult, RepositoryError};

#[async_trait]
impl OrderStore for SqliteRepository {
    async fn reorder(&self, scope: OrderScope, ids: &[i64]) -> RepoResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let current: Vec<i64> = query_all(
            &tx,
            &format!(
                "SELECT id FROM {} WHERE {} = ?1 ORDER BY position, id",
                scope.table(),
                scope.parent_column()
            ),
            params![scope.parent_id()],
            |row| row.get(0),
        )?;
        let plan = plan_positions(scope, &current, ids)
            .map_err(|e| RepositoryError::Invalid(e.to_string()))?;

        {
            let mut stmt = tx.prepare(&format!(
                "UPDATE {} SET position = ?1 WHERE id = ?2",
                scope.table()
            ))?;
            for (id, position) in &plan {
                stmt.execute(params![position, id])?;
            }
        }
        tx.commit()?;

        tracing::info!(
            scope = scope.noun(),
            parent_id = scope.parent_id(),
            count = plan.len(),
            "Reordered"
        );
        Ok(())
    }
}
