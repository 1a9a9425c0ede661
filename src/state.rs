use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::repository::{SqliteRepository, TripRepository};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn TripRepository>,
    pub config: Config,
    pub tokens: TokenKeys,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let tokens = TokenKeys::new(&config.auth.jwt_secret, config.auth.token_days);
        Self {
            repo: Arc::new(SqliteRepository::new(pool)),
            config,
            tokens,
        }
    }
}
