use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::students::{PgStudentStore, StudentService, StudentStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub students: StudentService,
    /// Parent of every request context; cancelled on shutdown.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        info!("setting up a new database connection");
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        info!("database connection established");

        let store = Arc::new(PgStudentStore::new(db)) as Arc<dyn StudentStore>;
        Ok(Self::from_parts(Arc::new(config), store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn StudentStore>) -> Self {
        Self {
            jwt: JwtKeys::from(&config.jwt),
            config,
            students: StudentService::new(store),
            shutdown: CancellationToken::new(),
        }
    }

    #[cfg(test)]
    pub fn fake(store: Arc<dyn StudentStore>) -> Self {
        Self::from_parts(Arc::new(crate::test_support::test_config()), store)
    }
}
