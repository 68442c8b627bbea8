use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    conf::settings,
    pkg::internal::store::{postgres::db_pool, MemoryStore, PgStore, Store},
    prelude::Result,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Present only with the postgres backend; probed by `/healthz`.
    pub db_pool: Option<Arc<PgPool>>,
}

impl AppState {
    pub async fn new() -> Result<AppState> {
        match settings.storage_backend.as_str() {
            "memory" => {
                tracing::warn!("using in-memory storage, data is lost on shutdown");
                Ok(AppState::in_memory())
            }
            _ => Ok(AppState::postgres(Arc::new(db_pool(&settings)?))),
        }
    }

    pub fn postgres(pool: Arc<PgPool>) -> AppState {
        AppState {
            store: Arc::new(PgStore::new(pool.clone())),
            db_pool: Some(pool),
        }
    }

    pub fn in_memory() -> AppState {
        AppState::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> AppState {
        AppState {
            store,
            db_pool: None,
        }
    }
}
