use axum::extract::State;
use sqlx::query;

use crate::{pkg::server::state::AppState, prelude::Result};

pub async fn livez() -> Result<()> {
    tracing::debug!("service is live");
    Ok(())
}

pub async fn healthz(State(state): State<AppState>) -> Result<()> {
    if let Some(pool) = &state.db_pool {
        query("select 1").execute(&**pool).await?;
    }
    tracing::debug!("service is healthy");
    Ok(())
}
