use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::pkg::internal::auth::{Permission, Role, Session};

#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub token: Uuid,
    pub user_id: String,
    pub role: Role,
    pub permissions: Json<Vec<Permission>>,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            token: row.token,
            user_id: row.user_id,
            role: row.role,
            permissions: row.permissions.0.into_iter().collect(),
            expires_at: row.expires_at,
        }
    }
}
