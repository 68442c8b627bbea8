use sqlx::{types::Json, PgConnection};
use uuid::Uuid;

use crate::{
    pkg::internal::{adaptors::sessions::spec::SessionRow, auth::Session},
    prelude::Result,
};

pub struct SessionMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> SessionMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        SessionMutator { pool }
    }

    pub async fn create(&mut self, session: &Session) -> Result<SessionRow> {
        let permissions: Vec<_> = session.permissions.iter().copied().collect();
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (token, user_id, role, permissions, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING token, user_id, role, permissions, expires_at
            "#,
        )
        .bind(session.token)
        .bind(&session.user_id)
        .bind(session.role)
        .bind(Json(permissions))
        .bind(session.expires_at)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn revoke(&mut self, token: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&mut *self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
