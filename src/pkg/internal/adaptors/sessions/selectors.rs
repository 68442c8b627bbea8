use sqlx::PgConnection;
use uuid::Uuid;

use crate::{pkg::internal::adaptors::sessions::spec::SessionRow, prelude::Result};

pub struct SessionSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> SessionSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        SessionSelector { pool }
    }

    pub async fn get_active(&mut self, token: Uuid) -> Result<Option<SessionRow>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT token, user_id, role, permissions, expires_at
            FROM sessions
            WHERE token = $1
            AND expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
