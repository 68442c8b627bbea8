use sqlx::PgConnection;
use uuid::Uuid;

use crate::{pkg::internal::adaptors::applications::spec::ApplicationRow, prelude::Result};

pub struct ApplicationSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationSelector { pool }
    }

    pub async fn get_by_listing(&mut self, listing_id: Uuid) -> Result<Vec<ApplicationRow>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            "SELECT id, listing_id, applicant_id, answers, created_at
             FROM applications WHERE listing_id = $1 ORDER BY created_at DESC",
        )
        .bind(listing_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }
}
