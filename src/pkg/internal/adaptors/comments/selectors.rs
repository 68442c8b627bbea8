use sqlx::PgConnection;
use uuid::Uuid;

use crate::{pkg::internal::adaptors::comments::spec::Comment, prelude::Result};

pub struct CommentSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> CommentSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        CommentSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, Comment>(
            "SELECT id, listing_id, author_id, body, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_listing(&mut self, listing_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(
            "SELECT id, listing_id, author_id, body, created_at
             FROM comments WHERE listing_id = $1 ORDER BY created_at ASC",
        )
        .bind(listing_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }
}
