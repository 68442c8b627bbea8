use sqlx::PgConnection;
use uuid::Uuid;

use crate::{pkg::internal::adaptors::comments::spec::Comment, prelude::Result};

pub struct CommentMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> CommentMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        CommentMutator { pool }
    }

    pub async fn create(&mut self, listing_id: Uuid, author_id: &str, body: &str) -> Result<Comment> {
        let row = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, listing_id, author_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, listing_id, author_id, body, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
