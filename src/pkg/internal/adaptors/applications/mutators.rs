use sqlx::{types::Json, PgConnection};
use uuid::Uuid;

use crate::{
    pkg::internal::{adaptors::applications::spec::ApplicationRow, questions::Answers},
    prelude::Result,
};

pub struct ApplicationMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationMutator { pool }
    }

    /// Returns `None` when the applicant already applied to the listing.
    pub async fn create(
        &mut self,
        listing_id: Uuid,
        applicant_id: &str,
        answers: &Answers,
    ) -> Result<Option<ApplicationRow>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications (id, listing_id, applicant_id, answers)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (listing_id, applicant_id) DO NOTHING
            RETURNING id, listing_id, applicant_id, answers, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(applicant_id)
        .bind(Json(answers))
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
