use sqlx::{types::Json, PgConnection};
use uuid::Uuid;

use crate::{
    pkg::internal::{
        adaptors::listings::spec::{ListingRow, LISTING_COLUMNS},
        lifecycle::ListingStatus,
        listing::{ListingFields, ListingKind},
    },
    prelude::Result,
};

pub struct ListingMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ListingMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ListingMutator { pool }
    }

    pub async fn create(
        &mut self,
        kind: ListingKind,
        owner_id: &str,
        status: ListingStatus,
        fields: ListingFields,
    ) -> Result<ListingRow> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            INSERT INTO listings (id, kind, owner_id, title, description, status, category, details, has_application_form, questions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            LISTING_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(owner_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(status)
        .bind(&fields.category)
        .bind(Json(&fields.details))
        .bind(fields.has_application_form)
        .bind(Json(&fields.questions))
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_fields(
        &mut self,
        kind: ListingKind,
        id: Uuid,
        fields: ListingFields,
    ) -> Result<Option<ListingRow>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            UPDATE listings
            SET title = $3, description = $4, category = $5, details = $6,
                has_application_form = $7, questions = $8, updated_at = CURRENT_TIMESTAMP
            WHERE kind = $1 AND id = $2
            RETURNING {}
            "#,
            LISTING_COLUMNS
        ))
        .bind(kind)
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.category)
        .bind(Json(&fields.details))
        .bind(fields.has_application_form)
        .bind(Json(&fields.questions))
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_status(
        &mut self,
        kind: ListingKind,
        id: Uuid,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<Option<ListingRow>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            UPDATE listings
            SET status = $3, updated_at = CURRENT_TIMESTAMP
            WHERE kind = $1 AND id = $2 AND status = $4
            RETURNING {}
            "#,
            LISTING_COLUMNS
        ))
        .bind(kind)
        .bind(id)
        .bind(to)
        .bind(from)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&mut self, kind: ListingKind, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM listings WHERE kind = $1 AND id = $2")
            .bind(kind)
            .bind(id)
            .execute(&mut *self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
