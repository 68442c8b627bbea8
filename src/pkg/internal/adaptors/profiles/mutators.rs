use sqlx::PgConnection;

use crate::{
    pkg::internal::adaptors::profiles::spec::{Profile, ProfileInput, ProfileKind},
    prelude::Result,
};

pub struct ProfileMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ProfileMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ProfileMutator { pool }
    }

    pub async fn upsert(
        &mut self,
        kind: ProfileKind,
        owner_id: &str,
        input: &ProfileInput,
    ) -> Result<Profile> {
        let row = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (kind, owner_id, name, website, location, description, contact_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (kind, owner_id) DO UPDATE
            SET name = $3, website = $4, location = $5, description = $6,
                contact_email = $7, updated_at = CURRENT_TIMESTAMP
            RETURNING kind, owner_id, name, website, location, description, contact_email, updated_at
            "#,
        )
        .bind(kind)
        .bind(owner_id)
        .bind(input.name.trim())
        .bind(&input.website)
        .bind(input.location.trim())
        .bind(input.description.trim())
        .bind(input.contact_email.trim())
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
