use sqlx::PgConnection;

use crate::{
    pkg::internal::adaptors::profiles::spec::{Profile, ProfileKind},
    prelude::Result,
};

pub struct ProfileSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ProfileSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ProfileSelector { pool }
    }

    pub async fn get(&mut self, kind: ProfileKind, owner_id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(
            "SELECT kind, owner_id, name, website, location, description, contact_email, updated_at
             FROM profiles WHERE kind = $1 AND owner_id = $2",
        )
        .bind(kind)
        .bind(owner_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
