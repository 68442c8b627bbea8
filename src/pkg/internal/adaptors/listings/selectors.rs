use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    pkg::internal::{
        adaptors::listings::spec::{ListingRow, LISTING_COLUMNS},
        listing::{ListQuery, ListingKind},
    },
    prelude::Result,
};

pub struct ListingSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ListingSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ListingSelector { pool }
    }

    pub async fn get_by_id(&mut self, kind: ListingKind, id: Uuid) -> Result<Option<ListingRow>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM listings WHERE kind = $1 AND id = $2",
            LISTING_COLUMNS
        ))
        .bind(kind)
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(
        &mut self,
        kind: ListingKind,
        owner_id: Option<&str>,
        query: &ListQuery,
    ) -> Result<Vec<ListingRow>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM listings WHERE kind = ",
            LISTING_COLUMNS
        ));
        qb.push_bind(kind);
        if let Some(owner_id) = owner_id {
            qb.push(" AND owner_id = ").push_bind(owner_id.to_string());
        }
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(term) = query.search_term() {
            let pattern = format!("%{}%", escape_like(&term));
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = query.category_term() {
            qb.push(" AND lower(category) = ").push_bind(category);
        }
        qb.push(" ORDER BY created_at DESC");
        let rows = qb
            .build_query_as::<ListingRow>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(rows)
    }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
