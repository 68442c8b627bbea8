use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::pkg::internal::{
    lifecycle::ListingStatus,
    listing::{Listing, ListingKind},
    questions::Question,
};

pub const LISTING_COLUMNS: &str = "id, kind, owner_id, title, description, status, category, details, has_application_form, questions, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct ListingRow {
    pub id: Uuid,
    pub kind: ListingKind,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub status: ListingStatus,
    pub category: Option<String>,
    pub details: Json<Value>,
    pub has_application_form: bool,
    pub questions: Json<Vec<Question>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            kind: row.kind,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            status: row.status,
            category: row.category,
            details: row.details.0,
            has_application_form: row.has_application_form,
            questions: row.questions.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
