use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::pkg::internal::questions::Answers;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub applicant_id: String,
    pub answers: Answers,
    pub created_at: DateTime<Utc>,
}

/// Batch of answers posted by the application form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub answers: Answers,
}

#[derive(Debug, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub applicant_id: String,
    pub answers: Json<Answers>,
    pub created_at: DateTime<Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Application {
            id: row.id,
            listing_id: row.listing_id,
            applicant_id: row.applicant_id,
            answers: row.answers.0,
            created_at: row.created_at,
        }
    }
}
