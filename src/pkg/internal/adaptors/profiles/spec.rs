use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use validator::Validate;

use crate::pkg::internal::{auth::Role, validation::non_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "profile_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Company,
    University,
}

impl ProfileKind {
    pub fn segment(&self) -> &'static str {
        match self {
            ProfileKind::Company => "company",
            ProfileKind::University => "university",
        }
    }

    pub fn owner_role(&self) -> Role {
        match self {
            ProfileKind::Company => Role::Institution,
            ProfileKind::University => Role::University,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub kind: ProfileKind,
    pub owner_id: String,
    pub name: String,
    pub website: Option<String>,
    pub location: String,
    pub description: String,
    pub contact_email: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[validate(custom(function = "non_blank", message = "name cannot be empty"))]
    pub name: String,
    #[validate(url(message = "website must be a valid url"))]
    pub website: Option<String>,
    #[validate(custom(function = "non_blank", message = "location cannot be empty"))]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[validate(email(message = "contact email must be a valid email address"))]
    pub contact_email: String,
}

impl From<&Profile> for ProfileInput {
    fn from(profile: &Profile) -> Self {
        ProfileInput {
            name: profile.name.clone(),
            website: profile.website.clone(),
            location: profile.location.clone(),
            description: profile.description.clone(),
            contact_email: profile.contact_email.clone(),
        }
    }
}
