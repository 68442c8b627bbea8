use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use sqlx::Type;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{
    auth::{AccessRule, Permission, Role},
    details::ListingDetails,
    lifecycle::ListingStatus,
    questions::{Question, QuestionInput},
    validation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "listing_kind", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum ListingKind {
    Job,
    Scholarship,
    ResearchNews,
    Opportunity,
}

impl ListingKind {
    pub const ALL: [ListingKind; 4] = [
        ListingKind::Job,
        ListingKind::Scholarship,
        ListingKind::ResearchNews,
        ListingKind::Opportunity,
    ];

    /// Collection path segment, `/jobs`, `/research-news`, ...
    pub fn segment(&self) -> &'static str {
        match self {
            ListingKind::Job => "jobs",
            ListingKind::Scholarship => "scholarships",
            ListingKind::ResearchNews => "research-news",
            ListingKind::Opportunity => "opportunities",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ListingKind::Job => "Job",
            ListingKind::Scholarship => "Scholarship",
            ListingKind::ResearchNews => "Research news",
            ListingKind::Opportunity => "Opportunity",
        }
    }

    pub fn author_roles(&self) -> &'static [Role] {
        match self {
            ListingKind::Job | ListingKind::Scholarship => {
                &[Role::Admin, Role::University, Role::Institution]
            }
            ListingKind::ResearchNews => &[Role::Admin, Role::University, Role::Mentor],
            ListingKind::Opportunity => &[Role::Admin, Role::Institution, Role::Ambassador],
        }
    }

    pub fn is_author(&self, role: Role) -> bool {
        self.author_roles().contains(&role)
    }

    /// Rule guarding a management action (create, edit, publish, ...) on
    /// listings of this kind.
    pub fn manage_rule(&self, permission: Permission) -> AccessRule {
        AccessRule::new(self.author_roles().iter().copied(), [permission])
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<D = Value> {
    pub id: Uuid,
    pub kind: ListingKind,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub status: ListingStatus,
    #[serde(default)]
    pub category: Option<String>,
    pub details: D,
    pub has_application_form: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing<Value> {
    pub fn typed<D: DeserializeOwned>(self) -> Result<Listing<D>, serde_json::Error> {
        Ok(Listing {
            details: serde_json::from_value(self.details)?,
            id: self.id,
            kind: self.kind,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            status: self.status,
            category: self.category,
            has_application_form: self.has_application_form,
            questions: self.questions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    pub fn accepts_applications(&self) -> bool {
        self.status == ListingStatus::Live && self.has_application_form
    }
}

/// Columns written by a full-record update. Status is deliberately absent;
/// it only moves through the status endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFields {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub details: Value,
    pub has_application_form: bool,
    pub questions: Vec<Question>,
}

impl From<&Listing<Value>> for ListingFields {
    fn from(listing: &Listing<Value>) -> Self {
        ListingFields {
            title: listing.title.clone(),
            description: listing.description.clone(),
            category: listing.category.clone(),
            details: listing.details.clone(),
            has_application_form: listing.has_application_form,
            questions: listing.questions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing<D> {
    pub title: String,
    pub description: String,
    /// Draft when omitted.
    #[serde(default)]
    pub status: Option<ListingStatus>,
    pub details: D,
    #[serde(default)]
    pub has_application_form: bool,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

impl<D: ListingDetails> NewListing<D> {
    pub fn initial_status(&self) -> ListingStatus {
        self.status.unwrap_or(ListingStatus::Draft)
    }

    pub fn into_fields(self) -> Result<ListingFields, serde_json::Error> {
        Ok(ListingFields {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.details.category(),
            details: serde_json::to_value(&self.details)?,
            has_application_form: self.has_application_form,
            questions: self.questions.into_iter().map(Question::from).collect(),
        })
    }
}

impl<D: ListingDetails> Validate for NewListing<D> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "title", &self.title, 200);
        check_text(&mut errors, "description", &self.description, 20_000);
        if self.status == Some(ListingStatus::Archive) {
            errors.add(
                "status",
                ValidationError::new("status")
                    .with_message("new listings start as draft or live".into()),
            );
        }
        check_form(&mut errors, self.has_application_form, &self.questions);
        errors.merge_self("details", self.details.validate());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListingPatch<D> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub details: Option<D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_application_form: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionInput>>,
}

impl<D> Default for ListingPatch<D> {
    fn default() -> Self {
        ListingPatch {
            title: None,
            description: None,
            details: None,
            has_application_form: None,
            questions: None,
        }
    }
}

impl<D: ListingDetails> ListingPatch<D> {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.details.is_none()
            && self.has_application_form.is_none()
            && self.questions.is_none()
    }

    /// Overlays the patch on the stored fields.
    pub fn apply(self, mut fields: ListingFields) -> Result<ListingFields, serde_json::Error> {
        if let Some(title) = self.title {
            fields.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            fields.description = description.trim().to_string();
        }
        if let Some(details) = self.details {
            fields.category = details.category();
            fields.details = serde_json::to_value(&details)?;
        }
        if let Some(has_form) = self.has_application_form {
            fields.has_application_form = has_form;
        }
        if let Some(questions) = self.questions {
            fields.questions = questions.into_iter().map(Question::from).collect();
        }
        Ok(fields)
    }
}

impl<D: ListingDetails> Validate for ListingPatch<D> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.is_empty() {
            errors.add(
                "patch",
                ValidationError::new("empty").with_message("nothing to update".into()),
            );
        }
        if let Some(title) = &self.title {
            check_text(&mut errors, "title", title, 200);
        }
        if let Some(description) = &self.description {
            check_text(&mut errors, "description", description, 20_000);
        }
        if let Some(questions) = &self.questions {
            check_form(
                &mut errors,
                self.has_application_form.unwrap_or(false),
                questions,
            );
        }
        if let Some(details) = &self.details {
            errors.merge_self("details", details.validate());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_text(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(
            field,
            ValidationError::new("required").with_message(format!("{} cannot be empty", field).into()),
        );
    } else if trimmed.chars().count() > max {
        errors.add(
            field,
            ValidationError::new("length")
                .with_message(format!("{} is longer than {} characters", field, max).into()),
        );
    }
}

fn check_form(errors: &mut ValidationErrors, has_form: bool, questions: &[QuestionInput]) {
    if has_form && questions.is_empty() {
        errors.add(
            "questions",
            ValidationError::new("required")
                .with_message("an application form needs at least one question".into()),
        );
    }
    for (idx, question) in questions.iter().enumerate() {
        if let Err(e) = question.validate() {
            for fe in validation::collect(&e) {
                errors.add(
                    "questions",
                    ValidationError::new("question")
                        .with_message(format!("question {}: {}", idx + 1, fe.message).into()),
                );
            }
        }
    }
}

/// The one filter contract for list endpoints; all filtering is done by
/// the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "type")]
    pub category: Option<String>,
}

impl ListQuery {
    pub fn by_status(status: ListingStatus) -> Self {
        ListQuery {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn category_term(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(search) = self.search_term() {
            pairs.push(("search".to_string(), search));
        }
        if let Some(category) = self.category_term() {
            pairs.push(("type".to_string(), category));
        }
        pairs
    }

    pub fn matches(&self, listing: &Listing<Value>) -> bool {
        if let Some(status) = self.status {
            if listing.status != status {
                return false;
            }
        }
        if let Some(term) = self.search_term() {
            let hit = listing.title.to_lowercase().contains(&term)
                || listing.description.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(category) = self.category_term() {
            let listed = listing.category.as_deref().map(str::to_lowercase);
            if listed.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ListingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange<D = Value> {
    pub listing: Listing<D>,
    pub previous_status: ListingStatus,
}
