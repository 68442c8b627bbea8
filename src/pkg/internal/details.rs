//! Kind-specific fields carried in a listing's `details`.

use std::fmt::Debug;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{listing::ListingKind, validation::non_blank};

pub trait ListingDetails:
    Serialize + DeserializeOwned + Validate + Clone + Debug + Send + Sync + 'static
{
    const KIND: ListingKind;

    /// Value matched by the `type` list filter.
    fn category(&self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "salary_range"))]
pub struct JobDetails {
    #[validate(custom(function = "non_blank", message = "department cannot be empty"))]
    pub department: String,
    #[validate(custom(function = "non_blank", message = "location cannot be empty"))]
    pub location: String,
    pub employment_type: EmploymentType,
    #[validate(range(min = 0.0, message = "salary cannot be negative"))]
    pub salary_min: Option<f64>,
    #[validate(range(min = 0.0, message = "salary cannot be negative"))]
    pub salary_max: Option<f64>,
    pub deadline: NaiveDate,
}

fn salary_range(job: &JobDetails) -> Result<(), ValidationError> {
    match (job.salary_min, job.salary_max) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("salary_range")
            .with_message("minimum salary cannot exceed maximum salary".into())),
        _ => Ok(()),
    }
}

impl ListingDetails for JobDetails {
    const KIND: ListingKind = ListingKind::Job;

    fn category(&self) -> Option<String> {
        serde_json::to_value(self.employment_type)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyLevel {
    Undergraduate,
    Postgraduate,
    Doctoral,
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScholarshipDetails {
    #[validate(custom(function = "non_blank", message = "provider cannot be empty"))]
    pub provider: String,
    #[validate(range(exclusive_min = 0.0, message = "amount must be greater than zero"))]
    pub amount: f64,
    #[validate(custom(function = "currency_code", message = "currency must be a 3 letter code"))]
    pub currency: String,
    pub level: StudyLevel,
    pub deadline: NaiveDate,
}

fn currency_code(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new("currency"))
    }
}

impl ListingDetails for ScholarshipDetails {
    const KIND: ListingKind = ListingKind::Scholarship;

    fn category(&self) -> Option<String> {
        serde_json::to_value(self.level)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResearchNewsDetails {
    #[validate(custom(function = "non_blank", message = "field cannot be empty"))]
    pub field: String,
    #[validate(custom(function = "non_blank", message = "summary cannot be empty"))]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ListingDetails for ResearchNewsDetails {
    const KIND: ListingKind = ListingKind::ResearchNews;

    fn category(&self) -> Option<String> {
        Some(self.field.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityType {
    Internship,
    Fellowship,
    Competition,
    Exchange,
    Volunteering,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityDetails {
    pub opportunity_type: OpportunityType,
    #[validate(custom(function = "non_blank", message = "location cannot be empty"))]
    pub location: String,
    pub deadline: NaiveDate,
}

impl ListingDetails for OpportunityDetails {
    const KIND: ListingKind = ListingKind::Opportunity;

    fn category(&self) -> Option<String> {
        serde_json::to_value(self.opportunity_type)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
    }
}
