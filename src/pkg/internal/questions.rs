use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidateUrl, ValidationError};

use super::validation::non_blank;

/// Flat answer map submitted for an application, `question id → answer`.
pub type Answers = BTreeMap<Uuid, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Textarea,
    Email,
    Number,
    Phone,
    Date,
    Time,
    Url,
    Radio,
    Checkbox,
    #[serde(alias = "select")]
    Dropdown,
    File,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Textarea => "textarea",
            QuestionType::Email => "email",
            QuestionType::Number => "number",
            QuestionType::Phone => "phone",
            QuestionType::Date => "date",
            QuestionType::Time => "time",
            QuestionType::Url => "url",
            QuestionType::Radio => "radio",
            QuestionType::Checkbox => "checkbox",
            QuestionType::Dropdown => "dropdown",
            QuestionType::File => "file",
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionType::Radio | QuestionType::Checkbox | QuestionType::Dropdown
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub label: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Question definition as authored; `id` is kept when editing an existing
/// question so earlier answers stay attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "choice_options"))]
pub struct QuestionInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(custom(function = "non_blank", message = "question label cannot be empty"))]
    pub label: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

fn choice_options(input: &QuestionInput) -> Result<(), ValidationError> {
    if input.question_type.has_options() {
        let cleaned: Vec<&str> = input
            .options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();
        if cleaned.is_empty() {
            return Err(ValidationError::new("options").with_message(
                format!("question `{}` needs at least one option", input.label).into(),
            ));
        }
        if cleaned.iter().any(|o| o.contains(',')) {
            return Err(ValidationError::new("options").with_message(
                format!("options of `{}` cannot contain commas", input.label).into(),
            ));
        }
    }
    Ok(())
}

impl From<QuestionInput> for Question {
    fn from(input: QuestionInput) -> Self {
        Question {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            label: input.label.trim().to_string(),
            question_type: input.question_type,
            required: input.required,
            options: input
                .options
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }
}

impl From<&Question> for QuestionInput {
    fn from(question: &Question) -> Self {
        QuestionInput {
            id: Some(question.id),
            label: question.label.clone(),
            question_type: question.question_type,
            required: question.required,
            options: question.options.clone(),
        }
    }
}

/// Checkbox selections travel as one comma-joined string, in the order
/// they were picked.
pub fn encode_choices<S: AsRef<str>>(choices: &[S]) -> String {
    choices
        .iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn decode_choices(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerErrors {
    /// Labels of required questions left blank.
    pub missing: Vec<String>,
    pub invalid: Vec<String>,
}

impl AnswerErrors {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.missing
            .iter()
            .map(|label| format!("{} is required", label))
            .chain(self.invalid.iter().cloned())
            .collect()
    }
}

impl fmt::Display for AnswerErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for AnswerErrors {}

pub fn validate_answers(questions: &[Question], answers: &Answers) -> Result<(), AnswerErrors> {
    let mut errors = AnswerErrors::default();
    let known: BTreeSet<Uuid> = questions.iter().map(|q| q.id).collect();
    for question in questions {
        let answer = answers.get(&question.id).map(|a| a.trim()).unwrap_or("");
        if answer.is_empty() {
            if question.required {
                errors.missing.push(question.label.clone());
            }
            continue;
        }
        if let Some(problem) = check_format(question, answer) {
            errors.invalid.push(problem);
        }
    }
    let unknown = answers.keys().filter(|id| !known.contains(id)).count();
    if unknown > 0 {
        errors
            .invalid
            .push(format!("{} answer(s) refer to unknown questions", unknown));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_format(question: &Question, answer: &str) -> Option<String> {
    let label = &question.label;
    let ok = match question.question_type {
        QuestionType::Text | QuestionType::Textarea | QuestionType::File => true,
        QuestionType::Email => answer.validate_email(),
        QuestionType::Url => answer.validate_url(),
        QuestionType::Number => answer.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false),
        QuestionType::Phone => {
            let digits = answer.chars().filter(|c| c.is_ascii_digit()).count();
            digits >= 7
                && answer
                    .chars()
                    .all(|c| c.is_ascii_digit() || " +-().".contains(c))
        }
        QuestionType::Date => NaiveDate::parse_from_str(answer, "%Y-%m-%d").is_ok(),
        QuestionType::Time => {
            NaiveTime::parse_from_str(answer, "%H:%M").is_ok()
                || NaiveTime::parse_from_str(answer, "%H:%M:%S").is_ok()
        }
        QuestionType::Radio | QuestionType::Dropdown => {
            question.options.iter().any(|o| o == answer)
        }
        QuestionType::Checkbox => {
            let picked = decode_choices(answer);
            !picked.is_empty() && picked.iter().all(|p| question.options.contains(p))
        }
    };
    if ok {
        None
    } else {
        Some(format!(
            "{} has an invalid {} answer",
            label,
            question.question_type.as_str()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(label: &str, question_type: QuestionType, required: bool, options: &[&str]) -> Question {
        Question {
            id: Uuid::new_v4(),
            label: label.into(),
            question_type,
            required,
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn missing_required_answers_are_all_named() {
        let essay = question("Essay", QuestionType::Textarea, true, &[]);
        let gpa = question("GPA", QuestionType::Number, true, &[]);
        let notes = question("Notes", QuestionType::Text, false, &[]);
        let mut answers = Answers::new();
        answers.insert(essay.id, "   ".into());

        let err = validate_answers(&[essay, gpa, notes], &answers).unwrap_err();
        assert_eq!(err.missing, vec!["Essay".to_string(), "GPA".to_string()]);
        assert!(err.invalid.is_empty());
        assert_eq!(err.messages(), vec!["Essay is required", "GPA is required"]);
    }

    #[test]
    fn formats_are_checked() {
        let email = question("Email", QuestionType::Email, true, &[]);
        let age = question("Age", QuestionType::Number, false, &[]);
        let start = question("Start", QuestionType::Date, false, &[]);
        let track = question("Track", QuestionType::Radio, false, &["AI", "Bio"]);
        let mut answers = Answers::new();
        answers.insert(email.id, "not-an-email".into());
        answers.insert(age.id, "twelve".into());
        answers.insert(start.id, "2026-02-30".into());
        answers.insert(track.id, "Physics".into());

        let err = validate_answers(&[email, age, start, track], &answers).unwrap_err();
        assert!(err.missing.is_empty());
        assert_eq!(
            err.invalid,
            vec![
                "Email has an invalid email answer",
                "Age has an invalid number answer",
                "Start has an invalid date answer",
                "Track has an invalid radio answer",
            ]
        );
    }

    #[test]
    fn valid_answers_pass() {
        let email = question("Email", QuestionType::Email, true, &[]);
        let topics = question("Topics", QuestionType::Checkbox, true, &["A", "B", "C"]);
        let phone = question("Phone", QuestionType::Phone, false, &[]);
        let site = question("Site", QuestionType::Url, false, &[]);
        let slot = question("Slot", QuestionType::Time, false, &[]);
        let mut answers = Answers::new();
        answers.insert(email.id, "ada@example.edu".into());
        answers.insert(topics.id, "C,A".into());
        answers.insert(phone.id, "+1 (555) 010-2030".into());
        answers.insert(site.id, "https://example.edu/ada".into());
        answers.insert(slot.id, "09:30".into());

        assert_eq!(validate_answers(&[email, topics, phone, site, slot], &answers), Ok(()));
    }

    #[test]
    fn unknown_questions_are_rejected() {
        let essay = question("Essay", QuestionType::Textarea, false, &[]);
        let mut answers = Answers::new();
        answers.insert(Uuid::new_v4(), "stray".into());
        let err = validate_answers(&[essay], &answers).unwrap_err();
        assert_eq!(err.invalid, vec!["1 answer(s) refer to unknown questions"]);
    }

    #[test]
    fn checkbox_encoding_keeps_selection_order() {
        assert_eq!(encode_choices(&["A", "C"]), "A,C");
        assert_eq!(encode_choices(&["C", "A"]), "C,A");
        assert_eq!(decode_choices("A,C"), vec!["A", "C"]);
        assert_eq!(decode_choices(" A , ,C,"), vec!["A", "C"]);
        assert!(decode_choices("").is_empty());
    }

    #[test]
    fn choice_questions_need_options() {
        let input = QuestionInput {
            id: None,
            label: "Track".into(),
            question_type: QuestionType::Dropdown,
            required: true,
            options: vec![" ".into()],
        };
        assert!(input.validate().is_err());

        let input = QuestionInput {
            options: vec!["AI".into(), " Bio ".into()],
            ..input
        };
        assert!(input.validate().is_ok());
        assert!(QuestionInput {
            label: "   ".into(),
            ..input.clone()
        }
        .validate()
        .is_err());
        let question = Question::from(input);
        assert_eq!(question.options, vec!["AI", "Bio"]);
    }

    #[test]
    fn select_is_an_alias_for_dropdown() {
        let parsed: QuestionType = serde_json::from_str("\"select\"").unwrap();
        assert_eq!(parsed, QuestionType::Dropdown);
    }
}
