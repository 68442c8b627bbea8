//! Headless model of the application form a student fills in.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::pkg::{
    client::{api::ClientError, applications::ApplicationClient},
    internal::{
        adaptors::applications::spec::Application,
        auth::{Role, Session},
        listing::{Listing, ListingKind},
        questions::{
            decode_choices, encode_choices, validate_answers, AnswerErrors, Answers, Question,
            QuestionType,
        },
        validation::FieldError,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum Widget {
    Input { input_type: &'static str },
    TextArea,
    RadioGroup { options: Vec<String> },
    CheckboxGroup { options: Vec<String> },
    Dropdown { options: Vec<String> },
    FilePicker,
}

impl Widget {
    pub fn for_question(question: &Question) -> Widget {
        let input = |input_type| Widget::Input { input_type };
        match question.question_type {
            QuestionType::Text => input("text"),
            QuestionType::Email => input("email"),
            QuestionType::Number => input("number"),
            QuestionType::Phone => input("tel"),
            QuestionType::Date => input("date"),
            QuestionType::Time => input("time"),
            QuestionType::Url => input("url"),
            QuestionType::Textarea => Widget::TextArea,
            QuestionType::Radio => Widget::RadioGroup {
                options: question.options.clone(),
            },
            QuestionType::Checkbox => Widget::CheckboxGroup {
                options: question.options.clone(),
            },
            QuestionType::Dropdown => Widget::Dropdown {
                options: question.options.clone(),
            },
            QuestionType::File => Widget::FilePicker,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub question: Question,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAccess {
    Open(ApplicationForm),
    /// Message shown in place of the form.
    Blocked(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationForm {
    kind: ListingKind,
    listing_id: Uuid,
    fields: Vec<Field>,
    answers: Answers,
    // checkbox picks in selection order
    picks: BTreeMap<Uuid, Vec<String>>,
}

impl ApplicationForm {
    pub fn open<D>(listing: &Listing<D>, session: Option<&Session>) -> FormAccess {
        let Some(session) = session else {
            return FormAccess::Blocked("Sign in with a student account to apply.");
        };
        if session.role != Role::Student {
            return FormAccess::Blocked("Only students can apply to listings.");
        }
        if !listing.has_application_form || listing.questions.is_empty() {
            return FormAccess::Blocked("This listing does not take applications here.");
        }
        FormAccess::Open(ApplicationForm {
            kind: listing.kind,
            listing_id: listing.id,
            fields: listing
                .questions
                .iter()
                .map(|q| Field {
                    widget: Widget::for_question(q),
                    question: q.clone(),
                })
                .collect(),
            answers: Answers::new(),
            picks: BTreeMap::new(),
        })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answer(&self, question_id: Uuid) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    fn question(&self, question_id: Uuid) -> Option<&Question> {
        self.fields
            .iter()
            .map(|f| &f.question)
            .find(|q| q.id == question_id)
    }

    /// Seeds the form with answers saved earlier, e.g. when an application
    /// is viewed again.
    pub fn with_answers(mut self, answers: &Answers) -> Self {
        for (id, answer) in answers {
            self.set_answer(*id, answer.as_str());
        }
        self
    }

    /// Sets a whole answer. Checkbox answers are taken in their encoded
    /// form and become the current picks. Unknown ids are ignored.
    pub fn set_answer(&mut self, question_id: Uuid, value: impl Into<String>) {
        let Some(question) = self.question(question_id) else {
            return;
        };
        let value = value.into();
        if question.question_type == QuestionType::Checkbox {
            let picks = decode_choices(&value);
            self.answers.insert(question_id, encode_choices(picks.as_slice()));
            self.picks.insert(question_id, picks);
        } else {
            self.answers.insert(question_id, value);
        }
    }

    /// Flips one checkbox option; the stored answer lists picks in the
    /// order they were made.
    pub fn toggle_checkbox(&mut self, question_id: Uuid, option: &str) {
        let Some(question) = self.question(question_id) else {
            return;
        };
        if question.question_type != QuestionType::Checkbox
            || !question.options.iter().any(|o| o == option)
        {
            return;
        }
        let picks = self.picks.entry(question_id).or_default();
        match picks.iter().position(|p| p == option) {
            Some(idx) => {
                picks.remove(idx);
            }
            None => picks.push(option.to_string()),
        }
        self.answers.insert(question_id, encode_choices(picks.as_slice()));
    }

    pub fn selected_options(&self, question_id: Uuid) -> Vec<String> {
        self.picks.get(&question_id).cloned().unwrap_or_default()
    }

    /// Records the reference handed back by the upload widget. The form
    /// never carries file bytes.
    pub fn attach_file(&mut self, question_id: Uuid, reference: impl Into<String>) {
        if self
            .question(question_id)
            .is_some_and(|q| q.question_type == QuestionType::File)
        {
            self.answers.insert(question_id, reference.into());
        }
    }

    pub fn validate(&self) -> Result<(), AnswerErrors> {
        let questions: Vec<Question> = self.fields.iter().map(|f| f.question.clone()).collect();
        validate_answers(&questions, &self.answers)
    }

    /// Sends every answer in one request. Nothing is sent while a required
    /// answer is missing or malformed.
    pub async fn submit(&self, client: &ApplicationClient) -> Result<Application, ClientError> {
        if let Err(errors) = self.validate() {
            let field_errors = errors
                .messages()
                .into_iter()
                .map(|message| FieldError {
                    field: "answers".to_string(),
                    message,
                })
                .collect();
            return Err(ClientError::Validation(field_errors));
        }
        let answers: Answers = self
            .answers
            .iter()
            .filter(|(_, answer)| !answer.trim().is_empty())
            .map(|(id, answer)| (*id, answer.clone()))
            .collect();
        client.submit(self.kind, self.listing_id, answers).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::pkg::{
        client::testing::World,
        internal::{
            auth::tests::session_for,
            details::{ScholarshipDetails, StudyLevel},
            lifecycle::ListingStatus,
            listing::NewListing,
            questions::QuestionInput,
        },
    };

    fn scholarship() -> NewListing<ScholarshipDetails> {
        let question = |label: &str, question_type, required, options: &[&str]| QuestionInput {
            id: None,
            label: label.into(),
            question_type,
            required,
            options: options.iter().map(|o| o.to_string()).collect(),
        };
        NewListing {
            title: "Women in STEM scholarship".into(),
            description: "Covers tuition for one year".into(),
            status: Some(ListingStatus::Live),
            details: ScholarshipDetails {
                provider: "Alumni fund".into(),
                amount: 8000.0,
                currency: "EUR".into(),
                level: StudyLevel::Undergraduate,
                deadline: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            },
            has_application_form: true,
            questions: vec![
                question("Essay", QuestionType::Textarea, true, &[]),
                question("Interests", QuestionType::Checkbox, false, &["A", "B", "C"]),
                question("Transcript", QuestionType::File, false, &[]),
                question("Email", QuestionType::Email, false, &[]),
            ],
        }
    }

    fn question_id(form: &ApplicationForm, label: &str) -> Uuid {
        form.fields()
            .iter()
            .find(|f| f.question.label == label)
            .map(|f| f.question.id)
            .unwrap()
    }

    fn open(listing: &Listing<ScholarshipDetails>, session: Option<&Session>) -> ApplicationForm {
        match ApplicationForm::open(listing, session) {
            FormAccess::Open(form) => form,
            FormAccess::Blocked(reason) => panic!("form blocked: {reason}"),
        }
    }

    #[tokio::test]
    async fn missing_essay_blocks_submission() {
        let world = World::new();
        let uni = world.client("uni", Role::University).await;
        let listing = uni
            .listings::<ScholarshipDetails>()
            .create(&scholarship())
            .await
            .unwrap();

        let student = world.client("stu", Role::Student).await;
        let mut form = open(&listing, student.api.session());
        let interests = question_id(&form, "Interests");
        form.toggle_checkbox(interests, "B");

        let before = world.calls();
        let err = form.submit(&student.applications()).await.unwrap_err();
        assert_eq!(err.messages(), vec!["Essay is required"]);
        assert_eq!(world.calls(), before);

        form.set_answer(question_id(&form, "Essay"), "I want to build satellites.");
        let application = form.submit(&student.applications()).await.unwrap();
        assert_eq!(application.applicant_id, "stu");
        assert_eq!(world.calls(), before + 1);
        assert!(world.log.messages().contains(&"Application submitted".to_string()));
    }

    #[tokio::test]
    async fn checkbox_answers_round_trip() {
        let world = World::new();
        let uni = world.client("uni", Role::University).await;
        let listing = uni
            .listings::<ScholarshipDetails>()
            .create(&scholarship())
            .await
            .unwrap();
        let student = world.client("stu", Role::Student).await;
        let mut form = open(&listing, student.api.session());
        let essay = question_id(&form, "Essay");
        let interests = question_id(&form, "Interests");
        let transcript = question_id(&form, "Transcript");

        form.set_answer(essay, "Essay text");
        form.toggle_checkbox(interests, "A");
        form.toggle_checkbox(interests, "B");
        form.toggle_checkbox(interests, "C");
        form.toggle_checkbox(interests, "B");
        form.toggle_checkbox(interests, "Z");
        assert_eq!(form.selected_options(interests), vec!["A", "C"]);
        assert_eq!(form.answer(interests), Some("A,C"));
        form.attach_file(transcript, "uploads/stu/transcript.pdf");
        form.attach_file(essay, "ignored.pdf");
        assert_eq!(form.answer(essay), Some("Essay text"));

        form.submit(&student.applications()).await.unwrap();

        let received = uni
            .applications()
            .list(listing.kind, listing.id)
            .await
            .unwrap();
        assert_eq!(received.len(), 1);
        let stored = &received[0].answers;
        assert_eq!(stored[&interests], "A,C");
        assert_eq!(decode_choices(&stored[&interests]), vec!["A", "C"]);
        assert_eq!(stored[&transcript], "uploads/stu/transcript.pdf");

        let err = form.submit(&student.applications()).await.unwrap_err();
        assert_eq!(err.status(), Some(409));

        let mut reopened = open(&listing, student.api.session()).with_answers(stored);
        assert_eq!(reopened.selected_options(interests), vec!["A", "C"]);
        assert_eq!(reopened.answer(transcript), Some("uploads/stu/transcript.pdf"));
        reopened.toggle_checkbox(interests, "B");
        assert_eq!(reopened.answer(interests), Some("A,C,B"));
        reopened.toggle_checkbox(interests, "A");
        assert_eq!(reopened.selected_options(interests), vec!["C", "B"]);
    }

    #[test]
    fn typed_checkbox_answers_become_picks() {
        let listing = Listing {
            id: Uuid::new_v4(),
            kind: ListingKind::Scholarship,
            owner_id: "uni".into(),
            title: "Grant".into(),
            description: "Tuition".into(),
            status: ListingStatus::Live,
            category: None,
            details: serde_json::Value::Null,
            has_application_form: true,
            questions: vec![Question {
                id: Uuid::new_v4(),
                label: "Interests".into(),
                question_type: QuestionType::Checkbox,
                required: true,
                options: vec!["A".into(), "B".into(), "C".into()],
            }],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let student = session_for("stu", Role::Student);
        let mut form = match ApplicationForm::open(&listing, Some(&student)) {
            FormAccess::Open(form) => form,
            FormAccess::Blocked(reason) => panic!("form blocked: {reason}"),
        };
        let interests = listing.questions[0].id;

        form.set_answer(interests, " A , C ");
        assert_eq!(form.selected_options(interests), vec!["A", "C"]);
        assert_eq!(form.answer(interests), Some("A,C"));
        form.toggle_checkbox(interests, "B");
        assert_eq!(form.answer(interests), Some("A,C,B"));
    }

    #[test]
    fn widgets_follow_question_types() {
        let listing = Listing {
            id: Uuid::new_v4(),
            kind: ListingKind::Opportunity,
            owner_id: "org".into(),
            title: "Hackathon".into(),
            description: "48 hours".into(),
            status: ListingStatus::Live,
            category: None,
            details: serde_json::json!({}),
            has_application_form: true,
            questions: vec![
                Question {
                    id: Uuid::new_v4(),
                    label: "Phone".into(),
                    question_type: QuestionType::Phone,
                    required: true,
                    options: vec![],
                },
                Question {
                    id: Uuid::new_v4(),
                    label: "Track".into(),
                    question_type: QuestionType::Dropdown,
                    required: true,
                    options: vec!["AI".into(), "Bio".into()],
                },
            ],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let student = session_for("stu", Role::Student);
        let FormAccess::Open(form) = ApplicationForm::open(&listing, Some(&student)) else {
            panic!("form should open");
        };
        let widgets: Vec<&Widget> = form.fields().iter().map(|f| &f.widget).collect();
        assert_eq!(
            widgets,
            vec![
                &Widget::Input { input_type: "tel" },
                &Widget::Dropdown {
                    options: vec!["AI".into(), "Bio".into()]
                },
            ]
        );

        assert!(matches!(ApplicationForm::open(&listing, None), FormAccess::Blocked(_)));
        let mentor = session_for("m", Role::Mentor);
        assert_eq!(
            ApplicationForm::open(&listing, Some(&mentor)),
            FormAccess::Blocked("Only students can apply to listings.")
        );
    }
}
