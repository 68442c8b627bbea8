use std::sync::Arc;

use validator::Validate;

use crate::pkg::{
    client::{
        api::{ApiClient, ClientError},
        cache::{QueryCache, QueryKey, Scope},
        notify::Notifier,
    },
    internal::{
        adaptors::profiles::spec::{Profile, ProfileInput, ProfileKind},
        validation::{self, FieldError},
    },
};

const ENTITY: &str = "profiles";

pub struct ProfileClient {
    api: ApiClient,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl ProfileClient {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        ProfileClient {
            api,
            cache,
            notifier,
        }
    }

    fn path(kind: ProfileKind) -> String {
        format!("/profiles/{}", kind.segment())
    }

    pub async fn get(&self, kind: ProfileKind) -> Result<Option<Profile>, ClientError> {
        let path = Self::path(kind);
        self.cache
            .fetch(QueryKey::new(ENTITY, Scope::Named(kind.segment())), || {
                self.api.get(&path, vec![])
            })
            .await
    }

    pub async fn save(&self, kind: ProfileKind, input: &ProfileInput) -> Result<Profile, ClientError> {
        match self.api.put(&Self::path(kind), input).await {
            Ok(profile) => {
                self.notifier.success("Profile saved".to_string());
                self.cache
                    .invalidate(&QueryKey::new(ENTITY, Scope::Named(kind.segment())))
                    .await;
                Ok(profile)
            }
            Err(err) => {
                for message in err.messages() {
                    self.notifier.error(message);
                }
                Err(err)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Empty,
    SavedReadOnly,
    Editing,
}

/// Organization profile editor: read-only once saved until the user
/// explicitly asks to edit again.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileForm {
    kind: ProfileKind,
    state: FormState,
    draft: ProfileInput,
    saved: Option<Profile>,
}

impl ProfileForm {
    pub fn new(kind: ProfileKind) -> Self {
        ProfileForm {
            kind,
            state: FormState::Empty,
            draft: ProfileInput::default(),
            saved: None,
        }
    }

    pub async fn load(kind: ProfileKind, client: &ProfileClient) -> Result<Self, ClientError> {
        let mut form = ProfileForm::new(kind);
        form.hydrate(client.get(kind).await?);
        Ok(form)
    }

    pub fn hydrate(&mut self, profile: Option<Profile>) {
        match profile {
            Some(profile) => {
                self.draft = ProfileInput::from(&profile);
                self.saved = Some(profile);
                self.state = FormState::SavedReadOnly;
            }
            None => {
                self.draft = ProfileInput::default();
                self.saved = None;
                self.state = FormState::Empty;
            }
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn saved(&self) -> Option<&Profile> {
        self.saved.as_ref()
    }

    pub fn draft(&self) -> &ProfileInput {
        &self.draft
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.state, FormState::Empty | FormState::Editing)
    }

    /// Mutable access to the fields, only while they are editable.
    pub fn draft_mut(&mut self) -> Option<&mut ProfileInput> {
        if self.is_editable() {
            Some(&mut self.draft)
        } else {
            None
        }
    }

    pub fn edit_click(&mut self) {
        if self.state == FormState::SavedReadOnly {
            self.state = FormState::Editing;
        }
    }

    pub async fn save(&mut self, client: &ProfileClient) -> Result<&Profile, ClientError> {
        if !self.is_editable() {
            return Err(ClientError::Validation(vec![FieldError {
                field: "profile".to_string(),
                message: "click edit before changing a saved profile".to_string(),
            }]));
        }
        if let Err(errors) = self.draft.validate() {
            return Err(ClientError::Validation(validation::collect(&errors)));
        }
        let profile = client.save(self.kind, &self.draft).await?;
        self.draft = ProfileInput::from(&profile);
        self.state = FormState::SavedReadOnly;
        Ok(self.saved.insert(profile))
    }
}
