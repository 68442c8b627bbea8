use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    pkg::internal::{
        adaptors::{
            applications::spec::Application,
            comments::spec::Comment,
            profiles::spec::{Profile, ProfileInput, ProfileKind},
        },
        auth::Session,
        lifecycle::ListingStatus,
        listing::{ListQuery, Listing, ListingFields, ListingKind},
        questions::Answers,
        store::{ApplicationStore, CommentStore, ListingStore, ProfileStore, SessionStore},
    },
    prelude::Result,
};

#[derive(Debug, Default)]
struct Tables {
    // insertion order doubles as creation order
    listings: Vec<Listing>,
    applications: Vec<Application>,
    comments: Vec<Comment>,
    profiles: HashMap<(ProfileKind, String), Profile>,
    sessions: HashMap<Uuid, Session>,
}

/// Process-local store with the same observable behavior as `PgStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn create_listing(
        &self,
        kind: ListingKind,
        owner_id: &str,
        status: ListingStatus,
        fields: ListingFields,
    ) -> Result<Listing> {
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            kind,
            owner_id: owner_id.to_string(),
            title: fields.title,
            description: fields.description,
            status,
            category: fields.category,
            details: fields.details,
            has_application_form: fields.has_application_form,
            questions: fields.questions,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.listings.push(listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> Result<Option<Listing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .listings
            .iter()
            .find(|l| l.kind == kind && l.id == id)
            .cloned())
    }

    async fn list_listings(
        &self,
        kind: ListingKind,
        owner_id: Option<&str>,
        query: &ListQuery,
    ) -> Result<Vec<Listing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .listings
            .iter()
            .rev()
            .filter(|l| l.kind == kind)
            .filter(|l| owner_id.map_or(true, |owner| l.owner_id == owner))
            .filter(|l| query.matches(l))
            .cloned()
            .collect())
    }

    async fn update_listing(
        &self,
        kind: ListingKind,
        id: Uuid,
        fields: ListingFields,
    ) -> Result<Option<Listing>> {
        let mut tables = self.tables.write().await;
        let Some(listing) = tables
            .listings
            .iter_mut()
            .find(|l| l.kind == kind && l.id == id)
        else {
            return Ok(None);
        };
        listing.title = fields.title;
        listing.description = fields.description;
        listing.category = fields.category;
        listing.details = fields.details;
        listing.has_application_form = fields.has_application_form;
        listing.questions = fields.questions;
        listing.updated_at = Utc::now();
        Ok(Some(listing.clone()))
    }

    async fn update_status(
        &self,
        kind: ListingKind,
        id: Uuid,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<Option<Listing>> {
        let mut tables = self.tables.write().await;
        let Some(listing) = tables
            .listings
            .iter_mut()
            .find(|l| l.kind == kind && l.id == id && l.status == from)
        else {
            return Ok(None);
        };
        listing.status = to;
        listing.updated_at = Utc::now();
        Ok(Some(listing.clone()))
    }

    async fn delete_listing(&self, kind: ListingKind, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.listings.len();
        tables.listings.retain(|l| !(l.kind == kind && l.id == id));
        if tables.listings.len() == before {
            return Ok(false);
        }
        tables.applications.retain(|a| a.listing_id != id);
        tables.comments.retain(|c| c.listing_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn create_application(
        &self,
        listing_id: Uuid,
        applicant_id: &str,
        answers: &Answers,
    ) -> Result<Option<Application>> {
        let mut tables = self.tables.write().await;
        if tables
            .applications
            .iter()
            .any(|a| a.listing_id == listing_id && a.applicant_id == applicant_id)
        {
            return Ok(None);
        }
        let application = Application {
            id: Uuid::new_v4(),
            listing_id,
            applicant_id: applicant_id.to_string(),
            answers: answers.clone(),
            created_at: Utc::now(),
        };
        tables.applications.push(application.clone());
        Ok(Some(application))
    }

    async fn list_applications(&self, listing_id: Uuid) -> Result<Vec<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .rev()
            .filter(|a| a.listing_id == listing_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(
        &self,
        listing_id: Uuid,
        author_id: &str,
        body: &str,
    ) -> Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            listing_id,
            author_id: author_id.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        self.tables.write().await.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, listing_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, kind: ProfileKind, owner_id: &str) -> Result<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(&(kind, owner_id.to_string())).cloned())
    }

    async fn upsert_profile(
        &self,
        kind: ProfileKind,
        owner_id: &str,
        input: &ProfileInput,
    ) -> Result<Profile> {
        let profile = Profile {
            kind,
            owner_id: owner_id.to_string(),
            name: input.name.trim().to_string(),
            website: input.website.clone(),
            location: input.location.trim().to_string(),
            description: input.description.trim().to_string(),
            contact_email: input.contact_email.trim().to_string(),
            updated_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .profiles
            .insert((kind, owner_id.to_string()), profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: &Session) -> Result<Session> {
        self.tables
            .write()
            .await
            .sessions
            .insert(session.token, session.clone());
        Ok(session.clone())
    }

    async fn resolve_session(&self, token: Uuid) -> Result<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .get(&token)
            .filter(|s| !s.is_expired(Utc::now()))
            .cloned())
    }

    async fn revoke_session(&self, token: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.sessions.remove(&token).is_some())
    }
}
