//! Persistence seams used by the HTTP handlers. `PgStore` backs a real
//! deployment, `MemoryStore` backs tests and `STORAGE_BACKEND=memory`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
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
    },
    prelude::Result,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn create_listing(
        &self,
        kind: ListingKind,
        owner_id: &str,
        status: ListingStatus,
        fields: ListingFields,
    ) -> Result<Listing>;

    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> Result<Option<Listing>>;

    /// Newest first. `owner_id` narrows the result to one author's records.
    async fn list_listings(
        &self,
        kind: ListingKind,
        owner_id: Option<&str>,
        query: &ListQuery,
    ) -> Result<Vec<Listing>>;

    async fn update_listing(
        &self,
        kind: ListingKind,
        id: Uuid,
        fields: ListingFields,
    ) -> Result<Option<Listing>>;

    /// Moves the listing from `from` to `to`. `None` when the listing is
    /// gone or no longer in `from`.
    async fn update_status(
        &self,
        kind: ListingKind,
        id: Uuid,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<Option<Listing>>;

    /// Removes the listing together with its applications and comments.
    async fn delete_listing(&self, kind: ListingKind, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// `None` when the applicant already applied to this listing.
    async fn create_application(
        &self,
        listing_id: Uuid,
        applicant_id: &str,
        answers: &Answers,
    ) -> Result<Option<Application>>;

    async fn list_applications(&self, listing_id: Uuid) -> Result<Vec<Application>>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, listing_id: Uuid, author_id: &str, body: &str)
        -> Result<Comment>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn list_comments(&self, listing_id: Uuid) -> Result<Vec<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, kind: ProfileKind, owner_id: &str) -> Result<Option<Profile>>;
    async fn upsert_profile(
        &self,
        kind: ProfileKind,
        owner_id: &str,
        input: &ProfileInput,
    ) -> Result<Profile>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<Session>;
    /// Only unexpired sessions resolve.
    async fn resolve_session(&self, token: Uuid) -> Result<Option<Session>>;
    async fn revoke_session(&self, token: Uuid) -> Result<bool>;
}

pub trait Store: ListingStore + ApplicationStore + CommentStore + ProfileStore + SessionStore {}

impl<T> Store for T where
    T: ListingStore + ApplicationStore + CommentStore + ProfileStore + SessionStore
{
}
