use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    conf::Settings,
    pkg::internal::{
        adaptors::{
            applications::{
                mutators::ApplicationMutator, selectors::ApplicationSelector, spec::Application,
            },
            comments::{mutators::CommentMutator, selectors::CommentSelector, spec::Comment},
            listings::{mutators::ListingMutator, selectors::ListingSelector},
            profiles::{
                mutators::ProfileMutator,
                selectors::ProfileSelector,
                spec::{Profile, ProfileInput, ProfileKind},
            },
            sessions::{mutators::SessionMutator, selectors::SessionSelector},
        },
        auth::Session,
        lifecycle::ListingStatus,
        listing::{ListQuery, Listing, ListingFields, ListingKind},
        questions::Answers,
        store::{ApplicationStore, CommentStore, ListingStore, ProfileStore, SessionStore},
    },
    prelude::Result,
};

#[async_trait]
pub trait GetTxn {
    async fn begin_txn(&self) -> Result<Transaction<'static, Postgres>>;
}

#[async_trait]
impl GetTxn for Arc<PgPool> {
    async fn begin_txn(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.begin().await?)
    }
}

pub fn db_pool(conf: &Settings) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(conf.database_pool_max_connections)
        .connect_lazy(&conf.database_url)?;
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl ListingStore for PgStore {
    async fn create_listing(
        &self,
        kind: ListingKind,
        owner_id: &str,
        status: ListingStatus,
        fields: ListingFields,
    ) -> Result<Listing> {
        let mut tx = self.pool.begin_txn().await?;
        let row = ListingMutator::new(&mut tx)
            .create(kind, owner_id, status, fields)
            .await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> Result<Option<Listing>> {
        let mut tx = self.pool.begin_txn().await?;
        let row = ListingSelector::new(&mut tx).get_by_id(kind, id).await?;
        Ok(row.map(Listing::from))
    }

    async fn list_listings(
        &self,
        kind: ListingKind,
        owner_id: Option<&str>,
        query: &ListQuery,
    ) -> Result<Vec<Listing>> {
        let mut tx = self.pool.begin_txn().await?;
        let rows = ListingSelector::new(&mut tx)
            .list(kind, owner_id, query)
            .await?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn update_listing(
        &self,
        kind: ListingKind,
        id: Uuid,
        fields: ListingFields,
    ) -> Result<Option<Listing>> {
        let mut tx = self.pool.begin_txn().await?;
        let row = ListingMutator::new(&mut tx)
            .update_fields(kind, id, fields)
            .await?;
        tx.commit().await?;
        Ok(row.map(Listing::from))
    }

    async fn update_status(
        &self,
        kind: ListingKind,
        id: Uuid,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<Option<Listing>> {
        let mut tx = self.pool.begin_txn().await?;
        let row = ListingMutator::new(&mut tx)
            .update_status(kind, id, from, to)
            .await?;
        tx.commit().await?;
        Ok(row.map(Listing::from))
    }

    async fn delete_listing(&self, kind: ListingKind, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin_txn().await?;
        let deleted = ListingMutator::new(&mut tx).delete(kind, id).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn create_application(
        &self,
        listing_id: Uuid,
        applicant_id: &str,
        answers: &Answers,
    ) -> Result<Option<Application>> {
        let mut tx = self.pool.begin_txn().await?;
        let row = ApplicationMutator::new(&mut tx)
            .create(listing_id, applicant_id, answers)
            .await?;
        tx.commit().await?;
        Ok(row.map(Application::from))
    }

    async fn list_applications(&self, listing_id: Uuid) -> Result<Vec<Application>> {
        let mut tx = self.pool.begin_txn().await?;
        let rows = ApplicationSelector::new(&mut tx)
            .get_by_listing(listing_id)
            .await?;
        Ok(rows.into_iter().map(Application::from).collect())
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn create_comment(
        &self,
        listing_id: Uuid,
        author_id: &str,
        body: &str,
    ) -> Result<Comment> {
        let mut tx = self.pool.begin_txn().await?;
        let comment = CommentMutator::new(&mut tx)
            .create(listing_id, author_id, body)
            .await?;
        tx.commit().await?;
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let mut tx = self.pool.begin_txn().await?;
        let comment = CommentSelector::new(&mut tx).get_by_id(id).await?;
        Ok(comment)
    }

    async fn list_comments(&self, listing_id: Uuid) -> Result<Vec<Comment>> {
        let mut tx = self.pool.begin_txn().await?;
        let comments = CommentSelector::new(&mut tx)
            .get_by_listing(listing_id)
            .await?;
        Ok(comments)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin_txn().await?;
        let deleted = CommentMutator::new(&mut tx).delete(id).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, kind: ProfileKind, owner_id: &str) -> Result<Option<Profile>> {
        let mut tx = self.pool.begin_txn().await?;
        let profile = ProfileSelector::new(&mut tx).get(kind, owner_id).await?;
        Ok(profile)
    }

    async fn upsert_profile(
        &self,
        kind: ProfileKind,
        owner_id: &str,
        input: &ProfileInput,
    ) -> Result<Profile> {
        let mut tx = self.pool.begin_txn().await?;
        let profile = ProfileMutator::new(&mut tx)
            .upsert(kind, owner_id, input)
            .await?;
        tx.commit().await?;
        Ok(profile)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(&self, session: &Session) -> Result<Session> {
        let mut tx = self.pool.begin_txn().await?;
        let row = SessionMutator::new(&mut tx).create(session).await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn resolve_session(&self, token: Uuid) -> Result<Option<Session>> {
        let mut tx = self.pool.begin_txn().await?;
        let row = SessionSelector::new(&mut tx).get_active(token).await?;
        Ok(row.map(Session::from))
    }

    async fn revoke_session(&self, token: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin_txn().await?;
        let revoked = SessionMutator::new(&mut tx).revoke(token).await?;
        tx.commit().await?;
        Ok(revoked)
    }
}
