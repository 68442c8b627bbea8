use std::{marker::PhantomData, str::FromStr, sync::Arc};

use uuid::Uuid;
use validator::Validate;

use crate::pkg::{
    client::{
        api::{ApiClient, ClientError},
        cache::{QueryCache, QueryKey, Scope},
        notify::Notifier,
    },
    internal::{
        details::ListingDetails,
        lifecycle::ListingStatus,
        listing::{
            ListQuery, Listing, ListingPatch, NewListing, StatusChange, StatusUpdate,
        },
        validation,
    },
};

/// How much of the cache a status change drops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Every cached query of the listing kind.
    #[default]
    Entity,
    /// The old and new status lists, the record, and filtered lists.
    Buckets,
}

impl FromStr for InvalidationScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entity" => Ok(InvalidationScope::Entity),
            "buckets" => Ok(InvalidationScope::Buckets),
            other => Err(format!("unknown invalidation scope `{}`", other)),
        }
    }
}

/// Queries and mutations for one listing kind.
pub struct ListingClient<D> {
    api: ApiClient,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    invalidation: InvalidationScope,
    _details: PhantomData<D>,
}

impl<D: ListingDetails> ListingClient<D> {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        ListingClient {
            api,
            cache,
            notifier,
            invalidation: InvalidationScope::default(),
            _details: PhantomData,
        }
    }

    pub fn with_invalidation(mut self, invalidation: InvalidationScope) -> Self {
        self.invalidation = invalidation;
        self
    }

    fn entity() -> &'static str {
        D::KIND.segment()
    }

    fn collection() -> String {
        format!("/{}", Self::entity())
    }

    fn record(id: Uuid) -> String {
        format!("/{}/{}", Self::entity(), id)
    }

    fn report(&self, err: &ClientError) {
        for message in err.messages() {
            self.notifier.error(message);
        }
    }

    /// Client-side checks run first; failures come back as field errors
    /// without touching the network.
    pub async fn create(&self, payload: &NewListing<D>) -> Result<Listing<D>, ClientError> {
        if let Err(errors) = payload.validate() {
            return Err(ClientError::Validation(validation::collect(&errors)));
        }
        match self.api.post(&Self::collection(), payload).await {
            Ok(listing) => {
                self.notifier
                    .success(format!("{} created", D::KIND.display_name()));
                self.cache.invalidate_entity(Self::entity()).await;
                Ok(listing)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    pub async fn list_by_status(
        &self,
        status: ListingStatus,
    ) -> Result<Vec<Listing<D>>, ClientError> {
        let key = QueryKey::new(Self::entity(), Scope::Status(status));
        let path = Self::collection();
        let query = ListQuery::by_status(status);
        self.cache
            .fetch(key, || self.api.get(&path, query.to_pairs()))
            .await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Listing<D>>, ClientError> {
        let key = QueryKey::new(Self::entity(), Scope::Query(query.clone()));
        let path = Self::collection();
        self.cache
            .fetch(key, || self.api.get(&path, query.to_pairs()))
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Listing<D>, ClientError> {
        let key = QueryKey::new(Self::entity(), Scope::Id(id));
        let path = Self::record(id);
        self.cache
            .fetch(key, || self.api.get(&path, vec![]))
            .await
    }

    pub async fn update(&self, id: Uuid, patch: &ListingPatch<D>) -> Result<Listing<D>, ClientError> {
        if let Err(errors) = patch.validate() {
            return Err(ClientError::Validation(validation::collect(&errors)));
        }
        match self.api.patch(&Self::record(id), patch).await {
            Ok(listing) => {
                self.notifier
                    .success(format!("{} updated", D::KIND.display_name()));
                self.cache.invalidate_entity(Self::entity()).await;
                Ok(listing)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: ListingStatus,
    ) -> Result<StatusChange<D>, ClientError> {
        let path = format!("{}/status", Self::record(id));
        let change: StatusChange<D> = match self.api.patch(&path, &StatusUpdate { status }).await {
            Ok(change) => change,
            Err(err) => {
                self.report(&err);
                return Err(err);
            }
        };
        self.notifier.success(format!(
            "{} moved to {}",
            D::KIND.display_name(),
            change.listing.status
        ));
        match self.invalidation {
            InvalidationScope::Entity => self.cache.invalidate_entity(Self::entity()).await,
            InvalidationScope::Buckets => {
                let previous = change.previous_status;
                let current = change.listing.status;
                self.cache
                    .invalidate_where(Self::entity(), |scope| match scope {
                        Scope::Status(s) => *s == previous || *s == current,
                        Scope::Id(record) => *record == id,
                        Scope::Query(_) => true,
                        _ => false,
                    })
                    .await;
            }
        }
        Ok(change)
    }

    /// Irreversible; callers confirm before calling.
    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        match self.api.delete(&Self::record(id)).await {
            Ok(()) => {
                self.notifier
                    .success(format!("{} deleted", D::KIND.display_name()));
                self.cache.invalidate_entity(Self::entity()).await;
                Ok(())
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }
}
