//! Headless client core: typed API access, query caching with
//! invalidation, notifications, role gating and form models.

pub mod api;
pub mod applications;
pub mod cache;
pub mod comments;
pub mod form;
pub mod gate;
pub mod listings;
pub mod notify;
pub mod profile;

#[cfg(test)]
pub(crate) mod testing;

use std::{sync::Arc, time::Duration};

use crate::{
    conf::Settings,
    pkg::internal::{auth::Session, details::ListingDetails, validation::FieldError},
};
use api::{ApiClient, ClientError, HttpTransport, Transport};
use applications::ApplicationClient;
use cache::QueryCache;
use comments::CommentClient;
use listings::{InvalidationScope, ListingClient};
use notify::Notifier;
use profile::ProfileClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub stale_after: Duration,
    pub invalidation: InvalidationScope,
}

impl ClientConfig {
    pub fn from_settings(conf: &Settings) -> Result<Self, ClientError> {
        let invalidation = conf
            .cache_invalidation
            .parse()
            .map_err(|message: String| {
                ClientError::Validation(vec![FieldError {
                    field: "cache_invalidation".to_string(),
                    message,
                }])
            })?;
        Ok(ClientConfig {
            base_url: conf.api_base_url.clone(),
            stale_after: Duration::from_secs(conf.cache_stale_secs),
            invalidation,
        })
    }
}

/// Shared plumbing every per-resource client is built from.
#[derive(Clone)]
pub struct ClientContext {
    pub api: ApiClient,
    pub cache: Arc<QueryCache>,
    pub notifier: Arc<dyn Notifier>,
    pub invalidation: InvalidationScope,
}

impl ClientContext {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: &ClientConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        ClientContext {
            api: ApiClient::new(transport),
            cache: Arc::new(QueryCache::new(config.stale_after)),
            notifier,
            invalidation: config.invalidation,
        }
    }

    pub fn over_http(config: &ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ClientError> {
        let transport = Arc::new(HttpTransport::new(&config.base_url)?);
        Ok(ClientContext::new(transport, config, notifier))
    }

    /// Same plumbing acting for `session`; the cache is not shared with
    /// the anonymous context.
    pub fn signed_in(&self, session: Session) -> Self {
        ClientContext {
            api: self.api.clone().with_session(session),
            cache: Arc::new(QueryCache::new(self.cache.stale_after())),
            notifier: self.notifier.clone(),
            invalidation: self.invalidation,
        }
    }

    pub fn listings<D: ListingDetails>(&self) -> ListingClient<D> {
        ListingClient::new(self.api.clone(), self.cache.clone(), self.notifier.clone())
            .with_invalidation(self.invalidation)
    }

    pub fn applications(&self) -> ApplicationClient {
        ApplicationClient::new(self.api.clone(), self.cache.clone(), self.notifier.clone())
    }

    pub fn comments(&self) -> CommentClient {
        CommentClient::new(self.api.clone(), self.cache.clone(), self.notifier.clone())
    }

    pub fn profiles(&self) -> ProfileClient {
        ProfileClient::new(self.api.clone(), self.cache.clone(), self.notifier.clone())
    }
}
