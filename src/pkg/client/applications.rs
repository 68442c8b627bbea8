use std::sync::Arc;

use uuid::Uuid;

use crate::pkg::{
    client::{
        api::{ApiClient, ClientError},
        cache::{QueryCache, QueryKey, Scope},
        notify::Notifier,
    },
    internal::{
        adaptors::applications::spec::{Application, ApplicationSubmission},
        listing::ListingKind,
        questions::Answers,
    },
};

pub struct ApplicationClient {
    api: ApiClient,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl ApplicationClient {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        ApplicationClient {
            api,
            cache,
            notifier,
        }
    }

    fn path(kind: ListingKind, listing_id: Uuid) -> String {
        format!("/{}/{}/applications", kind.segment(), listing_id)
    }

    pub async fn submit(
        &self,
        kind: ListingKind,
        listing_id: Uuid,
        answers: Answers,
    ) -> Result<Application, ClientError> {
        let submission = ApplicationSubmission { answers };
        match self.api.post(&Self::path(kind, listing_id), &submission).await {
            Ok(application) => {
                self.notifier.success("Application submitted".to_string());
                self.cache
                    .invalidate(&QueryKey::new(
                        kind.segment(),
                        Scope::Sub(listing_id, "applications"),
                    ))
                    .await;
                Ok(application)
            }
            Err(err) => {
                for message in err.messages() {
                    self.notifier.error(message);
                }
                Err(err)
            }
        }
    }

    /// Applications received by a listing; owners and admins only.
    pub async fn list(
        &self,
        kind: ListingKind,
        listing_id: Uuid,
    ) -> Result<Vec<Application>, ClientError> {
        let key = QueryKey::new(kind.segment(), Scope::Sub(listing_id, "applications"));
        let path = Self::path(kind, listing_id);
        self.cache.fetch(key, || self.api.get(&path, vec![])).await
    }
}
