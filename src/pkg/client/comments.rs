use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::pkg::{
    client::{
        api::{ApiClient, ClientError},
        cache::{QueryCache, QueryKey, Scope},
        notify::Notifier,
    },
    internal::{
        adaptors::comments::spec::{Comment, CommentInput},
        listing::ListingKind,
        validation,
    },
};

/// Discussion thread under a research news item.
pub struct CommentClient {
    api: ApiClient,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
}

impl CommentClient {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        CommentClient {
            api,
            cache,
            notifier,
        }
    }

    fn key(listing_id: Uuid) -> QueryKey {
        QueryKey::new(
            ListingKind::ResearchNews.segment(),
            Scope::Sub(listing_id, "comments"),
        )
    }

    fn thread(listing_id: Uuid) -> String {
        format!("/{}/{}/comments", ListingKind::ResearchNews.segment(), listing_id)
    }

    pub async fn list(&self, listing_id: Uuid) -> Result<Vec<Comment>, ClientError> {
        let path = Self::thread(listing_id);
        self.cache
            .fetch(Self::key(listing_id), || self.api.get(&path, vec![]))
            .await
    }

    pub async fn post(&self, listing_id: Uuid, body: &str) -> Result<Comment, ClientError> {
        let input = CommentInput {
            body: body.trim().to_string(),
        };
        if let Err(errors) = input.validate() {
            return Err(ClientError::Validation(validation::collect(&errors)));
        }
        let result = self.api.post(&Self::thread(listing_id), &input).await;
        self.settle(listing_id, result, "Comment posted").await
    }

    pub async fn delete(&self, listing_id: Uuid, comment_id: Uuid) -> Result<(), ClientError> {
        let path = format!(
            "/{}/comment/{}",
            ListingKind::ResearchNews.segment(),
            comment_id
        );
        let result = self.api.delete(&path).await;
        self.settle(listing_id, result, "Comment deleted").await
    }

    async fn settle<T>(
        &self,
        listing_id: Uuid,
        result: Result<T, ClientError>,
        success: &str,
    ) -> Result<T, ClientError> {
        match &result {
            Ok(_) => {
                self.notifier.success(success.to_string());
                self.cache.invalidate(&Self::key(listing_id)).await;
            }
            Err(err) => {
                for message in err.messages() {
                    self.notifier.error(message);
                }
            }
        }
        result
    }
}
