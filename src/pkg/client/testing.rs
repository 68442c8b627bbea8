//! Client plumbing wired straight into the router over the in-memory store.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
};
use reqwest::Url;
use serde_json::Value;
use tower::ServiceExt;

use crate::pkg::{
    client::{
        api::{ApiRequest, ApiResponse, ClientError, Transport},
        listings::InvalidationScope,
        notify::NotificationLog,
        ClientConfig, ClientContext,
    },
    internal::auth::Role,
    server::testing::Harness,
};

pub struct RouterTransport {
    router: axum::Router,
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for RouterTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut url = Url::parse("http://router.local").unwrap();
        url.set_path(&request.path);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        let uri = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let mut builder = Request::builder().method(request.method).uri(uri);
        if let Some(token) = request.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match request.body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(ApiResponse { status, body })
    }
}

pub struct World {
    pub server: Harness,
    pub transport: Arc<RouterTransport>,
    pub log: Arc<NotificationLog>,
    base: ClientContext,
}

impl World {
    pub fn new() -> Self {
        World::with_invalidation(InvalidationScope::Entity)
    }

    pub fn with_invalidation(invalidation: InvalidationScope) -> Self {
        let server = Harness::new();
        let transport = Arc::new(RouterTransport {
            router: server.router.clone(),
            calls: AtomicUsize::new(0),
        });
        let log = Arc::new(NotificationLog::new());
        let config = ClientConfig {
            base_url: "http://router.local".to_string(),
            stale_after: std::time::Duration::from_secs(300),
            invalidation,
        };
        let base = ClientContext::new(transport.clone(), &config, log.clone());
        World {
            server,
            transport,
            log,
            base,
        }
    }

    /// Client context acting as a freshly logged-in user.
    pub async fn client(&self, user_id: &str, role: Role) -> ClientContext {
        let session = self.server.login(user_id, role).await;
        self.base.signed_in(session)
    }

    pub fn calls(&self) -> usize {
        self.transport.calls.load(Ordering::SeqCst)
    }
}
