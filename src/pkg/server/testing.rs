//! Router harness over the in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::pkg::{
    internal::{
        auth::{Role, Session},
        store::{MemoryStore, SessionStore},
    },
    server::{router::build_routes, state::AppState},
};

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = build_routes(AppState::with_store(store.clone()));
        Harness { store, router }
    }

    pub async fn login(&self, user_id: &str, role: Role) -> Session {
        let session = Session {
            token: Uuid::new_v4(),
            user_id: user_id.to_string(),
            role,
            permissions: role.default_permissions(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        self.store.create_session(&session).await.unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        session: Option<&Session>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", session.token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}
