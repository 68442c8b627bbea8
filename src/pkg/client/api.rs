use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::pkg::internal::{auth::Session, validation::FieldError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid input: {}", .0.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; "))]
    Validation(Vec<FieldError>),

    #[error("request failed with {status}: {}", .messages.join("; "))]
    Server { status: u16, messages: Vec<String> },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl ClientError {
    /// Builds the error for a non-2xx response. `message` may be a string
    /// or an array of strings; anything else falls back to a generic line.
    pub fn from_response(status: u16, body: &Value) -> Self {
        let messages: Vec<String> = match body.get("message") {
            Some(Value::String(m)) if !m.trim().is_empty() => vec![m.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|m| m.as_str())
                .filter(|m| !m.trim().is_empty())
                .map(String::from)
                .collect(),
            _ => vec![],
        };
        let messages = if !messages.is_empty() {
            messages
        } else if status == StatusCode::CONFLICT.as_u16() {
            vec!["This record is no longer available".to_string()]
        } else {
            vec![format!("Something went wrong ({})", status)]
        };
        ClientError::Server { status, messages }
    }

    /// Lines to show the user, one notification each.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ClientError::Validation(errors) => errors.iter().map(|e| e.message.clone()).collect(),
            ClientError::Server { messages, .. } => messages.clone(),
            other => vec![other.to_string()],
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub token: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("edumarket-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("{} {} -> {}", request.method, url, status);
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Thin typed layer over a `Transport`. Carries the caller's session, if
/// any, and attaches its token to every request.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        ApiClient {
            transport,
            session: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query,
            body,
            token: self.session.as_ref().map(|s| s.token),
        };
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(ClientError::from_response(response.status, &response.body))
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ClientError> {
        let body = self.execute(Method::GET, path, query, None).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(payload)?;
        let body = self.execute(Method::POST, path, vec![], Some(body)).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(payload)?;
        let body = self.execute(Method::PATCH, path, vec![], Some(body)).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(payload)?;
        let body = self.execute(Method::PUT, path, vec![], Some(body)).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, path, vec![], None).await?;
        Ok(())
    }
}
