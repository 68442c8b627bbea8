use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{
    pkg::server::state::AppState,
    prelude::{AppError, Result},
};

pub const TOKEN_COOKIE: &str = "_Host_token";

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let jar = CookieJar::from_headers(&headers);
    let raw = bearer_token(&headers).or_else(|| {
        jar.get(TOKEN_COOKIE)
            .filter(|c| !c.value().is_empty())
            .map(|c| c.value().to_string())
    });
    if let Some(token) = raw.and_then(|t| Uuid::parse_str(&t).ok()) {
        if let Some(session) = state.store.resolve_session(token).await? {
            request.extensions_mut().insert(Arc::new(session));
            return Ok(next.run(request).await);
        }
    }
    tracing::warn!("token missing or expired, authentication denied");
    Err(AppError::Unauthenticated)
}
