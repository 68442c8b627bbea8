use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension};
use axum_extra::extract::{cookie::Cookie, CookieJar};

use crate::{
    pkg::{
        internal::auth::Session,
        server::{middlewares::authn::TOKEN_COOKIE, state::AppState},
    },
    prelude::Result,
};

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar)> {
    state.store.revoke_session(session.token).await?;
    tracing::info!("user {} logged out successfully", &session.user_id);
    Ok((StatusCode::NO_CONTENT, jar.remove(Cookie::from(TOKEN_COOKIE))))
}
