use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::profiles::spec::{Profile, ProfileInput, ProfileKind},
            auth::{AccessRule, Permission, Session},
        },
        server::state::AppState,
    },
    prelude::{AppError, Result},
};

fn ensure_owner(session: &Session, kind: ProfileKind) -> Result<()> {
    if AccessRule::new([kind.owner_role()], [Permission::ManageProfile]).allows(session) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "{} profiles are managed by {} accounts",
            kind.segment(),
            kind.owner_role()
        )))
    }
}

pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(kind), _): WithRejection<Path<ProfileKind>, AppError>,
) -> Result<Json<Option<Profile>>> {
    ensure_owner(&session, kind)?;
    Ok(Json(state.store.get_profile(kind, &session.user_id).await?))
}

pub async fn upsert(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(kind), _): WithRejection<Path<ProfileKind>, AppError>,
    WithRejection(Json(input), _): WithRejection<Json<ProfileInput>, AppError>,
) -> Result<Json<Profile>> {
    ensure_owner(&session, kind)?;
    input.validate()?;
    let profile = state
        .store
        .upsert_profile(kind, &session.user_id, &input)
        .await?;
    tracing::info!("{} profile saved for {}", kind.segment(), session.user_id);
    Ok(Json(profile))
}
