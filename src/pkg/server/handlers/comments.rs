use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::comments::spec::{Comment, CommentInput},
            auth::{Permission, Session},
            lifecycle::ListingStatus,
            listing::ListingKind,
        },
        server::{handlers::listings::load_visible, state::AppState},
    },
    prelude::{AppError, Result},
};

pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<Vec<Comment>>> {
    load_visible(&state, &session, ListingKind::ResearchNews, id).await?;
    Ok(Json(state.store.list_comments(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(input), _): WithRejection<Json<CommentInput>, AppError>,
) -> Result<(StatusCode, Json<Comment>)> {
    if !session.holds(Permission::Comment) {
        return Err(AppError::forbidden("commenting is not allowed for this account"));
    }
    let input = CommentInput {
        body: input.body.trim().to_string(),
    };
    input.validate()?;
    let listing = load_visible(&state, &session, ListingKind::ResearchNews, id).await?;
    if listing.status != ListingStatus::Live {
        return Err(AppError::Conflict(
            "comments are only open on live research news".to_string(),
        ));
    }
    let comment = state
        .store
        .create_comment(id, &session.user_id, &input.body)
        .await?;
    tracing::info!("comment {} added to research news {}", comment.id, id);
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(comment_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<StatusCode> {
    let comment = state
        .store
        .get_comment(comment_id)
        .await?
        .ok_or(AppError::NotFound("comment"))?;
    if !(session.is_admin() || session.owns(&comment.author_id)) {
        return Err(AppError::forbidden("only the author can delete this comment"));
    }
    state.store.delete_comment(comment_id).await?;
    tracing::info!("comment {} deleted by {}", comment_id, session.user_id);
    Ok(StatusCode::NO_CONTENT)
}
