use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    pkg::{
        internal::{
            adaptors::applications::spec::{Application, ApplicationSubmission},
            auth::{AccessRule, Permission, Role, Session},
            details::ListingDetails,
            questions::{validate_answers, Answers},
        },
        server::{
            handlers::listings::{authorize, load_visible},
            state::AppState,
        },
    },
    prelude::{AppError, Result},
};

pub async fn submit<D: ListingDetails>(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(submission), _): WithRejection<Json<ApplicationSubmission>, AppError>,
) -> Result<(StatusCode, Json<Application>)> {
    if !AccessRule::new([Role::Student], [Permission::ApplyToListing]).allows(&session) {
        return Err(AppError::forbidden("only students can apply to listings"));
    }
    let listing = load_visible(&state, &session, D::KIND, id).await?;
    if !listing.accepts_applications() {
        return Err(AppError::Conflict(format!(
            "this {} is not accepting applications",
            D::KIND.display_name().to_lowercase()
        )));
    }
    validate_answers(&listing.questions, &submission.answers)?;
    let answers: Answers = submission
        .answers
        .into_iter()
        .map(|(question, answer)| (question, answer.trim().to_string()))
        .collect();
    let application = state
        .store
        .create_application(id, &session.user_id, &answers)
        .await?
        .ok_or_else(|| AppError::Conflict("you have already applied to this listing".to_string()))?;
    tracing::info!(
        "application {} submitted to {} {} by {}",
        application.id,
        D::KIND.segment(),
        id,
        session.user_id
    );
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn list<D: ListingDetails>(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<Vec<Application>>> {
    let listing = load_visible(&state, &session, D::KIND, id).await?;
    authorize(&session, &listing, Permission::ViewApplications)?;
    let applications = state.store.list_applications(id).await?;
    Ok(Json(applications))
}
