use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};
use axum::Router;

use super::handlers;
use super::handlers::auth::logout;
use super::handlers::probes::{healthz, livez};
use super::middlewares::authn;
use super::state::AppState;
use crate::pkg::internal::details::{
    JobDetails, ListingDetails, OpportunityDetails, ResearchNewsDetails, ScholarshipDetails,
};

/// CRUD, lifecycle and application routes for one listing kind, mounted
/// under its collection segment.
fn listing_routes<D: ListingDetails>() -> Router<AppState> {
    let base = format!("/{}", D::KIND.segment());
    Router::new()
        .route(
            &base,
            post(handlers::listings::create::<D>).get(handlers::listings::list::<D>),
        )
        .route(
            &format!("{}/{{id}}", base),
            get(handlers::listings::get::<D>)
                .patch(handlers::listings::update::<D>)
                .delete(handlers::listings::delete::<D>),
        )
        .route(
            &format!("{}/{{id}}/status", base),
            patch(handlers::listings::update_status::<D>),
        )
        .route(
            &format!("{}/{{id}}/applications", base),
            post(handlers::applications::submit::<D>).get(handlers::applications::list::<D>),
        )
}

pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .merge(listing_routes::<JobDetails>())
        .merge(listing_routes::<ScholarshipDetails>())
        .merge(listing_routes::<ResearchNewsDetails>())
        .merge(listing_routes::<OpportunityDetails>())
        .route(
            "/research-news/{id}/comments",
            get(handlers::comments::list).post(handlers::comments::create),
        )
        .route(
            "/research-news/comment/{comment_id}",
            delete(handlers::comments::delete),
        )
        .route(
            "/profiles/{kind}",
            get(handlers::profiles::get).put(handlers::profiles::upsert),
        )
        .route("/logout", post(logout))
        .layer(from_fn_with_state(state.clone(), authn::authenticate))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state)
}
