use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            auth::{Permission, Session},
            details::ListingDetails,
            lifecycle::ListingStatus,
            listing::{
                ListQuery, Listing, ListingFields, ListingKind, ListingPatch, NewListing,
                StatusChange, StatusUpdate,
            },
        },
        server::state::AppState,
    },
    prelude::{AppError, Result},
};

/// Loads a listing the session may see. Records that are not live are
/// only visible to their owner and admins; everyone else gets a 404.
pub(crate) async fn load_visible(
    state: &AppState,
    session: &Session,
    kind: ListingKind,
    id: Uuid,
) -> Result<Listing> {
    let listing = state
        .store
        .get_listing(kind, id)
        .await?
        .ok_or(AppError::NotFound("listing"))?;
    if listing.status == ListingStatus::Live || can_manage(session, &listing) {
        Ok(listing)
    } else {
        Err(AppError::NotFound("listing"))
    }
}

fn can_manage(session: &Session, listing: &Listing) -> bool {
    session.is_admin() || session.owns(&listing.owner_id)
}

pub(crate) fn authorize(session: &Session, listing: &Listing, permission: Permission) -> Result<()> {
    if !can_manage(session, listing) {
        return Err(AppError::forbidden(format!(
            "only the owner can manage this {}",
            listing.kind.display_name().to_lowercase()
        )));
    }
    if !listing.kind.manage_rule(permission).allows(session) {
        return Err(AppError::forbidden(format!(
            "{} role lacks the {} permission",
            session.role,
            permission.as_str()
        )));
    }
    Ok(())
}

pub async fn create<D: ListingDetails>(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Json(input), _): WithRejection<Json<NewListing<D>>, AppError>,
) -> Result<(StatusCode, Json<Listing>)> {
    if !D::KIND.manage_rule(Permission::CreateListing).allows(&session) {
        return Err(AppError::forbidden(format!(
            "{} role cannot create {} listings",
            session.role,
            D::KIND.display_name().to_lowercase()
        )));
    }
    input.validate()?;
    let status = input.initial_status();
    if status == ListingStatus::Live && !session.holds(Permission::PublishListing) {
        return Err(AppError::forbidden("publishing requires the publish_listing permission"));
    }
    let listing = state
        .store
        .create_listing(D::KIND, &session.user_id, status, input.into_fields()?)
        .await?;
    tracing::info!(
        "{} {} created by {} as {}",
        D::KIND.segment(),
        listing.id,
        session.user_id,
        status.as_str()
    );
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn list<D: ListingDetails>(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, AppError>,
) -> Result<Json<Vec<Listing>>> {
    let listings = if session.is_admin() {
        state.store.list_listings(D::KIND, None, &query).await?
    } else if D::KIND.is_author(session.role) {
        state
            .store
            .list_listings(D::KIND, Some(&session.user_id), &query)
            .await?
    } else {
        match query.status {
            Some(status) if status != ListingStatus::Live => {
                return Err(AppError::forbidden(format!(
                    "{} listings are only visible to their authors",
                    status.as_str()
                )))
            }
            _ => {}
        }
        let query = ListQuery {
            status: Some(ListingStatus::Live),
            ..query
        };
        state.store.list_listings(D::KIND, None, &query).await?
    };
    tracing::debug!("{} listings returned for {}", listings.len(), D::KIND.segment());
    Ok(Json(listings))
}

pub async fn get<D: ListingDetails>(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<Listing>> {
    Ok(Json(load_visible(&state, &session, D::KIND, id).await?))
}

pub async fn update<D: ListingDetails>(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(patch), _): WithRejection<Json<ListingPatch<D>>, AppError>,
) -> Result<Json<Listing>> {
    patch.validate()?;
    let listing = load_visible(&state, &session, D::KIND, id).await?;
    authorize(&session, &listing, Permission::EditListing)?;
    if listing.status == ListingStatus::Archive {
        return Err(AppError::Conflict(
            "archived listings cannot be edited, restore it first".to_string(),
        ));
    }
    let fields = patch.apply(ListingFields::from(&listing))?;
    if fields.has_application_form && fields.questions.is_empty() {
        return Err(AppError::Validation(vec![
            "an application form needs at least one question".to_string(),
        ]));
    }
    let updated = state
        .store
        .update_listing(D::KIND, id, fields)
        .await?
        .ok_or(AppError::NotFound("listing"))?;
    tracing::info!("{} {} updated by {}", D::KIND.segment(), id, session.user_id);
    Ok(Json(updated))
}

pub async fn update_status<D: ListingDetails>(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(update), _): WithRejection<Json<StatusUpdate>, AppError>,
) -> Result<Json<StatusChange>> {
    let listing = load_visible(&state, &session, D::KIND, id).await?;
    authorize(&session, &listing, update.status.entry_permission())?;
    let previous_status = listing.status;
    if previous_status == update.status {
        tracing::debug!("{} {} already {}", D::KIND.segment(), id, previous_status.as_str());
        return Ok(Json(StatusChange {
            listing,
            previous_status,
        }));
    }
    if !previous_status.can_transition(update.status) {
        return Err(AppError::InvalidTransition {
            from: previous_status,
            to: update.status,
        });
    }
    let Some(listing) = state
        .store
        .update_status(D::KIND, id, previous_status, update.status)
        .await?
    else {
        // moved or removed by someone else since it was loaded
        let current = state
            .store
            .get_listing(D::KIND, id)
            .await?
            .ok_or(AppError::NotFound("listing"))?;
        return Err(AppError::InvalidTransition {
            from: current.status,
            to: update.status,
        });
    };
    tracing::info!(
        "{} {} moved from {} to {}",
        D::KIND.segment(),
        id,
        previous_status.as_str(),
        listing.status.as_str()
    );
    Ok(Json(StatusChange {
        listing,
        previous_status,
    }))
}

pub async fn delete<D: ListingDetails>(
    State(state): State<AppState>,
    Extension(session): Extension<Arc<Session>>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<StatusCode> {
    let listing = load_visible(&state, &session, D::KIND, id).await?;
    authorize(&session, &listing, Permission::DeleteListing)?;
    if !state.store.delete_listing(D::KIND, id).await? {
        return Err(AppError::NotFound("listing"));
    }
    tracing::info!("{} {} deleted by {}", D::KIND.segment(), id, session.user_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use tracing_test::traced_test;

    use crate::pkg::{internal::auth::Role, server::testing::Harness};

    fn job(title: &str, status: Option<&str>) -> Value {
        json!({
            "title": title,
            "description": "Support the photonics lab",
            "status": status,
            "details": {
                "department": "Physics",
                "location": "Lyon",
                "employmentType": "full-time",
                "deadline": "2026-12-01"
            }
        })
    }

    fn ids(body: &Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn probes_skip_authentication() {
        let app = Harness::new();
        let (status, _) = app.send(Method::GET, "/livez", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.send(Method::GET, "/healthz", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app.send(Method::GET, "/jobs", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "ERR-AUTH-001");
        assert_eq!(body["statusCode"], 401);
    }

    #[tokio::test]
    async fn only_authoring_roles_create() {
        let app = Harness::new();
        let student = app.login("stu", Role::Student).await;
        let mentor = app.login("men", Role::Mentor).await;
        let org = app.login("org", Role::Institution).await;

        let (status, _) = app
            .send(Method::POST, "/jobs", Some(&student), Some(job("RA", None)))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .send(Method::POST, "/jobs", Some(&mentor), Some(job("RA", None)))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .send(Method::POST, "/jobs", Some(&org), Some(job("RA", None)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "draft");
        assert_eq!(body["kind"], "job");
        assert_eq!(body["ownerId"], "org");
        assert_eq!(body["category"], "full-time");
    }

    #[tokio::test]
    async fn invalid_payload_lists_every_message() {
        let app = Harness::new();
        let org = app.login("org", Role::Institution).await;
        let mut payload = job(" ", None);
        payload["details"]["location"] = json!("");
        let (status, body) = app
            .send(Method::POST, "/jobs", Some(&org), Some(payload))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ERR-REQ-001");
        assert_eq!(
            body["message"],
            json!(["location cannot be empty", "title cannot be empty"])
        );

        let (status, body) = app
            .send(Method::POST, "/jobs", Some(&org), Some(json!({ "title": "x" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_array());

        let mut payload = job("RA", None);
        payload["details"]["department"] = json!("   ");
        payload["details"]["location"] = json!(" \t ");
        let (status, body) = app
            .send(Method::POST, "/jobs", Some(&org), Some(payload))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            json!(["department cannot be empty", "location cannot be empty"])
        );
        let (_, listed) = app.send(Method::GET, "/jobs", Some(&org), None).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn job_moves_from_draft_to_live_lists() {
        let app = Harness::new();
        let org = app.login("org", Role::Institution).await;
        let student = app.login("stu", Role::Student).await;

        let (_, created) = app
            .send(Method::POST, "/jobs", Some(&org), Some(job("Lab assistant", None)))
            .await;
        let id = created["id"].as_str().unwrap().to_string();

        let (_, drafts) = app
            .send(Method::GET, "/jobs?status=draft", Some(&org), None)
            .await;
        assert_eq!(ids(&drafts), vec![id.clone()]);
        let (_, live) = app.send(Method::GET, "/jobs", Some(&student), None).await;
        assert!(ids(&live).is_empty());

        let (status, change) = app
            .send(
                Method::PATCH,
                &format!("/jobs/{}/status", id),
                Some(&org),
                Some(json!({ "status": "live" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(change["previousStatus"], "draft");
        assert_eq!(change["listing"]["status"], "live");

        let (_, drafts) = app
            .send(Method::GET, "/jobs?status=draft", Some(&org), None)
            .await;
        assert!(ids(&drafts).is_empty());
        let (_, live) = app
            .send(Method::GET, "/jobs?status=live", Some(&org), None)
            .await;
        assert_eq!(ids(&live), vec![id.clone()]);
        let (_, browse) = app.send(Method::GET, "/jobs", Some(&student), None).await;
        assert_eq!(ids(&browse), vec![id]);
        assert!(logs_contain("moved from draft to live"));
    }

    #[tokio::test]
    async fn transitions_follow_the_lifecycle() {
        let app = Harness::new();
        let org = app.login("org", Role::University).await;
        let (_, created) = app
            .send(Method::POST, "/scholarships", Some(&org), Some(json!({
                "title": "Doctoral grant",
                "description": "Three years of funding",
                "details": {
                    "provider": "Fondation X",
                    "amount": 25000.0,
                    "currency": "EUR",
                    "level": "doctoral",
                    "deadline": "2026-05-01"
                }
            })))
            .await;
        let status_uri = format!("/scholarships/{}/status", created["id"].as_str().unwrap());

        let (status, body) = app
            .send(Method::PATCH, &status_uri, Some(&org), Some(json!({ "status": "archive" })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "ERR-LIFECYCLE-001");

        let (status, body) = app
            .send(Method::PATCH, &status_uri, Some(&org), Some(json!({ "status": "draft" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["previousStatus"], "draft");

        for (target, previous) in [("published", "draft"), ("archived", "live"), ("live", "archive")] {
            let (status, body) = app
                .send(Method::PATCH, &status_uri, Some(&org), Some(json!({ "status": target })))
                .await;
            assert_eq!(status, StatusCode::OK, "{target}");
            assert_eq!(body["previousStatus"], previous);
        }
    }

    #[tokio::test]
    async fn edits_keep_status_and_stop_at_archive() {
        let app = Harness::new();
        let org = app.login("org", Role::Institution).await;
        let (_, created) = app
            .send(Method::POST, "/jobs", Some(&org), Some(job("RA", Some("live"))))
            .await;
        let uri = format!("/jobs/{}", created["id"].as_str().unwrap());

        let (status, _) = app
            .send(Method::PATCH, &uri, Some(&org), Some(json!({ "status": "archive" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .send(Method::PATCH, &uri, Some(&org), Some(json!({ "title": "Senior RA" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Senior RA");
        assert_eq!(body["status"], "live");

        app.send(
            Method::PATCH,
            &format!("{}/status", uri),
            Some(&org),
            Some(json!({ "status": "archive" })),
        )
        .await;
        let (status, body) = app
            .send(Method::PATCH, &uri, Some(&org), Some(json!({ "title": "Again" })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "ERR-REQ-003");
    }

    #[tokio::test]
    async fn outsiders_cannot_see_or_manage() {
        let app = Harness::new();
        let org = app.login("org", Role::Institution).await;
        let rival = app.login("rival", Role::Institution).await;
        let student = app.login("stu", Role::Student).await;
        let admin = app.login("root", Role::Admin).await;

        let (_, draft) = app
            .send(Method::POST, "/jobs", Some(&org), Some(job("Draft", None)))
            .await;
        let draft_uri = format!("/jobs/{}", draft["id"].as_str().unwrap());
        let (status, _) = app.send(Method::GET, &draft_uri, Some(&student), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send(Method::GET, &draft_uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, live) = app
            .send(Method::POST, "/jobs", Some(&org), Some(job("Live", Some("live"))))
            .await;
        let live_uri = format!("/jobs/{}", live["id"].as_str().unwrap());
        let (status, _) = app.send(Method::GET, &live_uri, Some(&student), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .send(Method::PATCH, &live_uri, Some(&rival), Some(json!({ "title": "Mine" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.send(Method::DELETE, &live_uri, Some(&rival), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send(Method::GET, "/jobs?status=draft", Some(&student), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.send(Method::GET, "/jobs/not-a-uuid", Some(&org), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleted_listings_never_resurface() {
        let app = Harness::new();
        let org = app.login("org", Role::Ambassador).await;
        let (_, created) = app
            .send(Method::POST, "/opportunities", Some(&org), Some(json!({
                "title": "Exchange semester",
                "description": "Spend a term abroad",
                "details": {
                    "opportunityType": "exchange",
                    "location": "Kyoto",
                    "deadline": "2026-03-15"
                }
            })))
            .await;
        let uri = format!("/opportunities/{}", created["id"].as_str().unwrap());

        let (status, _) = app.send(Method::DELETE, &uri, Some(&org), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.send(Method::GET, &uri, Some(&org), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send(Method::DELETE, &uri, Some(&org), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        for query in ["", "?status=draft", "?status=live", "?status=archive"] {
            let (_, body) = app
                .send(Method::GET, &format!("/opportunities{}", query), Some(&org), None)
                .await;
            assert!(ids(&body).is_empty());
        }
    }

    #[tokio::test]
    async fn search_and_type_filters() {
        let app = Harness::new();
        let org = app.login("org", Role::Institution).await;
        let student = app.login("stu", Role::Student).await;
        app.send(Method::POST, "/jobs", Some(&org), Some(job("Quantum optics RA", Some("live"))))
            .await;
        let mut intern = job("Biology intern", Some("live"));
        intern["details"]["employmentType"] = json!("internship");
        app.send(Method::POST, "/jobs", Some(&org), Some(intern)).await;

        let (_, body) = app
            .send(Method::GET, "/jobs?search=QUANTUM", Some(&student), None)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Quantum optics RA");

        let (_, body) = app
            .send(Method::GET, "/jobs?type=internship", Some(&student), None)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Biology intern");
    }
}
