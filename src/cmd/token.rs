use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    conf::settings,
    pkg::{
        internal::auth::{Permission, Role, Session},
        server::state::AppState,
    },
    prelude::{AppError, Result},
};

fn build_session(user: &str, role: &str, permissions: &[String]) -> Result<Session> {
    let role = role
        .parse::<Role>()
        .map_err(|e| AppError::Validation(vec![e.to_string()]))?;
    let permissions = if permissions.is_empty() {
        role.default_permissions()
    } else {
        permissions
            .iter()
            .map(|p| p.parse::<Permission>())
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(|e| AppError::Validation(vec![e.to_string()]))?
    };
    if user.trim().is_empty() {
        return Err(AppError::Validation(vec!["user cannot be empty".to_string()]));
    }
    Ok(Session {
        token: Uuid::new_v4(),
        user_id: user.trim().to_string(),
        role,
        permissions,
        expires_at: Utc::now() + Duration::hours(settings.session_ttl_hours),
    })
}

pub async fn issue(user: &str, role: &str, permissions: &[String]) -> Result<()> {
    let state = AppState::new().await?;
    let session = state
        .store
        .create_session(&build_session(user, role, permissions)?)
        .await?;
    tracing::info!(
        "issued {} token for {} valid until {}",
        session.role,
        session.user_id,
        session.expires_at
    );
    println!("{}", session.token);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_role_permissions() {
        let session = build_session("ada", "student", &[]).unwrap();
        assert_eq!(session.role, Role::Student);
        assert_eq!(session.permissions, Role::Student.default_permissions());
        assert!(session.expires_at > Utc::now());
    }

    #[test]
    fn explicit_permissions_replace_defaults() {
        let session = build_session("ops", "admin", &["view-applications".into()]).unwrap();
        assert_eq!(
            session.permissions.into_iter().collect::<Vec<_>>(),
            vec![Permission::ViewApplications]
        );
        assert!(build_session("ops", "janitor", &[]).is_err());
        assert!(build_session("ops", "admin", &["fly".into()]).is_err());
        assert!(build_session(" ", "admin", &[]).is_err());
    }
}
