use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    University,
    Institution,
    Mentor,
    Ambassador,
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CreateListing,
    EditListing,
    DeleteListing,
    PublishListing,
    ArchiveListing,
    ViewApplications,
    ApplyToListing,
    ManageProfile,
    Comment,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::University,
        Role::Institution,
        Role::Mentor,
        Role::Ambassador,
        Role::Student,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::University => "university",
            Role::Institution => "institution",
            Role::Mentor => "mentor",
            Role::Ambassador => "ambassador",
            Role::Student => "student",
        }
    }

    /// Permissions granted when a session is issued without an explicit set.
    pub fn default_permissions(&self) -> BTreeSet<Permission> {
        use Permission::*;
        let granted: &[Permission] = match self {
            Role::Admin => &[
                CreateListing,
                EditListing,
                DeleteListing,
                PublishListing,
                ArchiveListing,
                ViewApplications,
                ManageProfile,
                Comment,
            ],
            Role::University | Role::Institution => &[
                CreateListing,
                EditListing,
                DeleteListing,
                PublishListing,
                ArchiveListing,
                ViewApplications,
                ManageProfile,
                Comment,
            ],
            Role::Mentor | Role::Ambassador => &[
                CreateListing,
                EditListing,
                DeleteListing,
                PublishListing,
                ArchiveListing,
                ViewApplications,
                Comment,
            ],
            Role::Student => &[ApplyToListing, Comment],
        };
        granted.iter().copied().collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownName {
                kind: "role",
                value: s.to_string(),
            })
    }
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::CreateListing,
        Permission::EditListing,
        Permission::DeleteListing,
        Permission::PublishListing,
        Permission::ArchiveListing,
        Permission::ViewApplications,
        Permission::ApplyToListing,
        Permission::ManageProfile,
        Permission::Comment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateListing => "create_listing",
            Permission::EditListing => "edit_listing",
            Permission::DeleteListing => "delete_listing",
            Permission::PublishListing => "publish_listing",
            Permission::ArchiveListing => "archive_listing",
            Permission::ViewApplications => "view_applications",
            Permission::ApplyToListing => "apply_to_listing",
            Permission::ManageProfile => "manage_profile",
            Permission::Comment => "comment",
        }
    }
}

impl FromStr for Permission {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownName {
                kind: "permission",
                value: s.to_string(),
            })
    }
}

/// The resolved actor of a request. Passed explicitly to whatever needs it;
/// there is no process-wide session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: Uuid,
    pub user_id: String,
    pub role: Role,
    pub permissions: BTreeSet<Permission>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn holds(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn owns(&self, owner_id: &str) -> bool {
        self.user_id == owner_id
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Role/permission requirement: the actor's role must be one of `roles`
/// and the actor must hold at least one of `permissions`. An empty set
/// places no constraint on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRule {
    pub roles: BTreeSet<Role>,
    pub permissions: BTreeSet<Permission>,
}

impl AccessRule {
    pub fn new(
        roles: impl IntoIterator<Item = Role>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        AccessRule {
            roles: roles.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn allows(&self, session: &Session) -> bool {
        let role_ok = self.roles.is_empty() || self.roles.contains(&session.role);
        let permission_ok = self.permissions.is_empty()
            || self.permissions.iter().any(|p| session.permissions.contains(p));
        role_ok && permission_ok
    }
}
