//! Draft → Live → Archive workflow shared by every listing kind.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use super::auth::Permission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    #[serde(alias = "published")]
    Live,
    #[serde(alias = "archived")]
    Archive,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown listing status `{0}`")]
pub struct UnknownStatus(pub String);

/// What a dashboard may offer for a listing in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListingAction {
    Edit,
    Delete,
    Publish,
    Archive,
    Restore,
    ViewApplications,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 3] = [
        ListingStatus::Draft,
        ListingStatus::Live,
        ListingStatus::Archive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::Live => "live",
            ListingStatus::Archive => "archive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "Draft",
            ListingStatus::Live => "Live",
            ListingStatus::Archive => "Archive",
        }
    }

    /// Statuses reachable through a status update. Staying put is handled
    /// separately as a no-op.
    pub fn next_states(&self) -> &'static [ListingStatus] {
        match self {
            ListingStatus::Draft => &[ListingStatus::Live],
            ListingStatus::Live => &[ListingStatus::Archive],
            ListingStatus::Archive => &[ListingStatus::Live],
        }
    }

    pub fn can_transition(&self, to: ListingStatus) -> bool {
        *self == to || self.next_states().contains(&to)
    }

    pub fn actions(&self) -> &'static [ListingAction] {
        match self {
            ListingStatus::Draft => &[
                ListingAction::Edit,
                ListingAction::Delete,
                ListingAction::Publish,
            ],
            ListingStatus::Live => &[
                ListingAction::Edit,
                ListingAction::Archive,
                ListingAction::ViewApplications,
            ],
            ListingStatus::Archive => &[ListingAction::Restore, ListingAction::ViewApplications],
        }
    }

    pub fn allows(&self, action: ListingAction) -> bool {
        self.actions().contains(&action)
    }

    /// Permission an actor needs to move a listing into `self`.
    pub fn entry_permission(&self) -> Permission {
        match self {
            ListingStatus::Draft | ListingStatus::Live => Permission::PublishListing,
            ListingStatus::Archive => Permission::ArchiveListing,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ListingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(ListingStatus::Draft),
            "live" | "published" => Ok(ListingStatus::Live),
            "archive" | "archived" => Ok(ListingStatus::Archive),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl ListingAction {
    pub fn permission(&self) -> Permission {
        match self {
            ListingAction::Edit => Permission::EditListing,
            ListingAction::Delete => Permission::DeleteListing,
            ListingAction::Publish | ListingAction::Restore => Permission::PublishListing,
            ListingAction::Archive => Permission::ArchiveListing,
            ListingAction::ViewApplications => Permission::ViewApplications,
        }
    }

    /// Status the action moves a listing into, for the status-changing ones.
    pub fn target_status(&self) -> Option<ListingStatus> {
        match self {
            ListingAction::Publish | ListingAction::Restore => Some(ListingStatus::Live),
            ListingAction::Archive => Some(ListingStatus::Archive),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListingAction::Edit => "Edit",
            ListingAction::Delete => "Delete",
            ListingAction::Publish => "Publish",
            ListingAction::Archive => "Archive",
            ListingAction::Restore => "Restore",
            ListingAction::ViewApplications => "View applications",
        }
    }
}
