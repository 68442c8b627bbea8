//! Role gating for dashboard controls.

use serde::Serialize;
use uuid::Uuid;

use crate::pkg::internal::{
    auth::{AccessRule, Permission, Role, Session},
    lifecycle::{ListingAction, ListingStatus},
    listing::{Listing, ListingKind},
};

/// Renders its child only for sessions matching the rule. A missing
/// session never passes a gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGate {
    rule: AccessRule,
}

impl RoleGate {
    pub fn new(
        roles: impl IntoIterator<Item = Role>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        RoleGate {
            rule: AccessRule::new(roles, permissions),
        }
    }

    pub fn for_action(kind: ListingKind, action: ListingAction) -> Self {
        RoleGate {
            rule: kind.manage_rule(action.permission()),
        }
    }

    pub fn allows(&self, session: Option<&Session>) -> bool {
        session.is_some_and(|s| self.rule.allows(s))
    }

    pub fn render<T>(&self, session: Option<&Session>, child: impl FnOnce() -> T) -> Option<T> {
        if self.allows(session) {
            Some(child())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlState {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionControl {
    pub action: ListingAction,
    pub label: &'static str,
    pub state: ControlState,
}

/// What a dashboard row needs to decide its controls. `id` is `None` for
/// rows that have not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTarget {
    pub kind: ListingKind,
    pub id: Option<Uuid>,
    pub status: ListingStatus,
    pub owner_id: String,
}

impl<D> From<&Listing<D>> for ActionTarget {
    fn from(listing: &Listing<D>) -> Self {
        ActionTarget {
            kind: listing.kind,
            id: Some(listing.id),
            status: listing.status,
            owner_id: listing.owner_id.clone(),
        }
    }
}

/// Controls for one row: the status decides which actions exist, the gate
/// and ownership decide which of them the session sees. Unsaved rows only
/// get a disabled Edit placeholder.
pub fn listing_actions(target: &ActionTarget, session: Option<&Session>) -> Vec<ActionControl> {
    let manages = session.is_some_and(|s| s.is_admin() || s.owns(&target.owner_id));
    target
        .status
        .actions()
        .iter()
        .filter_map(|&action| {
            // every action addresses the record by id
            if target.id.is_none() {
                return (action == ListingAction::Edit).then(|| ActionControl {
                    action,
                    label: action.label(),
                    state: ControlState::Disabled,
                });
            }
            if !manages {
                return None;
            }
            RoleGate::for_action(target.kind, action).render(session, || ActionControl {
                action,
                label: action.label(),
                state: ControlState::Enabled,
            })
        })
        .collect()
}
