use serde::{Deserialize, Serialize};

use beacon_core::{EndpointId, OrgId, UserId};

/// Query descriptor for listing notification endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEndpointFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EndpointId>,
    #[serde(rename = "orgID", default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<OrgId>,
    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl NotificationEndpointFilter {
    pub fn for_org(org_id: OrgId) -> Self {
        Self {
            org_id: Some(org_id),
            ..Self::default()
        }
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// The user scope, ignoring a nil user id.
    pub fn user_scope(&self) -> Option<UserId> {
        self.user_id.filter(UserId::is_valid)
    }

    /// Whether the filter narrows the query to an organization or a user.
    pub fn is_scoped(&self) -> bool {
        self.org_id.is_some() || self.user_scope().is_some()
    }
}

/// Paging and ordering for list queries. Results are ordered by name.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub descending: bool,
}
