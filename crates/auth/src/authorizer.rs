use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use beacon_core::{AuthorizationId, Error, OrgId, Result, SessionId, UserId};

use crate::PermissionSet;

/// Which kind of credential produced an authorizer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizerKind {
    Authorization,
    Session,
}

impl core::fmt::Display for AuthorizerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AuthorizerKind::Authorization => f.write_str("authorization"),
            AuthorizerKind::Session => f.write_str("session"),
        }
    }
}

/// An authenticated caller, as seen by permission evaluation.
///
/// Built by the authentication layer and attached to a [`crate::Context`].
/// Evaluation only ever reads it.
pub trait Authorizer: Send + Sync + core::fmt::Debug {
    /// The permissions currently granted to the caller.
    ///
    /// Fails with `Unauthorized` when the credential itself is no longer
    /// usable (inactive token, expired session).
    fn permission_set(&self) -> Result<&PermissionSet>;

    /// Identifier of the credential (token or session id).
    fn identifier(&self) -> Uuid;

    fn user_id(&self) -> UserId;

    fn kind(&self) -> AuthorizerKind;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Active,
    Inactive,
}

/// An API token issued to a user within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub id: AuthorizationId,
    pub org_id: OrgId,
    pub user_id: UserId,
    #[serde(default)]
    pub description: String,
    pub status: AuthorizationStatus,
    pub permissions: PermissionSet,
}

impl Authorization {
    /// An active token carrying `permissions`.
    pub fn new(org_id: OrgId, user_id: UserId, permissions: PermissionSet) -> Self {
        Self {
            id: AuthorizationId::new(),
            org_id,
            user_id,
            description: String::new(),
            status: AuthorizationStatus::Active,
            permissions,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AuthorizationStatus::Active
    }
}

impl Authorizer for Authorization {
    fn permission_set(&self) -> Result<&PermissionSet> {
        if !self.is_active() {
            return Err(Error::unauthorized("token is inactive"));
        }
        Ok(&self.permissions)
    }

    fn identifier(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn kind(&self) -> AuthorizerKind {
        AuthorizerKind::Authorization
    }
}

/// A time-boxed login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub permissions: PermissionSet,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: UserId,
        permissions: PermissionSet,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            permissions,
            created_at,
            expires_at,
        }
    }

    /// Deterministically check the session window against `now`.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<()> {
        if self.expires_at <= self.created_at {
            return Err(Error::unauthorized("invalid session time window"));
        }
        if now < self.created_at {
            return Err(Error::unauthorized("session not yet valid"));
        }
        if now >= self.expires_at {
            return Err(Error::unauthorized("session has expired"));
        }
        Ok(())
    }
}

impl Authorizer for Session {
    fn permission_set(&self) -> Result<&PermissionSet> {
        self.validate_at(Utc::now())?;
        Ok(&self.permissions)
    }

    fn identifier(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn kind(&self) -> AuthorizerKind {
        AuthorizerKind::Session
    }
}
