use serde::{Deserialize, Serialize};
use uuid::Uuid;

use beacon_core::{Error, OrgId, Result};

/// What a permission allows doing to a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class of resource a permission applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    NotificationEndpoints,
    NotificationRules,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::NotificationEndpoints => "notificationEndpoints",
            ResourceType::NotificationRules => "notificationRules",
        }
    }
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resource part of a permission: a type, optionally narrowed to an
/// organization and/or a single instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceScope {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    #[serde(rename = "orgID", default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<OrgId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

/// An action on a resource scope.
///
/// Used both as a *grant* (an entry in a caller's [`PermissionSet`]) and as a
/// *requirement* (built by a service before it touches a resource). Values are
/// immutable once built; every constructor validates identifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPermission")]
pub struct Permission {
    action: Action,
    resource: ResourceScope,
}

#[derive(Deserialize)]
struct RawPermission {
    action: Action,
    resource: ResourceScope,
}

impl TryFrom<RawPermission> for Permission {
    type Error = Error;

    fn try_from(raw: RawPermission) -> Result<Self> {
        let p = Permission {
            action: raw.action,
            resource: raw.resource,
        };
        p.validate()?;
        Ok(p)
    }
}

impl Permission {
    /// Permission on every resource of `resource_type` within one organization.
    pub fn new(action: Action, resource_type: ResourceType, org_id: OrgId) -> Result<Self> {
        let p = Self {
            action,
            resource: ResourceScope {
                resource_type,
                org_id: Some(org_id),
                id: None,
            },
        };
        p.validate()?;
        Ok(p)
    }

    /// Permission on a single resource instance, bound to the organization
    /// that owns it.
    pub fn at_id(
        action: Action,
        resource_type: ResourceType,
        org_id: OrgId,
        id: impl Into<Uuid>,
    ) -> Result<Self> {
        let p = Self {
            action,
            resource: ResourceScope {
                resource_type,
                org_id: Some(org_id),
                id: Some(id.into()),
            },
        };
        p.validate()?;
        Ok(p)
    }

    /// Permission on every resource of `resource_type` in every organization.
    pub fn global(action: Action, resource_type: ResourceType) -> Self {
        Self {
            action,
            resource: ResourceScope {
                resource_type,
                org_id: None,
                id: None,
            },
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource.resource_type
    }

    pub fn org_id(&self) -> Option<OrgId> {
        self.resource.org_id
    }

    pub fn id(&self) -> Option<Uuid> {
        self.resource.id
    }

    pub fn resource(&self) -> &ResourceScope {
        &self.resource
    }

    /// Reject scopes that name a nil organization or instance.
    pub fn validate(&self) -> Result<()> {
        if let Some(org_id) = self.resource.org_id {
            if !org_id.is_valid() {
                return Err(Error::invalid_permission(format!(
                    "{}: organization id is invalid",
                    self.resource.resource_type
                )));
            }
        }
        if let Some(id) = self.resource.id {
            if id.is_nil() {
                return Err(Error::invalid_permission(format!(
                    "{}: resource id is invalid",
                    self.resource.resource_type
                )));
            }
        }
        Ok(())
    }

    /// Whether this permission, held as a grant, satisfies `required`.
    ///
    /// Action and resource type must be identical. A grant without an
    /// organization covers every organization; a grant without an id covers
    /// every instance inside its scope.
    pub fn matches(&self, required: &Permission) -> bool {
        if self.action != required.action
            || self.resource.resource_type != required.resource.resource_type
        {
            return false;
        }

        match (self.resource.org_id, self.resource.id) {
            (None, None) => true,
            (Some(org_id), None) => required.resource.org_id == Some(org_id),
            (None, Some(id)) => required.resource.id == Some(id),
            (Some(org_id), Some(id)) => {
                required.resource.org_id == Some(org_id) && required.resource.id == Some(id)
            }
        }
    }
}

impl core::fmt::Display for Permission {
    /// `read:orgs/<org>/notificationEndpoints/<id>`
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:", self.action)?;
        if let Some(org_id) = self.resource.org_id {
            write!(f, "orgs/{org_id}/")?;
        }
        f.write_str(self.resource.resource_type.as_str())?;
        if let Some(id) = self.resource.id {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

/// The permissions granted to a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<Permission>);

impl PermissionSet {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self(permissions)
    }

    /// The first grant that subsumes `required`, if any.
    pub fn find_grant(&self, required: &Permission) -> Option<&Permission> {
        self.0.iter().find(|granted| granted.matches(required))
    }

    pub fn allowed(&self, required: &Permission) -> bool {
        self.find_grant(required).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
