//! Resource trait: identity + owning organization.

use crate::id::OrgId;

/// A persisted resource that belongs to exactly one organization.
///
/// This is all the authorization layer needs to know about a resource in order
/// to build an instance-scoped permission for it.
pub trait Resource {
    /// Strongly-typed resource identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the resource identifier.
    fn id(&self) -> Self::Id;

    /// Returns the organization that owns the resource.
    fn org_id(&self) -> OrgId;
}
