//! `beacon-auth` — permission evaluation boundary.
//!
//! This crate evaluates permissions; it never creates or revokes them and
//! knows nothing about storage or transport.

pub mod authorize;
pub mod authorizer;
pub mod context;
pub mod permissions;

pub use authorize::{ContextEvaluator, PermissionEvaluator, is_allowed};
pub use authorizer::{Authorization, AuthorizationStatus, Authorizer, AuthorizerKind, Session};
pub use context::Context;
pub use permissions::{Action, Permission, PermissionSet, ResourceScope, ResourceType};
