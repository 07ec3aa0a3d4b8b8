//! `beacon-core` — identifiers and the shared error model.
//!
//! This crate has no knowledge of authorization or storage.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Resource;
pub use error::{Error, ErrorKind, Result};
pub use id::{AuthorizationId, EndpointId, OrgId, SessionId, UserId};
