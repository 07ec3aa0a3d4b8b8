//! Error model shared by the authorization layer and the services it guards.

use thiserror::Error;

/// Result type used across the workspace.
pub type Result<T> = core::result::Result<T, Error>;

/// Flat discriminant of [`Error`].
///
/// Callers that need to branch on the class of failure (the list filter in
/// particular) match on this rather than on messages.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    InvalidPermission,
    InvalidId,
    Invalid,
    NotFound,
    Conflict,
    Canceled,
    Internal,
}

/// Workspace-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The caller lacks a permission for the requested operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A permission could not be constructed from the supplied identifiers.
    #[error("invalid permission: {0}")]
    InvalidPermission(String),

    /// An identifier was invalid (e.g. parse failure, nil).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A value failed validation.
    #[error("validation failed: {0}")]
    Invalid(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// The request context was canceled before the operation completed.
    #[error("operation canceled")]
    Canceled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn invalid_permission(msg: impl Into<String>) -> Self {
        Self::InvalidPermission(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::InvalidPermission(_) => ErrorKind::InvalidPermission,
            Self::InvalidId(_) => ErrorKind::InvalidId,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Canceled => ErrorKind::Canceled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }
}
