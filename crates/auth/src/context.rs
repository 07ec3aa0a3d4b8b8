use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use beacon_core::{Error, Result};

use crate::Authorizer;

/// Request-scoped execution context.
///
/// Carries the caller's [`Authorizer`] (attached by the authentication layer)
/// and a cancellation flag shared by every clone derived from the same
/// request. A context is created per request and passed by reference down the
/// call chain; nothing here is process-wide.
#[derive(Debug, Clone, Default)]
pub struct Context {
    authorizer: Option<Arc<dyn Authorizer>>,
    canceled: Arc<AtomicBool>,
}

impl Context {
    /// A context with no authorizer attached.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context carrying `authorizer`. The derived context shares the
    /// cancellation state of `self`.
    pub fn with_authorizer(&self, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            authorizer: Some(authorizer),
            canceled: Arc::clone(&self.canceled),
        }
    }

    /// The authorizer bound to this request.
    ///
    /// A missing authorizer means the request never went through
    /// authentication; treat it as a denial.
    pub fn authorizer(&self) -> Result<&dyn Authorizer> {
        self.authorizer
            .as_deref()
            .ok_or_else(|| Error::unauthorized("authorizer not found on context"))
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// `Err(Canceled)` once [`Context::cancel`] has been called on this
    /// context or any context it shares state with.
    pub fn check_canceled(&self) -> Result<()> {
        if self.is_canceled() {
            return Err(Error::Canceled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Authorization, PermissionSet};
    use beacon_core::{ErrorKind, OrgId, UserId};

    #[test]
    fn background_context_has_no_authorizer() {
        let err = Context::background().authorizer().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn derived_context_shares_cancellation() {
        let root = Context::background();
        let auth = Authorization::new(OrgId::new(), UserId::new(), PermissionSet::default());
        let ctx = root.with_authorizer(Arc::new(auth));

        assert!(ctx.authorizer().is_ok());
        assert!(ctx.check_canceled().is_ok());

        root.cancel();
        assert_eq!(ctx.check_canceled().unwrap_err(), Error::Canceled);
    }
}
