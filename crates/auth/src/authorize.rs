use std::sync::Arc;

use beacon_core::{Error, Result};

use crate::{Context, Permission};

/// Decide whether the caller bound to `ctx` may perform `permission`.
///
/// - Fails closed: no authorizer on the context is a denial.
/// - Credential failures (inactive token, expired session) surface as-is.
/// - No mutation of the context or the authorizer.
pub fn is_allowed(ctx: &Context, permission: &Permission) -> Result<()> {
    ctx.check_canceled()?;

    let authorizer = ctx.authorizer()?;
    let permissions = authorizer.permission_set()?;

    match permissions.find_grant(permission) {
        Some(grant) => {
            tracing::trace!(
                required = %permission,
                granted_by = %grant,
                authorizer = %authorizer.kind(),
                "permission granted"
            );
            Ok(())
        }
        None => {
            tracing::debug!(
                action = %permission.action(),
                resource_type = %permission.resource_type(),
                org_id = ?permission.org_id(),
                id = ?permission.id(),
                authorizer = %authorizer.kind(),
                authorizer_id = %authorizer.identifier(),
                user_id = %authorizer.user_id(),
                "permission denied"
            );
            Err(Error::unauthorized(format!("{permission} is unauthorized")))
        }
    }
}

/// Permission check used by the authorizing services.
///
/// [`ContextEvaluator`] is the production implementation; the seam exists so
/// a policy source other than the request context can be plugged in.
pub trait PermissionEvaluator: Send + Sync {
    fn is_allowed(&self, ctx: &Context, permission: &Permission) -> Result<()>;

    /// Require a caller to be bound to `ctx` before any resource is touched.
    fn ensure_bound(&self, ctx: &Context) -> Result<()> {
        ctx.authorizer().map(|_| ())
    }
}

impl<E> PermissionEvaluator for Arc<E>
where
    E: PermissionEvaluator + ?Sized,
{
    fn is_allowed(&self, ctx: &Context, permission: &Permission) -> Result<()> {
        (**self).is_allowed(ctx, permission)
    }

    fn ensure_bound(&self, ctx: &Context) -> Result<()> {
        (**self).ensure_bound(ctx)
    }
}

/// Evaluates against the authorizer carried on the request [`Context`].
#[derive(Debug, Copy, Clone, Default)]
pub struct ContextEvaluator;

impl PermissionEvaluator for ContextEvaluator {
    fn is_allowed(&self, ctx: &Context, permission: &Permission) -> Result<()> {
        is_allowed(ctx, permission)
    }
}
