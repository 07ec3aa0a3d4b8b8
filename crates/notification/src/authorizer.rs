//! Authorizing decorator for [`NotificationEndpointService`].
//!
//! Every call is checked against the caller's permissions before it reaches
//! the wrapped service. A context with no caller bound is rejected before the
//! wrapped service is called at all. Otherwise:
//!
//! - single-item reads fetch first, then check `read` on the fetched endpoint
//! - writes on an existing endpoint re-fetch it (authorized read) and check
//!   `write` against its stored organization, never the caller's payload
//! - create checks `write` on the declared organization, since no endpoint
//!   exists yet
//! - lists drop the endpoints the caller may not read, but abort on any other
//!   failure

use async_trait::async_trait;

use beacon_auth::{
    Action, Context, ContextEvaluator, Permission, PermissionEvaluator, ResourceType,
};
use beacon_core::{EndpointId, Error, OrgId, Resource, Result, UserId};

use crate::{
    FindOptions, NotificationEndpoint, NotificationEndpointFilter, NotificationEndpointService,
    NotificationEndpointUpdate, SecretField,
};

/// Wraps a [`NotificationEndpointService`] and authorizes every call against
/// the permissions on the request [`Context`].
#[derive(Debug, Clone)]
pub struct AuthorizingNotificationEndpointService<S, E = ContextEvaluator> {
    inner: S,
    evaluator: E,
}

impl<S> AuthorizingNotificationEndpointService<S> {
    pub fn new(inner: S) -> Self {
        Self::with_evaluator(inner, ContextEvaluator)
    }
}

impl<S, E> AuthorizingNotificationEndpointService<S, E> {
    pub fn with_evaluator(inner: S, evaluator: E) -> Self {
        Self { inner, evaluator }
    }
}

fn endpoint_permission(action: Action, org_id: OrgId, id: EndpointId) -> Result<Permission> {
    Permission::at_id(action, ResourceType::NotificationEndpoints, org_id, id)
}

impl<S, E> AuthorizingNotificationEndpointService<S, E>
where
    S: NotificationEndpointService,
    E: PermissionEvaluator,
{
    fn authorize(
        &self,
        ctx: &Context,
        action: Action,
        endpoint: &NotificationEndpoint,
    ) -> Result<()> {
        let permission = endpoint_permission(action, endpoint.org_id(), endpoint.id())?;
        self.evaluator.is_allowed(ctx, &permission)
    }

    /// Fetch `id` and require read access to it.
    async fn find_readable(&self, ctx: &Context, id: EndpointId) -> Result<NotificationEndpoint> {
        self.evaluator.ensure_bound(ctx)?;
        let endpoint = self.inner.find_notification_endpoint_by_id(ctx, id).await?;
        self.authorize(ctx, Action::Read, &endpoint)?;
        Ok(endpoint)
    }

    /// Fetch `id`, require read access, then write access on the stored
    /// endpoint's organization.
    async fn find_writable(&self, ctx: &Context, id: EndpointId) -> Result<NotificationEndpoint> {
        let endpoint = self.find_readable(ctx, id).await?;
        self.authorize(ctx, Action::Write, &endpoint)?;
        Ok(endpoint)
    }
}

#[async_trait]
impl<S, E> NotificationEndpointService for AuthorizingNotificationEndpointService<S, E>
where
    S: NotificationEndpointService,
    E: PermissionEvaluator,
{
    async fn find_notification_endpoint_by_id(
        &self,
        ctx: &Context,
        id: EndpointId,
    ) -> Result<NotificationEndpoint> {
        self.find_readable(ctx, id).await
    }

    async fn find_notification_endpoints(
        &self,
        ctx: &Context,
        filter: &NotificationEndpointFilter,
        opts: &FindOptions,
    ) -> Result<(Vec<NotificationEndpoint>, usize)> {
        // An unscoped query would load the whole collection before any
        // per-item check could run.
        if !filter.is_scoped() {
            return Err(Error::unauthorized(
                "cannot process a request without a org or user filter",
            ));
        }
        self.evaluator.ensure_bound(ctx)?;

        let (endpoints, _) = self.inner.find_notification_endpoints(ctx, filter, opts).await?;

        let mut authorized = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            match self.authorize(ctx, Action::Read, &endpoint) {
                Ok(()) => authorized.push(endpoint),
                Err(err) if err.is_unauthorized() => {
                    tracing::debug!(
                        id = %endpoint.id,
                        org_id = %endpoint.org_id,
                        "notification endpoint filtered from list"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        id = %endpoint.id,
                        error = %err,
                        "authorizing notification endpoint list failed"
                    );
                    return Err(err);
                }
            }
        }

        let count = authorized.len();
        Ok((authorized, count))
    }

    async fn create_notification_endpoint(
        &self,
        ctx: &Context,
        endpoint: &mut NotificationEndpoint,
        user_id: UserId,
    ) -> Result<()> {
        self.evaluator.ensure_bound(ctx)?;
        let permission = Permission::new(
            Action::Write,
            ResourceType::NotificationEndpoints,
            endpoint.org_id,
        )?;
        self.evaluator.is_allowed(ctx, &permission)?;

        self.inner
            .create_notification_endpoint(ctx, endpoint, user_id)
            .await
    }

    async fn update_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
        endpoint: NotificationEndpoint,
        user_id: UserId,
    ) -> Result<NotificationEndpoint> {
        self.find_writable(ctx, id).await?;
        self.inner
            .update_notification_endpoint(ctx, id, endpoint, user_id)
            .await
    }

    async fn patch_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
        update: NotificationEndpointUpdate,
    ) -> Result<NotificationEndpoint> {
        self.find_writable(ctx, id).await?;
        self.inner.patch_notification_endpoint(ctx, id, update).await
    }

    async fn delete_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
    ) -> Result<(Vec<SecretField>, EndpointId)> {
        self.find_writable(ctx, id).await?;
        self.inner.delete_notification_endpoint(ctx, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use beacon_auth::{Authorization, PermissionSet};
    use beacon_core::ErrorKind;

    use crate::{EndpointKind, InMemoryNotificationEndpointService};

    fn slack(org: OrgId, name: &str) -> NotificationEndpoint {
        NotificationEndpoint::new(
            org,
            name,
            EndpointKind::Slack {
                url: "https://hooks.slack.com/services/x".to_string(),
                token: None,
            },
        )
    }

    const ENDPOINTS: ResourceType = ResourceType::NotificationEndpoints;

    fn ctx_with(permissions: Vec<Permission>) -> Context {
        let auth = Authorization::new(OrgId::new(), UserId::new(), PermissionSet::new(permissions));
        Context::background().with_authorizer(Arc::new(auth))
    }

    type Authorizing = AuthorizingNotificationEndpointService<InMemoryNotificationEndpointService>;

    fn authorizing_store() -> Authorizing {
        AuthorizingNotificationEndpointService::new(InMemoryNotificationEndpointService::new())
    }

    #[tokio::test]
    async fn read_and_write_follow_org_grants() {
        let org = OrgId::new();
        let inner = Arc::new(InMemoryNotificationEndpointService::new());
        let mut edp = slack(org, "alerts");
        inner
            .create_notification_endpoint(&Context::background(), &mut edp, UserId::new())
            .await
            .unwrap();

        let svc = AuthorizingNotificationEndpointService::new(inner);
        let reader = ctx_with(vec![
            Permission::new(Action::Read, ENDPOINTS, org).unwrap(),
        ]);

        assert_eq!(svc.find_notification_endpoint_by_id(&reader, edp.id).await.unwrap(), edp);

        let err = svc
            .patch_notification_endpoint(&reader, edp.id, NotificationEndpointUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn create_requires_org_write() {
        let org = OrgId::new();
        let svc = authorizing_store();
        let writer = ctx_with(vec![
            Permission::new(Action::Write, ENDPOINTS, org).unwrap(),
        ]);

        let mut ok = slack(org, "alerts");
        svc.create_notification_endpoint(&writer, &mut ok, UserId::new()).await.unwrap();
        assert!(ok.id.is_valid());

        let mut elsewhere = slack(OrgId::new(), "alerts");
        let err = svc
            .create_notification_endpoint(&writer, &mut elsewhere, UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(!elsewhere.id.is_valid());
    }

    #[tokio::test]
    async fn create_with_nil_org_is_invalid_permission() {
        let svc = authorizing_store();
        let ctx = ctx_with(vec![Permission::global(Action::Write, ENDPOINTS)]);

        let mut edp = slack(OrgId::nil(), "alerts");
        let err = svc
            .create_notification_endpoint(&ctx, &mut edp, UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPermission);
    }

    #[tokio::test]
    async fn missing_endpoint_passes_through_not_found() {
        let svc = authorizing_store();
        let ctx = ctx_with(vec![Permission::global(Action::Read, ENDPOINTS)]);

        let err = svc
            .find_notification_endpoint_by_id(&ctx, EndpointId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn unbound_context_is_rejected_before_lookup() {
        let svc = authorizing_store();

        // The store would answer NotFound; the missing caller wins.
        let err = svc
            .find_notification_endpoint_by_id(&Context::background(), EndpointId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = svc
            .find_notification_endpoints(
                &Context::background(),
                &NotificationEndpointFilter::for_org(OrgId::new()),
                &FindOptions::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
