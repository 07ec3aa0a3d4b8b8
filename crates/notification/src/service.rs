use std::sync::Arc;

use async_trait::async_trait;

use beacon_auth::Context;
use beacon_core::{EndpointId, Result, UserId};

use crate::{
    FindOptions, NotificationEndpoint, NotificationEndpointFilter, NotificationEndpointUpdate,
    SecretField,
};

/// CRUD contract for notification endpoints.
///
/// Implemented by the authoritative store and by the authorizing decorator,
/// so either can be handed to a caller.
#[async_trait]
pub trait NotificationEndpointService: Send + Sync {
    async fn find_notification_endpoint_by_id(
        &self,
        ctx: &Context,
        id: EndpointId,
    ) -> Result<NotificationEndpoint>;

    /// Endpoints matching `filter`, plus their count.
    async fn find_notification_endpoints(
        &self,
        ctx: &Context,
        filter: &NotificationEndpointFilter,
        opts: &FindOptions,
    ) -> Result<(Vec<NotificationEndpoint>, usize)>;

    /// Persist a new endpoint owned by `user_id`. On success the endpoint's id
    /// and timestamps are filled in.
    async fn create_notification_endpoint(
        &self,
        ctx: &Context,
        endpoint: &mut NotificationEndpoint,
        user_id: UserId,
    ) -> Result<()>;

    /// Replace the endpoint stored under `id`.
    async fn update_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
        endpoint: NotificationEndpoint,
        user_id: UserId,
    ) -> Result<NotificationEndpoint>;

    async fn patch_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
        update: NotificationEndpointUpdate,
    ) -> Result<NotificationEndpoint>;

    /// Remove the endpoint, returning the secrets it referenced and its id.
    async fn delete_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
    ) -> Result<(Vec<SecretField>, EndpointId)>;
}

#[async_trait]
impl<S> NotificationEndpointService for Arc<S>
where
    S: NotificationEndpointService + ?Sized,
{
    async fn find_notification_endpoint_by_id(
        &self,
        ctx: &Context,
        id: EndpointId,
    ) -> Result<NotificationEndpoint> {
        (**self).find_notification_endpoint_by_id(ctx, id).await
    }

    async fn find_notification_endpoints(
        &self,
        ctx: &Context,
        filter: &NotificationEndpointFilter,
        opts: &FindOptions,
    ) -> Result<(Vec<NotificationEndpoint>, usize)> {
        (**self).find_notification_endpoints(ctx, filter, opts).await
    }

    async fn create_notification_endpoint(
        &self,
        ctx: &Context,
        endpoint: &mut NotificationEndpoint,
        user_id: UserId,
    ) -> Result<()> {
        (**self).create_notification_endpoint(ctx, endpoint, user_id).await
    }

    async fn update_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
        endpoint: NotificationEndpoint,
        user_id: UserId,
    ) -> Result<NotificationEndpoint> {
        (**self).update_notification_endpoint(ctx, id, endpoint, user_id).await
    }

    async fn patch_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
        update: NotificationEndpointUpdate,
    ) -> Result<NotificationEndpoint> {
        (**self).patch_notification_endpoint(ctx, id, update).await
    }

    async fn delete_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
    ) -> Result<(Vec<SecretField>, EndpointId)> {
        (**self).delete_notification_endpoint(ctx, id).await
    }
}
