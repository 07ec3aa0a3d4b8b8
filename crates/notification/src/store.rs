use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use beacon_auth::{Context, ResourceType};
use beacon_core::{EndpointId, Error, OrgId, Result, UserId};

use crate::mapping::{
    InMemoryUserResourceMappingService, UserResourceMapping, UserResourceMappingFilter,
    UserResourceMappingService, UserType,
};
use crate::{
    FindOptions, NotificationEndpoint, NotificationEndpointFilter, NotificationEndpointService,
    NotificationEndpointUpdate, SecretField,
};

/// In-memory notification endpoint store for tests/dev.
///
/// Authoritative for endpoint data only: it performs no authorization. Wrap it
/// in [`crate::AuthorizingNotificationEndpointService`] before exposing it.
#[derive(Debug)]
pub struct InMemoryNotificationEndpointService<M = Arc<InMemoryUserResourceMappingService>> {
    endpoints: RwLock<HashMap<EndpointId, NotificationEndpoint>>,
    mappings: M,
}

impl InMemoryNotificationEndpointService {
    pub fn new() -> Self {
        Self::with_mappings(Arc::new(InMemoryUserResourceMappingService::new()))
    }
}

impl Default for InMemoryNotificationEndpointService {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> InMemoryNotificationEndpointService<M>
where
    M: UserResourceMappingService,
{
    pub fn with_mappings(mappings: M) -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            mappings,
        }
    }

    pub fn mappings(&self) -> &M {
        &self.mappings
    }

    /// Ids of the endpoints `user_id` is mapped to.
    async fn endpoints_for_user(&self, ctx: &Context, user_id: UserId) -> Result<HashSet<Uuid>> {
        let filter = UserResourceMappingFilter {
            user_id: Some(user_id),
            resource_type: Some(ResourceType::NotificationEndpoints),
            ..Default::default()
        };
        let mappings = self.mappings.find_user_resource_mappings(ctx, &filter).await?;
        Ok(mappings.into_iter().map(|m| m.resource_id).collect())
    }

    fn name_taken(
        endpoints: &HashMap<EndpointId, NotificationEndpoint>,
        org_id: OrgId,
        name: &str,
        except: EndpointId,
    ) -> bool {
        endpoints
            .values()
            .any(|e| e.id != except && e.org_id == org_id && e.name == name)
    }
}

fn not_found() -> Error {
    Error::not_found("notification endpoint not found")
}

#[async_trait]
impl<M> NotificationEndpointService for InMemoryNotificationEndpointService<M>
where
    M: UserResourceMappingService,
{
    async fn find_notification_endpoint_by_id(
        &self,
        ctx: &Context,
        id: EndpointId,
    ) -> Result<NotificationEndpoint> {
        ctx.check_canceled()?;
        let endpoints = self
            .endpoints
            .read()
            .map_err(|_| Error::internal("lock poisoned"))?;

        endpoints.get(&id).cloned().ok_or_else(not_found)
    }

    async fn find_notification_endpoints(
        &self,
        ctx: &Context,
        filter: &NotificationEndpointFilter,
        opts: &FindOptions,
    ) -> Result<(Vec<NotificationEndpoint>, usize)> {
        ctx.check_canceled()?;

        let owned = match filter.user_scope() {
            Some(user_id) => Some(self.endpoints_for_user(ctx, user_id).await?),
            None => None,
        };

        let mut matched: Vec<NotificationEndpoint> = {
            let endpoints = self
                .endpoints
                .read()
                .map_err(|_| Error::internal("lock poisoned"))?;

            endpoints
                .values()
                .filter(|e| filter.id.is_none_or(|id| id == e.id))
                .filter(|e| filter.org_id.is_none_or(|org| org == e.org_id))
                .filter(|e| owned.as_ref().is_none_or(|ids| ids.contains(e.id.as_uuid())))
                .cloned()
                .collect()
        };

        matched.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        if opts.descending {
            matched.reverse();
        }

        let total = matched.len();
        let page: Vec<NotificationEndpoint> = matched
            .into_iter()
            .skip(opts.offset)
            .take(opts.limit.unwrap_or(usize::MAX))
            .collect();

        Ok((page, total))
    }

    async fn create_notification_endpoint(
        &self,
        ctx: &Context,
        endpoint: &mut NotificationEndpoint,
        user_id: UserId,
    ) -> Result<()> {
        ctx.check_canceled()?;
        endpoint.validate()?;
        if !user_id.is_valid() {
            return Err(Error::invalid("notification endpoint owner is invalid"));
        }

        {
            let mut endpoints = self
                .endpoints
                .write()
                .map_err(|_| Error::internal("lock poisoned"))?;

            if Self::name_taken(&endpoints, endpoint.org_id, &endpoint.name, EndpointId::nil()) {
                return Err(Error::conflict(format!(
                    "notification endpoint with name {} already exists",
                    endpoint.name
                )));
            }

            let now = Utc::now();
            endpoint.id = EndpointId::new();
            endpoint.created_at = now;
            endpoint.updated_at = now;
            endpoints.insert(endpoint.id, endpoint.clone());
        }

        let owner = UserResourceMapping {
            user_id,
            user_type: UserType::Owner,
            resource_type: ResourceType::NotificationEndpoints,
            resource_id: *endpoint.id.as_uuid(),
        };
        if let Err(err) = self.mappings.create_user_resource_mapping(ctx, owner).await {
            // Roll back so the endpoint is never left without an owner.
            if let Ok(mut endpoints) = self.endpoints.write() {
                endpoints.remove(&endpoint.id);
            }
            return Err(err);
        }

        tracing::debug!(
            id = %endpoint.id,
            org_id = %endpoint.org_id,
            kind = endpoint.kind.type_name(),
            "notification endpoint created"
        );
        Ok(())
    }

    async fn update_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
        endpoint: NotificationEndpoint,
        user_id: UserId,
    ) -> Result<NotificationEndpoint> {
        ctx.check_canceled()?;
        let mut endpoints = self
            .endpoints
            .write()
            .map_err(|_| Error::internal("lock poisoned"))?;

        let existing = endpoints.get(&id).ok_or_else(not_found)?;

        // Identity, tenancy and creation time are owned by the store.
        let updated = NotificationEndpoint {
            id: existing.id,
            org_id: existing.org_id,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..endpoint
        };
        updated.validate()?;

        if Self::name_taken(&endpoints, updated.org_id, &updated.name, id) {
            return Err(Error::conflict(format!(
                "notification endpoint with name {} already exists",
                updated.name
            )));
        }

        endpoints.insert(id, updated.clone());
        tracing::debug!(%id, %user_id, "notification endpoint updated");
        Ok(updated)
    }

    async fn patch_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
        update: NotificationEndpointUpdate,
    ) -> Result<NotificationEndpoint> {
        ctx.check_canceled()?;
        update.validate()?;

        let mut endpoints = self
            .endpoints
            .write()
            .map_err(|_| Error::internal("lock poisoned"))?;

        let org_id = endpoints.get(&id).ok_or_else(not_found)?.org_id;
        if let Some(name) = &update.name {
            if Self::name_taken(&endpoints, org_id, name, id) {
                return Err(Error::conflict(format!(
                    "notification endpoint with name {name} already exists"
                )));
            }
        }

        let endpoint = endpoints.get_mut(&id).ok_or_else(not_found)?;
        update.apply(endpoint);
        endpoint.updated_at = Utc::now();

        Ok(endpoint.clone())
    }

    async fn delete_notification_endpoint(
        &self,
        ctx: &Context,
        id: EndpointId,
    ) -> Result<(Vec<SecretField>, EndpointId)> {
        ctx.check_canceled()?;
        let removed = {
            let mut endpoints = self
                .endpoints
                .write()
                .map_err(|_| Error::internal("lock poisoned"))?;
            endpoints.remove(&id).ok_or_else(not_found)?
        };

        let filter = UserResourceMappingFilter {
            resource_id: Some(*id.as_uuid()),
            ..Default::default()
        };
        for mapping in self.mappings.find_user_resource_mappings(ctx, &filter).await? {
            self.mappings
                .delete_user_resource_mapping(ctx, mapping.resource_id, mapping.user_id)
                .await?;
        }

        tracing::debug!(%id, "notification endpoint deleted");
        Ok((removed.secret_fields(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EndpointKind;
    use beacon_core::ErrorKind;

    fn for_user(user: UserId) -> NotificationEndpointFilter {
        NotificationEndpointFilter::for_user(user)
    }

    fn pagerduty(org: OrgId, name: &str) -> NotificationEndpoint {
        NotificationEndpoint::new(
            org,
            name,
            EndpointKind::PagerDuty {
                client_url: "https://events.pagerduty.com/v2/enqueue".to_string(),
                routing_key: "rk-123".to_string(),
            },
        )
    }

    async fn seeded(
        svc: &InMemoryNotificationEndpointService,
        org: OrgId,
        user: UserId,
        names: &[&str],
    ) -> Vec<NotificationEndpoint> {
        let ctx = Context::background();
        let mut out = Vec::new();
        for name in names {
            let mut edp = pagerduty(org, name);
            svc.create_notification_endpoint(&ctx, &mut edp, user).await.unwrap();
            out.push(edp);
        }
        out
    }

    #[tokio::test]
    async fn create_assigns_id_and_owner() {
        let ctx = Context::background();
        let svc = InMemoryNotificationEndpointService::new();
        let user = UserId::new();

        let mut edp = pagerduty(OrgId::new(), "pd");
        svc.create_notification_endpoint(&ctx, &mut edp, user).await.unwrap();
        assert!(edp.id.is_valid());

        let found = svc.find_notification_endpoint_by_id(&ctx, edp.id).await.unwrap();
        assert_eq!(found, edp);

        let (mine, count) = svc
            .find_notification_endpoints(&ctx, &for_user(user), &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(mine[0].id, edp.id);

        let owners = UserResourceMappingFilter {
            user_type: Some(UserType::Owner),
            resource_id: Some(*edp.id.as_uuid()),
            ..Default::default()
        };
        let mapped = svc.mappings().find_user_resource_mappings(&ctx, &owners).await.unwrap();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].user_id, user);
    }

    #[tokio::test]
    async fn user_scope_includes_member_mappings() {
        let ctx = Context::background();
        let svc = InMemoryNotificationEndpointService::new();
        let created = seeded(&svc, OrgId::new(), UserId::new(), &["a", "b"]).await;
        let member = UserId::new();

        svc.mappings()
            .create_user_resource_mapping(
                &ctx,
                UserResourceMapping {
                    user_id: member,
                    user_type: UserType::Member,
                    resource_type: ResourceType::NotificationEndpoints,
                    resource_id: *created[1].id.as_uuid(),
                },
            )
            .await
            .unwrap();

        let (shared, count) = svc
            .find_notification_endpoints(&ctx, &for_user(member), &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(shared[0].id, created[1].id);
    }

    #[tokio::test]
    async fn duplicate_name_in_org_conflicts() {
        let ctx = Context::background();
        let svc = InMemoryNotificationEndpointService::new();
        let org = OrgId::new();
        seeded(&svc, org, UserId::new(), &["pd"]).await;

        let mut dup = pagerduty(org, "pd");
        let err = svc
            .create_notification_endpoint(&ctx, &mut dup, UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // Same name in another org is fine.
        let mut other = pagerduty(OrgId::new(), "pd");
        svc.create_notification_endpoint(&ctx, &mut other, UserId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn list_orders_and_pages() {
        let ctx = Context::background();
        let svc = InMemoryNotificationEndpointService::new();
        let org = OrgId::new();
        seeded(&svc, org, UserId::new(), &["c", "a", "b"]).await;
        seeded(&svc, OrgId::new(), UserId::new(), &["other-org"]).await;

        let filter = NotificationEndpointFilter::for_org(org);
        let (all, total) = svc
            .find_notification_endpoints(&ctx, &filter, &FindOptions::default())
            .await
            .unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(total, 3);

        let opts = FindOptions {
            limit: Some(1),
            offset: 1,
            descending: true,
        };
        let (page, total) = svc.find_notification_endpoints(&ctx, &filter, &opts).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "b");
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn update_keeps_store_owned_fields() {
        let ctx = Context::background();
        let svc = InMemoryNotificationEndpointService::new();
        let org = OrgId::new();
        let created = seeded(&svc, org, UserId::new(), &["pd"]).await.remove(0);

        let mut replacement = pagerduty(OrgId::new(), "renamed");
        replacement.id = EndpointId::new();
        let updated = svc
            .update_notification_endpoint(&ctx, created.id, replacement, UserId::new())
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.org_id, org);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "renamed");
    }

    #[tokio::test]
    async fn patch_and_delete() {
        let ctx = Context::background();
        let svc = InMemoryNotificationEndpointService::new();
        let user = UserId::new();
        let created = seeded(&svc, OrgId::new(), user, &["pd", "pd-2"]).await;

        let rename_to_taken = NotificationEndpointUpdate {
            name: Some("pd-2".to_string()),
            ..Default::default()
        };
        let err = svc
            .patch_notification_endpoint(&ctx, created[0].id, rename_to_taken)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let describe = NotificationEndpointUpdate {
            description: Some("paging".to_string()),
            ..Default::default()
        };
        let patched = svc
            .patch_notification_endpoint(&ctx, created[0].id, describe)
            .await
            .unwrap();
        assert_eq!(patched.description, "paging");

        let (secrets, id) = svc.delete_notification_endpoint(&ctx, created[0].id).await.unwrap();
        assert_eq!(id, created[0].id);
        assert_eq!(secrets[0].key, format!("{}-routing-key", id));

        let err = svc.find_notification_endpoint_by_id(&ctx, id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let (mine, _) = svc
            .find_notification_endpoints(&ctx, &for_user(user), &FindOptions::default())
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn canceled_context_is_honoured() {
        let ctx = Context::background();
        let svc = InMemoryNotificationEndpointService::new();
        ctx.cancel();

        let err = svc
            .find_notification_endpoint_by_id(&ctx, EndpointId::new())
            .await
            .unwrap_err();
        assert_eq!(err, Error::Canceled);
    }
}
