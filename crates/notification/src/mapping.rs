//! User ↔ resource relationships (ownership and membership).

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use beacon_auth::{Context, ResourceType};
use beacon_core::{Error, Result, UserId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Owner,
    Member,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResourceMapping {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub user_type: UserType,
    pub resource_type: ResourceType,
    #[serde(rename = "resourceID")]
    pub resource_id: Uuid,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct UserResourceMappingFilter {
    pub user_id: Option<UserId>,
    pub user_type: Option<UserType>,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<Uuid>,
}

impl UserResourceMappingFilter {
    fn matches(&self, m: &UserResourceMapping) -> bool {
        self.user_id.is_none_or(|u| u == m.user_id)
            && self.user_type.is_none_or(|t| t == m.user_type)
            && self.resource_type.is_none_or(|t| t == m.resource_type)
            && self.resource_id.is_none_or(|r| r == m.resource_id)
    }
}

#[async_trait]
pub trait UserResourceMappingService: Send + Sync {
    async fn find_user_resource_mappings(
        &self,
        ctx: &Context,
        filter: &UserResourceMappingFilter,
    ) -> Result<Vec<UserResourceMapping>>;

    /// Fails with `Conflict` if the user is already mapped to the resource.
    async fn create_user_resource_mapping(
        &self,
        ctx: &Context,
        mapping: UserResourceMapping,
    ) -> Result<()>;

    async fn delete_user_resource_mapping(
        &self,
        ctx: &Context,
        resource_id: Uuid,
        user_id: UserId,
    ) -> Result<()>;
}

#[async_trait]
impl<S> UserResourceMappingService for Arc<S>
where
    S: UserResourceMappingService + ?Sized,
{
    async fn find_user_resource_mappings(
        &self,
        ctx: &Context,
        filter: &UserResourceMappingFilter,
    ) -> Result<Vec<UserResourceMapping>> {
        (**self).find_user_resource_mappings(ctx, filter).await
    }

    async fn create_user_resource_mapping(
        &self,
        ctx: &Context,
        mapping: UserResourceMapping,
    ) -> Result<()> {
        (**self).create_user_resource_mapping(ctx, mapping).await
    }

    async fn delete_user_resource_mapping(
        &self,
        ctx: &Context,
        resource_id: Uuid,
        user_id: UserId,
    ) -> Result<()> {
        (**self).delete_user_resource_mapping(ctx, resource_id, user_id).await
    }
}

/// In-memory mapping store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserResourceMappingService {
    inner: RwLock<Vec<UserResourceMapping>>,
}

impl InMemoryUserResourceMappingService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserResourceMappingService for InMemoryUserResourceMappingService {
    async fn find_user_resource_mappings(
        &self,
        ctx: &Context,
        filter: &UserResourceMappingFilter,
    ) -> Result<Vec<UserResourceMapping>> {
        ctx.check_canceled()?;
        let mappings = self
            .inner
            .read()
            .map_err(|_| Error::internal("lock poisoned"))?;

        Ok(mappings.iter().filter(|m| filter.matches(m)).copied().collect())
    }

    async fn create_user_resource_mapping(
        &self,
        ctx: &Context,
        mapping: UserResourceMapping,
    ) -> Result<()> {
        ctx.check_canceled()?;
        let mut mappings = self
            .inner
            .write()
            .map_err(|_| Error::internal("lock poisoned"))?;

        if mappings
            .iter()
            .any(|m| m.user_id == mapping.user_id && m.resource_id == mapping.resource_id)
        {
            return Err(Error::conflict("user resource mapping already exists"));
        }
        mappings.push(mapping);
        Ok(())
    }

    async fn delete_user_resource_mapping(
        &self,
        ctx: &Context,
        resource_id: Uuid,
        user_id: UserId,
    ) -> Result<()> {
        ctx.check_canceled()?;
        let mut mappings = self
            .inner
            .write()
            .map_err(|_| Error::internal("lock poisoned"))?;

        let before = mappings.len();
        mappings.retain(|m| !(m.resource_id == resource_id && m.user_id == user_id));
        if mappings.len() == before {
            return Err(Error::not_found("user resource mapping not found"));
        }
        Ok(())
    }
}
