//! Notification endpoint model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use beacon_core::{EndpointId, Error, OrgId, Resource, Result};

/// Reference to a secret owned by an endpoint.
///
/// Keys are derived from the endpoint id so a secret store can be purged after
/// the endpoint is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretField {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SecretField {
    fn derived(id: EndpointId, suffix: &str, value: &str) -> Self {
        Self {
            key: format!("{id}-{suffix}"),
            value: Some(value.to_string()),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "authMethod", rename_all = "lowercase")]
pub enum HttpAuth {
    None,
    Basic { username: String, password: String },
    Bearer { token: String },
}

/// Where an endpoint delivers notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EndpointKind {
    Slack {
        url: String,
        #[serde(default)]
        token: Option<String>,
    },
    #[serde(rename = "pagerduty", rename_all = "camelCase")]
    PagerDuty { client_url: String, routing_key: String },
    Http {
        url: String,
        method: HttpMethod,
        auth: HttpAuth,
    },
}

impl EndpointKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EndpointKind::Slack { .. } => "slack",
            EndpointKind::PagerDuty { .. } => "pagerduty",
            EndpointKind::Http { .. } => "http",
        }
    }

    fn target_url(&self) -> &str {
        match self {
            EndpointKind::Slack { url, .. } => url,
            EndpointKind::PagerDuty { client_url, .. } => client_url,
            EndpointKind::Http { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEndpoint {
    pub id: EndpointId,
    #[serde(rename = "orgID")]
    pub org_id: OrgId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: EndpointStatus,
    #[serde(flatten)]
    pub kind: EndpointKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationEndpoint {
    /// A not-yet-persisted endpoint; the store assigns the id on create.
    pub fn new(org_id: OrgId, name: impl Into<String>, kind: EndpointKind) -> Self {
        let now = Utc::now();
        Self {
            id: EndpointId::nil(),
            org_id,
            name: name.into(),
            description: String::new(),
            status: EndpointStatus::Active,
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.org_id.is_valid() {
            return Err(Error::invalid("notification endpoint must belong to a valid organization"));
        }
        if self.name.trim().is_empty() {
            return Err(Error::invalid("notification endpoint name is empty"));
        }
        if self.kind.target_url().trim().is_empty() {
            return Err(Error::invalid(format!(
                "{} notification endpoint url is empty",
                self.kind.type_name()
            )));
        }

        match &self.kind {
            EndpointKind::PagerDuty { routing_key, .. } if routing_key.is_empty() => {
                Err(Error::invalid("pagerduty routing key is empty"))
            }
            EndpointKind::Http {
                auth: HttpAuth::Basic { username, password },
                ..
            } if username.is_empty() || password.is_empty() => {
                Err(Error::invalid("http basic auth requires username and password"))
            }
            EndpointKind::Http {
                auth: HttpAuth::Bearer { token },
                ..
            } if token.is_empty() => Err(Error::invalid("http bearer auth requires a token")),
            _ => Ok(()),
        }
    }

    /// Secrets this endpoint owns, keyed by `<id>-<purpose>`.
    pub fn secret_fields(&self) -> Vec<SecretField> {
        let id = self.id;
        match &self.kind {
            EndpointKind::Slack { token: Some(token), .. } => {
                vec![SecretField::derived(id, "token", token)]
            }
            EndpointKind::Slack { token: None, .. } => vec![],
            EndpointKind::PagerDuty { routing_key, .. } => {
                vec![SecretField::derived(id, "routing-key", routing_key)]
            }
            EndpointKind::Http { auth, .. } => match auth {
                HttpAuth::None => vec![],
                HttpAuth::Basic { username, password } => vec![
                    SecretField::derived(id, "username", username),
                    SecretField::derived(id, "password", password),
                ],
                HttpAuth::Bearer { token } => vec![SecretField::derived(id, "token", token)],
            },
        }
    }
}

impl Resource for NotificationEndpoint {
    type Id = EndpointId;

    fn id(&self) -> EndpointId {
        self.id
    }

    fn org_id(&self) -> OrgId {
        self.org_id
    }
}

/// Partial update applied by `patch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEndpointUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EndpointStatus>,
}

impl NotificationEndpointUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::invalid("notification endpoint name is empty"));
            }
        }
        Ok(())
    }

    pub fn apply(&self, endpoint: &mut NotificationEndpoint) {
        if let Some(name) = &self.name {
            endpoint.name = name.clone();
        }
        if let Some(description) = &self.description {
            endpoint.description = description.clone();
        }
        if let Some(status) = self.status {
            endpoint.status = status;
        }
    }
}
