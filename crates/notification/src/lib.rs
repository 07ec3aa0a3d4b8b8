//! `beacon-notification` — notification endpoints and the authorizing service
//! that guards them.
//!
//! [`InMemoryNotificationEndpointService`] is the authoritative store;
//! [`AuthorizingNotificationEndpointService`] wraps any
//! [`NotificationEndpointService`] and enforces permissions from the request
//! [`beacon_auth::Context`].

pub mod authorizer;
pub mod endpoint;
pub mod filter;
pub mod mapping;
pub mod service;
pub mod store;

pub use authorizer::AuthorizingNotificationEndpointService;
pub use endpoint::{
    EndpointKind, EndpointStatus, HttpAuth, HttpMethod, NotificationEndpoint,
    NotificationEndpointUpdate, SecretField,
};
pub use filter::{FindOptions, NotificationEndpointFilter};
pub use mapping::{
    InMemoryUserResourceMappingService, UserResourceMapping, UserResourceMappingFilter,
    UserResourceMappingService, UserType,
};
pub use service::NotificationEndpointService;
pub use store::InMemoryNotificationEndpointService;
