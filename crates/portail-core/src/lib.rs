//! portail-core - Core library for Portail
//!
//! This crate contains the portal session/auth client, the REST API client
//! with wire-shape normalization, and the delta-tracking notifier shared by
//! all Portail front-ends.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notify;
pub mod util;

pub use api::{ApiError, ApiResult, PortalApiClient};
pub use auth::{AuthError, AuthResult, AuthSession, Employee, PortalAuthClient, Session};
pub use config::{ConfigError, NotifierOptions, PortalConfig};
pub use models::{
    ConversationSummary, DocumentRequest, LeaveRequest, Notification, NotificationKind,
    NotificationMeta, Reclamation,
};
pub use notify::{DeltaNotifier, NotificationFeed, ResourceFetcher};
