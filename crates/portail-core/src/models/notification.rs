//! Locally synthesized notification records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::records::ConversationSummary;
use crate::util::unix_timestamp_millis;

/// Category of a synthesized notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Message,
    Document,
    Leave,
    Reclamation,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Document => "document",
            Self::Leave => "leave",
            Self::Reclamation => "reclamation",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation hints attached to a notification for consuming UIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMeta {
    /// Identity of the entity the notification was derived from.
    pub entity_id: Option<String>,
    /// Route a consumer should open when the notification is tapped.
    pub route: Option<String>,
    /// Free-form route parameters.
    pub params: Option<serde_json::Value>,
}

/// A notification synthesized from an observed state transition.
///
/// `timestamp` is the creation instant (not the event instant) in Unix
/// milliseconds. `seen` starts out `false`; the notifier's mark-all-seen
/// command only resets the aggregate unseen counter and leaves these flags
/// untouched, mirroring the observed product behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub meta: NotificationMeta,
    pub timestamp: i64,
    pub seen: bool,
}

impl Notification {
    /// Create a notification with a derived unique id.
    ///
    /// The id combines kind, entity identity (random when absent), and the
    /// creation instant, so rapid repeated transitions stay distinct.
    #[must_use]
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        meta: NotificationMeta,
    ) -> Self {
        let timestamp = unix_timestamp_millis();
        let entity = meta
            .entity_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        Self {
            id: format!("{kind}-{entity}-{timestamp}"),
            kind,
            title: title.into(),
            body: body.into(),
            meta,
            timestamp,
            seen: false,
        }
    }

    /// New-message notification for a conversation peer.
    #[must_use]
    pub fn new_message(conversation: &ConversationSummary) -> Self {
        let sender = conversation
            .admin_name
            .clone()
            .unwrap_or_else(|| "l'administration".to_string());
        Self::new(
            NotificationKind::Message,
            "Nouveau message",
            format!("Vous avez un nouveau message de {sender}."),
            NotificationMeta {
                entity_id: Some(conversation.admin_id.clone()),
                route: Some("ChatConversation".to_string()),
                params: Some(json!({
                    "adminId": conversation.admin_id,
                    "adminName": conversation.admin_name,
                })),
            },
        )
    }

    /// Status-change notification for a document request.
    #[must_use]
    pub fn document_update(id: &str, status: &str) -> Self {
        Self::new(
            NotificationKind::Document,
            "Demande de document mise à jour",
            format!("Statut: {status}"),
            NotificationMeta {
                entity_id: Some(id.to_string()),
                route: Some("Documents".to_string()),
                params: None,
            },
        )
    }

    /// Status-change notification for a leave request.
    #[must_use]
    pub fn leave_update(id: &str, status: &str) -> Self {
        Self::new(
            NotificationKind::Leave,
            "Demande de congé mise à jour",
            format!("Statut: {status}"),
            NotificationMeta {
                entity_id: Some(id.to_string()),
                route: Some("Congés".to_string()),
                params: None,
            },
        )
    }

    /// Status-change notification for a réclamation.
    #[must_use]
    pub fn reclamation_update(id: &str, status: &str) -> Self {
        Self::new(
            NotificationKind::Reclamation,
            "Réclamation mise à jour",
            format!("Statut: {status}"),
            NotificationMeta {
                entity_id: Some(id.to_string()),
                route: Some("Réclamations".to_string()),
                params: None,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_id_embeds_kind_and_entity() {
        let notification = Notification::document_update("r1", "En cours");
        assert!(notification.id.starts_with("document-r1-"));
        assert_eq!(notification.kind, NotificationKind::Document);
        assert_eq!(notification.body, "Statut: En cours");
        assert!(!notification.seen);
    }

    #[test]
    fn notification_without_entity_gets_random_id_component() {
        let left = Notification::new(
            NotificationKind::Message,
            "t",
            "b",
            NotificationMeta::default(),
        );
        let right = Notification::new(
            NotificationKind::Message,
            "t",
            "b",
            NotificationMeta::default(),
        );
        assert_ne!(left.id, right.id);
    }

    #[test]
    fn message_notification_falls_back_to_generic_sender() {
        let conversation = ConversationSummary {
            admin_id: "a1".to_string(),
            admin_name: None,
            last_message_at: 1,
        };
        let notification = Notification::new_message(&conversation);
        assert_eq!(
            notification.body,
            "Vous avez un nouveau message de l'administration."
        );
        assert_eq!(notification.meta.route.as_deref(), Some("ChatConversation"));
    }

    #[test]
    fn kind_serializes_lowercase() {
        let rendered = serde_json::to_string(&NotificationKind::Reclamation).unwrap();
        assert_eq!(rendered, "\"reclamation\"");
    }
}
