//! Domain models shared by the API client and the notifier.

pub mod notification;
pub mod records;

pub use notification::{Notification, NotificationKind, NotificationMeta};
pub use records::{ConversationSummary, DocumentRequest, LeaveRequest, Reclamation};
