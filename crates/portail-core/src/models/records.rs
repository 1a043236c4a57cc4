//! Canonical resource records produced by the API client.
//!
//! The backend delivers several spellings for the same fields (`id` vs
//! `_id`, `statut` vs `status`, `lastDate` vs `updatedAt`). That tolerance
//! lives entirely in the fetch boundary; everything past it works with the
//! unambiguous shapes below.

use serde::{Deserialize, Serialize};

/// One conversation between the employee and an admin peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Identity of the admin peer.
    pub admin_id: String,
    /// Display name of the peer, when the backend provided one.
    pub admin_name: Option<String>,
    /// Instant of the most recent message, Unix milliseconds (0 = unknown).
    pub last_message_at: i64,
}

/// A document request and its current processing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub id: String,
    pub status: String,
}

/// A leave request ("demande de congé") and its current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: String,
    pub status: String,
}

/// A complaint ("réclamation") and its current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reclamation {
    pub id: String,
    pub status: String,
}
