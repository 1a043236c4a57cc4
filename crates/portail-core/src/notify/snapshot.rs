//! Snapshot bookkeeping behind the notifier's change detection.

use std::collections::HashMap;

use crate::models::{
    ConversationSummary, DocumentRequest, LeaveRequest, Notification, Reclamation,
};

/// Last observed state per resource, keyed by entity id.
///
/// First sight of an entity seeds its baseline silently; notifications only
/// come from later observations that differ from the stored value.
#[derive(Debug, Default)]
pub(crate) struct SnapshotState {
    last_message_at: HashMap<String, i64>,
    document_status: HashMap<String, String>,
    leave_status: HashMap<String, String>,
    reclamation_status: HashMap<String, String>,
}

impl SnapshotState {
    /// Conversations notify on a strictly newer message instant. Unknown
    /// instants (0) neither seed a baseline nor fire.
    pub(crate) fn observe_conversations(
        &mut self,
        conversations: &[ConversationSummary],
    ) -> Vec<Notification> {
        let mut fresh = Vec::new();
        for conversation in conversations {
            if conversation.last_message_at <= 0 {
                continue;
            }
            match self.last_message_at.get(&conversation.admin_id) {
                None => {
                    self.last_message_at
                        .insert(conversation.admin_id.clone(), conversation.last_message_at);
                }
                Some(&previous) if conversation.last_message_at > previous => {
                    self.last_message_at
                        .insert(conversation.admin_id.clone(), conversation.last_message_at);
                    fresh.push(Notification::new_message(conversation));
                }
                Some(_) => {}
            }
        }
        fresh
    }

    pub(crate) fn observe_documents(&mut self, requests: &[DocumentRequest]) -> Vec<Notification> {
        requests
            .iter()
            .filter(|request| transition(&mut self.document_status, &request.id, &request.status))
            .map(|request| Notification::document_update(&request.id, &request.status))
            .collect()
    }

    pub(crate) fn observe_leave_requests(
        &mut self,
        requests: &[LeaveRequest],
    ) -> Vec<Notification> {
        requests
            .iter()
            .filter(|request| transition(&mut self.leave_status, &request.id, &request.status))
            .map(|request| Notification::leave_update(&request.id, &request.status))
            .collect()
    }

    pub(crate) fn observe_reclamations(
        &mut self,
        reclamations: &[Reclamation],
    ) -> Vec<Notification> {
        reclamations
            .iter()
            .filter(|record| transition(&mut self.reclamation_status, &record.id, &record.status))
            .map(|record| Notification::reclamation_update(&record.id, &record.status))
            .collect()
    }

    /// Forget every baseline, as on logout.
    pub(crate) fn clear(&mut self) {
        self.last_message_at.clear();
        self.document_status.clear();
        self.leave_status.clear();
        self.reclamation_status.clear();
    }
}

/// Record `status` for `id`; true when it replaced a different known value.
fn transition(statuses: &mut HashMap<String, String>, id: &str, status: &str) -> bool {
    match statuses.get(id) {
        None => {
            statuses.insert(id.to_string(), status.to_string());
            false
        }
        Some(previous) if previous != status => {
            statuses.insert(id.to_string(), status.to_string());
            true
        }
        Some(_) => false,
    }
}
