//! Portal REST API client.
//!
//! All tolerance for the backend's heterogeneous wire shapes (`id` vs `_id`,
//! `statut` vs `status`, `lastDate` vs `updatedAt`, Mongo date wrappers)
//! is concentrated here: each fetch decodes a permissive wire struct and
//! normalizes it into one canonical record type before returning.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::auth::Session;
use crate::config::PortalConfig;
use crate::models::{ConversationSummary, DocumentRequest, LeaveRequest, Reclamation};
use crate::notify::ResourceFetcher;
use crate::util::{normalize_text_option, parse_event_date};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Portal HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Portal API error: {0}")]
    Api(String),
    #[error("No auth token in session; document requests need one")]
    MissingToken,
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for the portal's employee-scoped collection endpoints.
#[derive(Clone)]
pub struct PortalApiClient {
    base_url: String,
    client: Client,
}

impl PortalApiClient {
    pub fn new(config: &PortalConfig) -> ApiResult<Self> {
        Ok(Self {
            base_url: config.api_base_url().to_string(),
            client: Client::builder().build()?,
        })
    }

    /// Fetch the employee's conversations with admin peers.
    pub async fn conversations(&self, employee_id: &str) -> ApiResult<Vec<ConversationSummary>> {
        let request = self
            .client
            .get(format!("{}/conversations", self.base_url))
            .query(&[("employeeId", employee_id)]);
        let payload: Vec<ConversationWire> = read_json(request.send().await?).await?;
        Ok(payload
            .into_iter()
            .filter_map(ConversationWire::into_summary)
            .collect())
    }

    /// Fetch the employee's document requests (bearer-token scoped).
    pub async fn document_requests(&self, token: &str) -> ApiResult<Vec<DocumentRequest>> {
        let request = self
            .client
            .get(format!("{}/document-requests", self.base_url))
            .bearer_auth(token);
        let payload: DocumentRequestsWire = read_json(request.send().await?).await?;
        Ok(payload
            .requests
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| {
                record
                    .into_parts()
                    .map(|(id, status)| DocumentRequest { id, status })
            })
            .collect())
    }

    /// Fetch the employee's leave requests.
    pub async fn leave_requests(&self, employee_id: &str) -> ApiResult<Vec<LeaveRequest>> {
        let request = self
            .client
            .get(format!("{}/leave-requests", self.base_url))
            .query(&[("employeeId", employee_id)]);
        let payload: Vec<StatusRecordWire> = read_json(request.send().await?).await?;
        Ok(payload
            .into_iter()
            .filter_map(|record| {
                record
                    .into_parts()
                    .map(|(id, status)| LeaveRequest { id, status })
            })
            .collect())
    }

    /// Fetch the employee's réclamations.
    pub async fn reclamations(&self, employee_id: &str) -> ApiResult<Vec<Reclamation>> {
        let request = self
            .client
            .get(format!("{}/reclamations", self.base_url))
            .query(&[("employeId", employee_id)]);
        let payload: Vec<StatusRecordWire> = read_json(request.send().await?).await?;
        Ok(payload
            .into_iter()
            .filter_map(|record| {
                record
                    .into_parts()
                    .map(|(id, status)| Reclamation { id, status })
            })
            .collect())
    }
}

#[async_trait]
impl ResourceFetcher for PortalApiClient {
    async fn fetch_conversations(&self, session: &Session) -> ApiResult<Vec<ConversationSummary>> {
        self.conversations(&session.employee_id).await
    }

    async fn fetch_document_requests(&self, session: &Session) -> ApiResult<Vec<DocumentRequest>> {
        let token = session.token.as_deref().ok_or(ApiError::MissingToken)?;
        self.document_requests(token).await
    }

    async fn fetch_leave_requests(&self, session: &Session) -> ApiResult<Vec<LeaveRequest>> {
        self.leave_requests(&session.employee_id).await
    }

    async fn fetch_reclamations(&self, session: &Session) -> ApiResult<Vec<Reclamation>> {
        self.reclamations(&session.employee_id).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Api(parse_api_error(status, &body)));
    }
    Ok(response.json::<T>().await?)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ConversationWire {
    admin: Option<AdminWire>,
    #[serde(rename = "lastDate")]
    last_date: Option<Value>,
    #[serde(rename = "updatedAt")]
    updated_at: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AdminWire {
    #[serde(rename = "_id")]
    id: Option<String>,
    nom: Option<String>,
    prenom: Option<String>,
}

impl ConversationWire {
    fn into_summary(self) -> Option<ConversationSummary> {
        let admin = self.admin?;
        let admin_id = normalize_text_option(admin.id)?;

        let parts: Vec<String> = [admin.nom, admin.prenom]
            .into_iter()
            .filter_map(normalize_text_option)
            .collect();
        let admin_name = if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        };

        // `lastDate` wins over `updatedAt` unless it is absent or null.
        let instant = [self.last_date, self.updated_at]
            .into_iter()
            .flatten()
            .find(|value| !value.is_null())
            .map_or(0, |value| parse_event_date(&value));

        Some(ConversationSummary {
            admin_id,
            admin_name,
            last_message_at: instant,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DocumentRequestsWire {
    requests: Option<Vec<StatusRecordWire>>,
}

/// Shared wire shape for the three status-tracked collections.
#[derive(Debug, Deserialize)]
struct StatusRecordWire {
    id: Option<String>,
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    statut: Option<String>,
    status: Option<String>,
}

impl StatusRecordWire {
    /// Resolve to `(id, status)`. Records with no usable id are dropped;
    /// a missing status normalizes to the empty string.
    fn into_parts(self) -> Option<(String, String)> {
        let id = normalize_text_option(self.id.or(self.mongo_id))?;
        let status = self.statut.or(self.status).unwrap_or_default();
        Some((id, status))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn conversation(raw: serde_json::Value) -> Option<ConversationSummary> {
        serde_json::from_value::<ConversationWire>(raw)
            .unwrap()
            .into_summary()
    }

    fn status_record(raw: serde_json::Value) -> Option<(String, String)> {
        serde_json::from_value::<StatusRecordWire>(raw)
            .unwrap()
            .into_parts()
    }

    #[test]
    fn conversation_wire_normalizes_admin_and_date() {
        let summary = conversation(json!({
            "admin": {"_id": "a1", "nom": "Gharbi", "prenom": "Leila"},
            "lastDate": "2024-03-01T10:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(
            summary,
            ConversationSummary {
                admin_id: "a1".to_string(),
                admin_name: Some("Gharbi Leila".to_string()),
                last_message_at: 1_709_289_000_000,
            }
        );
    }

    #[test]
    fn conversation_wire_falls_back_to_updated_at() {
        let summary = conversation(json!({
            "admin": {"_id": "a1"},
            "lastDate": null,
            "updatedAt": {"$date": 1_709_289_000_000_i64}
        }))
        .unwrap();
        assert_eq!(summary.last_message_at, 1_709_289_000_000);
        assert_eq!(summary.admin_name, None);
    }

    #[test]
    fn conversation_wire_without_admin_id_is_dropped() {
        assert_eq!(conversation(json!({"lastDate": 12})), None);
        assert_eq!(conversation(json!({"admin": {"nom": "X"}})), None);
        assert_eq!(conversation(json!({"admin": {"_id": "  "}})), None);
    }

    #[test]
    fn conversation_wire_tolerates_unparseable_dates() {
        let summary = conversation(json!({
            "admin": {"_id": "a1"},
            "lastDate": "gibberish"
        }))
        .unwrap();
        assert_eq!(summary.last_message_at, 0);
    }

    #[test]
    fn status_record_prefers_plain_id_then_mongo_id() {
        assert_eq!(
            status_record(json!({"id": "r1", "_id": "m1", "status": "En attente"})),
            Some(("r1".to_string(), "En attente".to_string()))
        );
        assert_eq!(
            status_record(json!({"_id": "m1", "status": "En attente"})),
            Some(("m1".to_string(), "En attente".to_string()))
        );
        assert_eq!(status_record(json!({"status": "En attente"})), None);
    }

    #[test]
    fn status_record_prefers_french_statut_spelling() {
        assert_eq!(
            status_record(json!({"_id": "c1", "statut": "Résolue", "status": "stale"})),
            Some(("c1".to_string(), "Résolue".to_string()))
        );
        assert_eq!(
            status_record(json!({"_id": "c1"})),
            Some(("c1".to_string(), String::new()))
        );
    }

    #[test]
    fn document_requests_wire_tolerates_missing_array() {
        let payload: DocumentRequestsWire = serde_json::from_value(json!({})).unwrap();
        assert!(payload.requests.is_none());
    }

    #[test]
    fn parse_api_error_prefers_backend_message() {
        assert_eq!(
            parse_api_error(StatusCode::NOT_FOUND, "{\"message\": \"Location not found\"}"),
            "Location not found (404)"
        );
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
    }
}
