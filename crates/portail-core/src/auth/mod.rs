//! Portal sign-in client and session types.

use std::fmt;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PortalConfig;
use crate::util::normalize_text_option;

/// Identity of the authenticated employee, set on login and cleared on
/// logout. The notifier's poll loop is entirely gated on its presence.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub employee_id: String,
    /// Bearer token for endpoints that require it; fetches needing it are
    /// skipped for the cycle when absent.
    pub token: Option<String>,
    pub display_name: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            token: None,
            display_name: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("employee_id", &self.employee_id)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("display_name", &self.display_name)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub nom: Option<String>,
    pub prenom: Option<String>,
}

impl Employee {
    /// "nom prenom" when at least one part is present.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.nom.as_deref(), self.prenom.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Successful sign-in result.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub employee: Employee,
}

impl AuthSession {
    /// Lower to the notifier-facing session.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            employee_id: self.employee.id.clone(),
            token: Some(self.token.clone()),
            display_name: self.employee.display_name(),
        }
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("employee", &self.employee)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth request: {0}")]
    InvalidRequest(&'static str),
    #[error("Auth HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Invalid auth payload: {0}")]
    InvalidPayload(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Client for the portal's credential-based login endpoint.
#[derive(Clone)]
pub struct PortalAuthClient {
    base_url: String,
    client: Client,
}

impl PortalAuthClient {
    pub fn new(config: &PortalConfig) -> AuthResult<Self> {
        Ok(Self {
            base_url: config.api_base_url().to_string(),
            client: Client::builder().build()?,
        })
    }

    /// Sign in with the employee's address identifier and password.
    pub async fn sign_in(&self, adresse1: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(adresse1, password)?;

        let payload = serde_json::json!({
            "adresse1": adresse1,
            "password": password,
        });
        let response = self
            .client
            .post(format!("{}/login", self.base_url))
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        let payload = response.json::<LoginResponse>().await?;
        payload.try_into()
    }
}

fn validate_credentials(adresse1: &str, password: &str) -> AuthResult<()> {
    if adresse1.trim().is_empty() {
        return Err(AuthError::InvalidRequest("adresse1 is required"));
    }
    if password.trim().is_empty() {
        return Err(AuthError::InvalidRequest("password is required"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    employee: Option<EmployeeWire>,
}

#[derive(Debug, Deserialize)]
struct EmployeeWire {
    id: Option<String>,
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    nom: Option<String>,
    prenom: Option<String>,
}

impl TryFrom<LoginResponse> for AuthSession {
    type Error = AuthError;

    fn try_from(value: LoginResponse) -> AuthResult<Self> {
        let token = normalize_text_option(value.token).ok_or_else(|| {
            AuthError::InvalidPayload("response did not include a token".to_string())
        })?;
        let employee = value.employee.ok_or_else(|| {
            AuthError::InvalidPayload("response did not include an employee".to_string())
        })?;
        let id = normalize_text_option(employee.id.or(employee.mongo_id)).ok_or_else(|| {
            AuthError::InvalidPayload("employee record did not include an id".to_string())
        })?;

        Ok(Self {
            token,
            employee: Employee {
                id,
                nom: normalize_text_option(employee.nom),
                prenom: normalize_text_option(employee.prenom),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<AuthErrorBody>(body) {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn login_response(raw: serde_json::Value) -> LoginResponse {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn login_response_maps_to_auth_session() {
        let session: AuthSession = login_response(serde_json::json!({
            "message": "Login successful",
            "token": "jwt-token",
            "employee": {"id": "e7", "nom": "Ben Salah", "prenom": "Amine", "locationId": "l1"}
        }))
        .try_into()
        .unwrap();

        assert_eq!(session.token, "jwt-token");
        assert_eq!(session.employee.id, "e7");
        assert_eq!(
            session.employee.display_name().as_deref(),
            Some("Ben Salah Amine")
        );
    }

    #[test]
    fn login_response_accepts_mongo_style_employee_id() {
        let session: AuthSession = login_response(serde_json::json!({
            "token": "jwt-token",
            "employee": {"_id": "65fe", "nom": "Trabelsi"}
        }))
        .try_into()
        .unwrap();
        assert_eq!(session.employee.id, "65fe");
    }

    #[test]
    fn login_response_without_token_is_rejected() {
        let outcome: AuthResult<AuthSession> = login_response(serde_json::json!({
            "employee": {"id": "e7"}
        }))
        .try_into();
        assert!(matches!(outcome, Err(AuthError::InvalidPayload(_))));
    }

    #[test]
    fn validate_credentials_rejects_blank_input() {
        assert!(validate_credentials("", "secret").is_err());
        assert!(validate_credentials("a@b", "  ").is_err());
        assert!(validate_credentials("a@b", "secret").is_ok());
    }

    #[test]
    fn parse_api_error_prefers_backend_message() {
        let rendered = parse_api_error(
            StatusCode::UNAUTHORIZED,
            "{\"message\": \"Invalid credentials\"}",
        );
        assert_eq!(rendered, "Invalid credentials (401)");
    }

    #[test]
    fn session_and_auth_session_debug_redact_token() {
        let auth = AuthSession {
            token: "secret-jwt".to_string(),
            employee: Employee {
                id: "e7".to_string(),
                nom: None,
                prenom: None,
            },
        };
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("secret-jwt"));
        assert!(rendered.contains("[REDACTED]"));

        let rendered = format!("{:?}", auth.session());
        assert!(!rendered.contains("secret-jwt"));
    }

    #[test]
    fn session_builder_sets_token() {
        let session = Session::new("e7").with_token("jwt");
        assert_eq!(session.employee_id, "e7");
        assert_eq!(session.token.as_deref(), Some("jwt"));
    }
}
