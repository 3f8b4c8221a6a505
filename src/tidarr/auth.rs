use serde::Deserialize;

use crate::config::ServerConfig;
use crate::error::SendError;

/// Response of `POST /api/auth`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "accessGranted")]
    pub access_granted: Option<bool>,
    pub token: Option<String>,
}

impl AuthResponse {
    /// Typed view of the grant: a non-empty token not explicitly denied.
    /// Replaces the truthiness poking the original clients did.
    pub fn into_token(self) -> Option<String> {
        if self.access_granted == Some(false) {
            return None;
        }
        self.token.filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct IsAuthActive {
    #[serde(rename = "isAuthActive", default)]
    is_auth_active: bool,
}

/// Outcome of the settings panel's manual connection test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTest {
    NotConfigured,
    Success,
    Failure(String),
}

/// Authenticate against `{url}/api/auth` and return the bearer token.
///
/// The token lives only for the current send; it is never persisted.
/// Non-2xx, malformed JSON and missing tokens are all `SendError::Auth`;
/// transport failures keep their own variants.
pub(crate) fn authenticate(
    http: &reqwest::blocking::Client,
    server: &ServerConfig,
) -> Result<String, SendError> {
    let response = http
        .post(format!("{}/api/auth", server.url))
        .json(&serde_json::json!({ "password": server.password }))
        .send()?;

    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(SendError::Auth(format!("auth returned {status}: {body}")));
    }

    let auth: AuthResponse = serde_json::from_str(&body)
        .map_err(|err| SendError::Auth(format!("malformed auth response: {err}")))?;
    auth.into_token()
        .ok_or_else(|| SendError::Auth("server granted no token".to_string()))
}

// GET /api/is_auth_active: does this instance require a password at all?
fn auth_active(
    http: &reqwest::blocking::Client,
    server: &ServerConfig,
) -> Result<bool, SendError> {
    let response = http
        .get(format!("{}/api/is_auth_active", server.url))
        .send()?;

    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(SendError::Network(format!(
            "is_auth_active returned {status}: {body}"
        )));
    }

    let active: IsAuthActive = serde_json::from_str(&body)
        .map_err(|err| SendError::Network(format!("malformed is_auth_active response: {err}")))?;
    Ok(active.is_auth_active)
}

/// Manual connection test for the settings surface.
///
/// Runs the configuration check and the auth step of the send sequence, and
/// nothing else; the token-validity rule is the exact one the send path uses.
pub fn test_connection(http: &reqwest::blocking::Client, server: &ServerConfig) -> ConnectionTest {
    if !server.is_configured() {
        return ConnectionTest::NotConfigured;
    }

    let needs_auth = match auth_active(http, server) {
        Ok(active) => active,
        Err(err) => return ConnectionTest::Failure(err.to_string()),
    };

    if needs_auth && server.password.is_empty() {
        return ConnectionTest::Failure(
            "server requires a password and none is configured".to_string(),
        );
    }

    if needs_auth || !server.password.is_empty() {
        if let Err(err) = authenticate(http, server) {
            return ConnectionTest::Failure(err.to_string());
        }
    }

    ConnectionTest::Success
}
