use std::time::Duration;

use super::auth;
use crate::config::ServerConfig;
use crate::error::SendError;
use crate::models::DownloadRequest;

const USER_AGENT: &str = concat!("tidarr-send/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Acknowledgement of an accepted item, keeping the raw server body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub body: String,
}

/// Seam between the menu adapter and the network, so the adapter can be
/// driven in tests without a server.
pub trait Dispatch {
    fn dispatch(&self, request: &DownloadRequest, server: &ServerConfig)
        -> Result<Ack, SendError>;
}

/// Blocking client for the Tidarr HTTP API.
pub struct TidarrClient {
    http: reqwest::blocking::Client,
}

impl Default for TidarrClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TidarrClient {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap();

        Self { http }
    }

    /// One attempt at the authenticate-then-submit sequence. No retries:
    /// every user action maps to exactly one pass through this function.
    pub fn send(
        &self,
        request: &DownloadRequest,
        server: &ServerConfig,
    ) -> Result<Ack, SendError> {
        if server.url.is_empty() {
            return Err(SendError::Config("missing server URL".to_string()));
        }
        if !server.is_configured() {
            return Err(SendError::Config(format!(
                "server URL is not an absolute http(s) URL: {}",
                server.url
            )));
        }

        // Auth is conditional on a configured password; a missing token
        // aborts before /api/save is ever reached.
        let token = if server.password.is_empty() {
            None
        } else {
            Some(auth::authenticate(&self.http, server)?)
        };

        self.save(request, server, token.as_deref())
    }

    fn save(
        &self,
        request: &DownloadRequest,
        server: &ServerConfig,
        token: Option<&str>,
    ) -> Result<Ack, SendError> {
        let mut call = self
            .http
            .post(format!("{}/api/save", server.url))
            .json(&serde_json::json!({ "item": request }));
        if let Some(token) = token {
            call = call.bearer_auth(token);
        }

        let body = call.send()?.text()?;
        if is_created(&body) {
            log::info!("queued \"{}\" by {}", request.title, request.artist);
            Ok(Ack { body })
        } else {
            log::warn!("Tidarr rejected \"{}\": {body}", request.title);
            Err(SendError::Server { body })
        }
    }

    /// Send several requests strictly one after another. One item's failure
    /// does not stop the rest; the caller gets every outcome, in order.
    pub fn send_all(
        &self,
        requests: &[DownloadRequest],
        server: &ServerConfig,
        mut observer: impl FnMut(usize, &DownloadRequest, &Result<Ack, SendError>),
    ) -> Vec<Result<Ack, SendError>> {
        let mut results = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let result = self.send(request, server);
            observer(index, request, &result);
            results.push(result);
        }
        results
    }

    /// Connection test for the settings surface, on the shared client.
    pub fn test_connection(&self, server: &ServerConfig) -> auth::ConnectionTest {
        auth::test_connection(&self.http, server)
    }
}

impl Dispatch for TidarrClient {
    fn dispatch(
        &self,
        request: &DownloadRequest,
        server: &ServerConfig,
    ) -> Result<Ack, SendError> {
        self.send(request, server)
    }
}

/// Did `/api/save` accept the item?
///
/// Success is a body equal to `"Created"`, containing `"created"` in any
/// case, or containing `201` as a standalone number.
pub fn is_created(body: &str) -> bool {
    if body.to_lowercase().contains("created") {
        return true;
    }
    body.split(|c: char| !c.is_ascii_digit())
        .any(|token| token == "201")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtistRef, MediaKind, Quality};

    fn request() -> DownloadRequest {
        DownloadRequest {
            id: "42".to_string(),
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            artists: vec![ArtistRef::new("Artist")],
            url: "https://tidal.com/browse/track/42".to_string(),
            kind: MediaKind::Track,
            quality: Quality::High,
            status: "queue".to_string(),
            loading: true,
            error: false,
        }
    }

    #[test]
    fn test_is_created_exact_and_case_insensitive() {
        assert!(is_created("Created"));
        assert!(is_created("created"));
        assert!(is_created("\"Created\""));
        assert!(is_created("Status: 201 Created"));
    }

    #[test]
    fn test_is_created_standalone_201() {
        assert!(is_created("201"));
        assert!(is_created("HTTP 201 OK"));
        assert!(!is_created("20100 items"));
        assert!(!is_created("id 1201"));
    }

    #[test]
    fn test_is_created_rejects_errors() {
        assert!(!is_created("Error: 400 Bad Request"));
        assert!(!is_created(""));
        assert!(!is_created("OK"));
    }

    #[test]
    fn test_send_with_empty_url_is_config_error() {
        let client = TidarrClient::new();
        let server = ServerConfig::new("", "password");
        // No listener anywhere: an attempted call would fail differently.
        match client.send(&request(), &server) {
            Err(SendError::Config(msg)) => assert_eq!(msg, "missing server URL"),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_send_with_relative_url_is_config_error() {
        let client = TidarrClient::new();
        let server = ServerConfig::new("tidarr.local:8484", "");
        assert!(matches!(
            client.send(&request(), &server),
            Err(SendError::Config(_))
        ));
    }
}
