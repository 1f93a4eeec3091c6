use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::SessionError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the host-local ephemeral token endpoint
///
/// The endpoint takes a bodyless POST and answers `{"token": ...}` on
/// success or `{"error": ...}` on failure; some deployments report the
/// error with a 200 status, so the error field wins over the status code.
pub struct TokenClient {
    client: Client,
    url: String,
}

impl TokenClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Request a short-lived bearer token for one connection attempt
    ///
    /// A missing or empty token is fatal to the attempt; the server's own
    /// error message is carried through verbatim when it supplies one.
    pub async fn fetch(&self) -> Result<String, SessionError> {
        debug!("Requesting ephemeral token from {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .send()
            .await
            .map_err(|e| SessionError::Negotiation(format!("token request failed: {e}")))?;

        let status = response.status();
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SessionError::Negotiation(format!("invalid token response: {e}")))?;

        if let Some(error) = body.error {
            return Err(SessionError::Negotiation(error));
        }
        if !status.is_success() {
            return Err(SessionError::Negotiation(format!(
                "token endpoint returned {status}"
            )));
        }

        match body.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(SessionError::Negotiation(
                "no token received from server".to_string(),
            )),
        }
    }
}
