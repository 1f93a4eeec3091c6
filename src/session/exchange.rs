use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use super::config::SessionConfig;
use crate::error::SessionError;

/// Offer/answer exchange with the realtime service
///
/// Abstracted so the connect path can be exercised without a network; the
/// production implementation is [`HttpExchange`].
#[async_trait]
pub trait DescriptionExchange: Send + Sync {
    /// POST the local offer text, returning the remote answer text
    async fn exchange(&self, offer_sdp: &str, bearer: &str) -> Result<String, SessionError>;
}

/// HTTP exchange against the realtime calls endpoint
pub struct HttpExchange {
    client: Client,
    base_url: String,
    model: String,
}

impl HttpExchange {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.exchange_url.clone(), config.model.clone())
    }
}

#[async_trait]
impl DescriptionExchange for HttpExchange {
    async fn exchange(&self, offer_sdp: &str, bearer: &str) -> Result<String, SessionError> {
        let url = format!("{}?model={}", self.base_url, self.model);
        debug!("Posting offer to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(bearer)
            .header(CONTENT_TYPE, "application/sdp")
            .body(offer_sdp.to_string())
            .send()
            .await
            .map_err(|e| SessionError::Negotiation(format!("exchange request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SessionError::Negotiation(format!("unreadable exchange response: {e}")))?;

        if !status.is_success() {
            return Err(SessionError::Negotiation(format!(
                "exchange returned {status}: {body}"
            )));
        }

        Ok(body)
    }
}
