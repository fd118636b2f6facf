//! Ways for the widget to obtain advice.

use async_trait::async_trait;
use crime_advice_advisor::{AdviceError, Advisor};
use crime_advice_server_models::{ChatBotRequest, ChatBotResponse};
use thiserror::Error;

/// Errors from an [`AdviceClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a usable response.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Body returned by the server (already `"Error: ..."`).
        message: String,
    },

    /// The in-process advisor failed.
    #[error("Error: {0}")]
    Advice(#[from] AdviceError),
}

/// Something that turns a `(city, business)` pair into advice.
#[async_trait]
pub trait AdviceClient: Send + Sync {
    /// Requests advice for `business` in `city`.
    async fn advise(&self, city: &str, business: &str) -> Result<ChatBotResponse, ClientError>;
}

/// Calls a running server's `POST /api/chat-bot`.
pub struct HttpAdviceClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAdviceClient {
    /// Creates a client for the server rooted at `server_url`
    /// (e.g. `http://127.0.0.1:8080`).
    #[must_use]
    pub fn new(client: reqwest::Client, server_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/chat-bot", server_url.trim_end_matches('/')),
        }
    }

    /// The full chat-bot URL requests go to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AdviceClient for HttpAdviceClient {
    async fn advise(&self, city: &str, business: &str) -> Result<ChatBotResponse, ClientError> {
        let request = ChatBotRequest {
            city: city.to_string(),
            business: business.to_string(),
        };

        log::debug!("POST {} city={city} business={business}", self.endpoint);
        let resp = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<String>()
                .await
                .unwrap_or_else(|_| format!("Error: server returned HTTP {status}"));
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<ChatBotResponse>().await?)
    }
}

/// Runs the advice chain in-process, without a server.
pub struct LocalAdviceClient {
    advisor: Advisor,
}

impl LocalAdviceClient {
    #[must_use]
    /// Wraps an advisor built from the local environment.
    pub const fn new(advisor: Advisor) -> Self {
        Self { advisor }
    }
}

#[async_trait]
impl AdviceClient for LocalAdviceClient {
    async fn advise(&self, city: &str, business: &str) -> Result<ChatBotResponse, ClientError> {
        let advice = self.advisor.advise(city, business).await?;
        Ok(ChatBotResponse {
            content: advice.text,
            coordinates: advice.coordinates,
        })
    }
}
