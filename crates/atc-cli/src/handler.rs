//! The client side of the relay: validate a phrase, post it once, render the reply.

use atc_core::{ExplainRequest, ProxyReply, DECODE_ROUTE, NO_EXPLANATION_FALLBACK};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::output::{OutputArea, Rendered};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/.netlify/functions/decode";
pub const EMPTY_INPUT_ADVISORY: &str = "Please enter an ATC phrase first.";
pub const PENDING_MESSAGE: &str = "Explaining...";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    /// Non-success status; carries the proxy's error text or a generic status line.
    #[error("{0}")]
    Server(String),
}

/// Terminal state of one [`DecodeClient::decode`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Blank input; nothing was sent.
    Skipped,
    Explained(String),
    Failed(String),
}

pub struct DecodeClient {
    http: Client,
    endpoint: String,
}

impl DecodeClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::builder().build()?,
            endpoint: endpoint.into(),
        })
    }

    /// Client for a proxy at `base_url`, e.g. `http://127.0.0.1:3000`.
    pub fn for_base_url(base_url: &str) -> Result<Self, ClientError> {
        Self::new(format!("{}{}", base_url.trim_end_matches('/'), DECODE_ROUTE))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Handle one submission of `input`.
    ///
    /// Blank input renders an advisory and sends nothing. Otherwise exactly one
    /// request is made and the output area always ends on the explanation or an
    /// error, never on the pending message.
    pub async fn decode(&self, input: &str, out: &mut dyn OutputArea) -> Outcome {
        let phrase = input.trim();
        if phrase.is_empty() {
            out.render(Rendered::advisory(EMPTY_INPUT_ADVISORY));
            return Outcome::Skipped;
        }

        out.render(Rendered::pending(PENDING_MESSAGE));

        match self.request(phrase).await {
            Ok(explanation) => {
                out.render(Rendered::explanation(explanation.clone()));
                Outcome::Explained(explanation)
            }
            Err(err) => {
                let message = err.to_string();
                debug!(error = %message, endpoint = %self.endpoint, "Decode request failed");
                out.render(Rendered::error(format!(
                    "Error: {}. Could not get an explanation.",
                    message
                )));
                Outcome::Failed(message)
            }
        }
    }

    async fn request(&self, phrase: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ExplainRequest::new(phrase))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let server_error = serde_json::from_str::<ProxyReply>(&body)
                .ok()
                .and_then(|reply| reply.error)
                .filter(|e| !e.is_empty());
            return Err(ClientError::Server(server_error.unwrap_or_else(|| {
                format!("HTTP error! Status: {}", status.as_u16())
            })));
        }

        let reply: ProxyReply = serde_json::from_str(&body)?;
        Ok(reply
            .explanation
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| NO_EXPLANATION_FALLBACK.to_string()))
    }
}
