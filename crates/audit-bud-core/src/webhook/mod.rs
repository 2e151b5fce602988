pub mod http;

use crate::config::{RequestConfig, WebhookSettings};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub use http::ReqwestTransport;

#[derive(Serialize)]
struct WebhookRequest<'a> {
    query: &'a str,
}

/// Status and body text of a webhook answer, before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one POST for one candidate configuration.
///
/// Implementations report connection-level problems as
/// `WebhookError::Transport` or `WebhookError::CrossOrigin`; any HTTP status,
/// including errors, comes back as a `RawResponse`.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(
        &self,
        config: &RequestConfig,
        body: &Value,
    ) -> Result<RawResponse, WebhookError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("CORS error: {0}")]
    CrossOrigin(String),
    #[error("HTTP error! status: {status} - {body}")]
    Http { status: u16, body: String },
    #[error("All webhook attempts failed")]
    Exhausted,
    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

impl WebhookError {
    /// Buckets a connection-level failure message.
    pub fn from_transport_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if lowered.contains("cors") || lowered.contains("cross-origin") {
            WebhookError::CrossOrigin(message)
        } else {
            WebhookError::Transport(message)
        }
    }

    /// Text shown in the chat transcript when a query fails.
    pub fn user_message(&self) -> String {
        match self {
            WebhookError::Transport(_) => "Network error: Unable to connect to the webhook. \
                This might be a CORS issue or the webhook server is not accessible."
                .to_string(),
            WebhookError::CrossOrigin(_) => "CORS error: The webhook server is blocking requests \
                from this domain. Please configure CORS headers on your n8n webhook."
                .to_string(),
            WebhookError::Http { .. } => format!("Server error: {}", self),
            WebhookError::Exhausted => "Connection failed: Unable to reach the webhook server. \
                Please check your n8n workflow configuration."
                .to_string(),
            WebhookError::InvalidBody(_) => {
                "Sorry, there was an error processing your request.".to_string()
            }
        }
    }
}

impl Serialize for WebhookError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Walks the candidate list until one configuration gets a success status.
#[derive(Clone)]
pub struct Dispatcher {
    candidates: Vec<RequestConfig>,
    transport: Arc<dyn WebhookTransport>,
}

impl Dispatcher {
    pub fn new(candidates: Vec<RequestConfig>, transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            candidates,
            transport,
        }
    }

    pub fn from_settings(settings: &WebhookSettings) -> Self {
        Self::new(
            settings.candidates.clone(),
            Arc::new(ReqwestTransport::new()),
        )
    }

    pub fn candidates(&self) -> &[RequestConfig] {
        &self.candidates
    }

    /// Posts `{ "query": query }` to each candidate in order and decodes the
    /// first successful body as JSON. When every candidate fails, the last
    /// failure is returned.
    pub async fn dispatch(&self, query: &str) -> Result<Value, WebhookError> {
        let body = serde_json::to_value(WebhookRequest { query })
            .map_err(|e| WebhookError::InvalidBody(e.to_string()))?;

        let mut last_error = None;

        for (attempt, candidate) in self.candidates.iter().enumerate() {
            tracing::debug!(
                attempt = attempt + 1,
                url = %candidate.endpoint_url,
                "posting query to webhook"
            );

            match self.transport.post_json(candidate, &body).await {
                Ok(resp) if resp.is_success() => {
                    tracing::info!(attempt = attempt + 1, status = resp.status, "webhook answered");
                    return serde_json::from_str(&resp.body)
                        .map_err(|e| WebhookError::InvalidBody(e.to_string()));
                }
                Ok(resp) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        status = resp.status,
                        "webhook returned an error status"
                    );
                    last_error = Some(WebhookError::Http {
                        status: resp.status,
                        body: resp.body,
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "webhook request failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(WebhookError::Exhausted))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed list of outcomes and records every request it saw.
    #[derive(Default)]
    pub struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<RawResponse, WebhookError>>>,
        pub requests: Mutex<Vec<(RequestConfig, Value)>>,
    }

    impl ScriptedTransport {
        pub fn new(outcomes: Vec<Result<RawResponse, WebhookError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl WebhookTransport for ScriptedTransport {
        async fn post_json(
            &self,
            config: &RequestConfig,
            body: &Value,
        ) -> Result<RawResponse, WebhookError> {
            self.requests
                .lock()
                .unwrap()
                .push((config.clone(), body.clone()));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(WebhookError::Transport("script exhausted".into())))
        }
    }

    pub fn ok(body: &str) -> Result<RawResponse, WebhookError> {
        Ok(RawResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    pub fn status(status: u16, body: &str) -> Result<RawResponse, WebhookError> {
        Ok(RawResponse {
            status,
            body: body.to_string(),
        })
    }
}
