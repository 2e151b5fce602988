use super::{RawResponse, WebhookError, WebhookTransport};
use crate::config::RequestConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::error::Error as _;

/// `WebhookTransport` backed by a shared reqwest client. No timeout is set,
/// so reqwest's defaults apply.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Flattens an error and its sources into one line.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post_json(
        &self,
        config: &RequestConfig,
        body: &Value,
    ) -> Result<RawResponse, WebhookError> {
        let mut req = self.client.post(&config.endpoint_url);
        for (name, value) in &config.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        // json() leaves an existing content-type alone
        let req = req.json(body);

        let resp = req
            .send()
            .await
            .map_err(|e| WebhookError::from_transport_message(error_chain(&e)))?;

        let status = resp.status().as_u16();
        let body = if resp.status().is_success() {
            resp.text()
                .await
                .map_err(|e| WebhookError::from_transport_message(error_chain(&e)))?
        } else {
            resp.text().await.unwrap_or_default()
        };

        Ok(RawResponse { status, body })
    }
}
