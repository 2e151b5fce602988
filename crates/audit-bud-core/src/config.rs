use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_WEBHOOK_URL: &str =
    "https://n8n.srv1033356.hstgr.cloud/webhook/dc46cc6c-b02c-4dff-85c0-41f69e34ad86";

/// One way of reaching the webhook: a URL plus the headers sent with it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    pub endpoint_url: String,
    pub headers: BTreeMap<String, String>,
}

impl RequestConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            endpoint_url: endpoint_url.into(),
            headers,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Sends the CORS response headers along with the request. Some webhook
    /// deployments only answer when these are present.
    pub fn permissive(endpoint_url: impl Into<String>) -> Self {
        Self::new(endpoint_url)
            .with_header("Accept", "application/json")
            .with_header("Access-Control-Allow-Origin", "*")
            .with_header("Access-Control-Allow-Methods", "POST, GET, OPTIONS")
            .with_header("Access-Control-Allow-Headers", "Content-Type")
    }

    pub fn minimal(endpoint_url: impl Into<String>) -> Self {
        Self::new(endpoint_url)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSettings {
    pub endpoint_url: String,
    /// Tried in order until one answers with a success status.
    pub candidates: Vec<RequestConfig>,
}

impl WebhookSettings {
    pub fn for_endpoint(endpoint_url: &str) -> Self {
        Self {
            endpoint_url: endpoint_url.to_string(),
            candidates: vec![
                RequestConfig::permissive(endpoint_url),
                RequestConfig::minimal(endpoint_url),
            ],
        }
    }
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self::for_endpoint(DEFAULT_WEBHOOK_URL)
    }
}
