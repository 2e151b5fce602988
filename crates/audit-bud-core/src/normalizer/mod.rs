pub mod delimited;
pub mod structured;

use crate::models::DocumentRecord;
use serde::Serialize;
use serde_json::Value;

pub use delimited::parse_metadata_string;

pub const NO_RESPONSE_MESSAGE: &str = "No response received";

/// The `sourceMetadata` field as it arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceMetadata {
    Absent,
    Records(Vec<Value>),
    /// A JSON array serialized into a string.
    Encoded(String),
    Unsupported(Value),
}

/// A webhook answer, classified once by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookPayload {
    Structured {
        text: Option<String>,
        metadata: SourceMetadata,
    },
    Delimited {
        text: Option<String>,
        metadata: String,
    },
    Unrecognized,
}

impl WebhookPayload {
    pub fn classify(raw: &Value) -> Self {
        // n8n wraps the object in a one-element array
        let body = match raw {
            Value::Array(items) => match items.first() {
                Some(first) => first,
                None => return WebhookPayload::Unrecognized,
            },
            other => other,
        };

        let Some(obj) = body.as_object() else {
            return WebhookPayload::Unrecognized;
        };

        let text = obj
            .get("text")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string);

        if let Some(blob) = obj.get("sourceMetadataString").and_then(Value::as_str) {
            return WebhookPayload::Delimited {
                text,
                metadata: blob.to_string(),
            };
        }

        let metadata = match obj.get("sourceMetadata") {
            None | Some(Value::Null) => SourceMetadata::Absent,
            Some(Value::Array(items)) => SourceMetadata::Records(items.clone()),
            Some(Value::String(s)) => SourceMetadata::Encoded(s.clone()),
            Some(other) => SourceMetadata::Unsupported(other.clone()),
        };

        if text.is_none() && metadata == SourceMetadata::Absent {
            return WebhookPayload::Unrecognized;
        }

        WebhookPayload::Structured { text, metadata }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResponse {
    pub message: String,
    pub documents: Vec<DocumentRecord>,
}

/// Turns a decoded webhook body into the chat reply and document records.
///
/// Never fails: malformed metadata is logged and yields no records, and a
/// missing `text` falls back to `NO_RESPONSE_MESSAGE`.
pub fn normalize(raw: &Value) -> NormalizedResponse {
    tracing::debug!(response = %raw, "normalizing webhook response");

    let (text, documents) = match WebhookPayload::classify(raw) {
        WebhookPayload::Structured { text, metadata } => (text, structured_records(metadata)),
        WebhookPayload::Delimited { text, metadata } => {
            (text, delimited::parse_metadata_string(&metadata))
        }
        WebhookPayload::Unrecognized => {
            tracing::warn!("webhook response has no text or metadata");
            (None, Vec::new())
        }
    };

    NormalizedResponse {
        message: text.unwrap_or_else(|| NO_RESPONSE_MESSAGE.to_string()),
        documents,
    }
}

fn structured_records(metadata: SourceMetadata) -> Vec<DocumentRecord> {
    let items = match metadata {
        SourceMetadata::Absent => return Vec::new(),
        SourceMetadata::Records(items) => items,
        SourceMetadata::Encoded(encoded) => match serde_json::from_str::<Value>(&encoded) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                tracing::warn!(metadata = %other, "sourceMetadata did not decode to an array");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode sourceMetadata");
                return Vec::new();
            }
        },
        SourceMetadata::Unsupported(value) => {
            tracing::warn!(metadata = %value, "sourceMetadata is not a string or array");
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| {
            let record = structured::record_from_value(item);
            if record.is_none() {
                tracing::warn!(item = %item, "skipping non-object metadata entry");
            }
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoded_metadata_string() {
        let raw = json!([{"text": "Hello", "sourceMetadata": "[{\"id\":\"X\"}]"}]);
        let out = normalize(&raw);
        assert_eq!(out.message, "Hello");
        assert_eq!(out.documents.len(), 1);
        assert_eq!(out.documents[0].id, "X");
    }

    #[test]
    fn test_metadata_array_used_directly() {
        let raw = json!([{
            "text": "Two sources",
            "sourceMetadata": [{"document_id": "A"}, {"document_id": "B"}, 7]
        }]);
        let out = normalize(&raw);
        assert_eq!(out.message, "Two sources");
        let ids: Vec<&str> = out.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_malformed_metadata_yields_no_records() {
        let raw = json!([{"text": "Answer", "sourceMetadata": "[{not json"}]);
        let out = normalize(&raw);
        assert_eq!(out.message, "Answer");
        assert!(out.documents.is_empty());
    }

    #[test]
    fn test_encoded_non_array_yields_no_records() {
        let raw = json!([{"text": "Answer", "sourceMetadata": "{\"id\":\"X\"}"}]);
        assert!(normalize(&raw).documents.is_empty());

        let raw = json!({"text": "Answer", "sourceMetadata": 12});
        assert!(normalize(&raw).documents.is_empty());
    }

    #[test]
    fn test_missing_everything() {
        for raw in [json!([{}]), json!({}), json!([]), json!("text"), json!(null)] {
            let out = normalize(&raw);
            assert_eq!(out.message, NO_RESPONSE_MESSAGE);
            assert!(out.documents.is_empty());
        }
    }

    #[test]
    fn test_metadata_without_text() {
        let raw = json!([{"sourceMetadata": [{"id": "Y"}]}]);
        let out = normalize(&raw);
        assert_eq!(out.message, NO_RESPONSE_MESSAGE);
        assert_eq!(out.documents[0].id, "Y");
    }

    #[test]
    fn test_delimited_shape() {
        let raw = json!({
            "text": "See the policy.",
            "sourceMetadataString": "DOC-1 v2 — Policy Title\nStatus: Active\n---\nDOC-2 v1 — Other"
        });
        let out = normalize(&raw);
        assert_eq!(out.message, "See the policy.");
        assert_eq!(out.documents.len(), 2);
        assert_eq!(out.documents[1].title, "Other");
    }

    #[test]
    fn test_classify_shapes() {
        assert_eq!(
            WebhookPayload::classify(&json!([{"text": "a", "sourceMetadata": "[]"}])),
            WebhookPayload::Structured {
                text: Some("a".into()),
                metadata: SourceMetadata::Encoded("[]".into()),
            }
        );
        assert_eq!(
            WebhookPayload::classify(&json!({"sourceMetadataString": ""})),
            WebhookPayload::Delimited {
                text: None,
                metadata: String::new(),
            }
        );
        assert_eq!(
            WebhookPayload::classify(&json!({"text": "   "})),
            WebhookPayload::Unrecognized
        );
    }

    #[test]
    fn test_normalize_is_repeatable() {
        let raw = json!({"text": "t", "sourceMetadataString": "A v1 — B\nChunks: 3"});
        assert_eq!(normalize(&raw), normalize(&raw));
    }
}
