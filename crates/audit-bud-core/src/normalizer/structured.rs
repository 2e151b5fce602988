use crate::models::DocumentRecord;
use serde_json::{Map, Value};

/// Display text for a scalar or list value. Blank strings count as missing.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text_of).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// First usable value among several spellings of the same field.
fn field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| obj.get(*key).and_then(text_of))
}

/// Builds a record from one element of a `sourceMetadata` array.
///
/// Accepts both the snake_case names the webhook emits (`document_id`,
/// `chunk_count`, `ranks_sections_str`) and the camelCase ones; anything
/// missing keeps the default-table value. Non-object elements yield `None`.
pub fn record_from_value(value: &Value) -> Option<DocumentRecord> {
    let obj = value.as_object()?;
    let mut record = DocumentRecord::default();

    let slots: [(&mut String, &[&str]); 10] = [
        (&mut record.id, &["document_id", "id", "documentId"]),
        (&mut record.version, &["version"]),
        (&mut record.title, &["title", "document_title"]),
        (&mut record.status, &["status"]),
        (&mut record.effective_date, &["effective_date", "effectiveDate"]),
        (&mut record.author, &["author"]),
        (&mut record.chunk_count, &["chunk_count", "chunkCount", "chunks"]),
        (&mut record.summary, &["summary"]),
        (
            &mut record.ranks_sections,
            &["ranks_sections_str", "ranksSections", "ranks_sections"],
        ),
        (&mut record.keywords, &["keywords"]),
    ];
    for (slot, keys) in slots {
        if let Some(text) = field(obj, keys) {
            *slot = text;
        }
    }
    record.document_type = field(obj, &["document_type", "documentType"]);

    Some(record)
}
