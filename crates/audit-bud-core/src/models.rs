use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const DEFAULT_STATUS: &str = "N/A";
pub const DEFAULT_EFFECTIVE_DATE: &str = "N/A";
pub const DEFAULT_AUTHOR: &str = "Unknown";
pub const DEFAULT_CHUNK_COUNT: &str = "0";
pub const DEFAULT_RANKS_SECTIONS: &str = "N/A";
pub const DEFAULT_KEYWORDS: &str = "None";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Metadata for one source document backing an answer.
///
/// Every field is display text. Fields the webhook leaves out carry the
/// values from the default table (`DEFAULT_*`); `id`, `version`, `title`
/// and `summary` default to blank.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub version: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    pub status: String,
    pub effective_date: String,
    pub author: String,
    pub chunk_count: String,
    pub summary: String,
    pub ranks_sections: String,
    pub keywords: String,
}

impl Default for DocumentRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            version: String::new(),
            title: String::new(),
            document_type: None,
            status: DEFAULT_STATUS.to_string(),
            effective_date: DEFAULT_EFFECTIVE_DATE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            chunk_count: DEFAULT_CHUNK_COUNT.to_string(),
            summary: String::new(),
            ranks_sections: DEFAULT_RANKS_SECTIONS.to_string(),
            keywords: DEFAULT_KEYWORDS.to_string(),
        }
    }
}

static RANK_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#?(\d+)\s*\(([0-9.]+)\)\s*-\s*(.+)").expect("rank entry pattern is valid")
});

impl DocumentRecord {
    /// Card shown while no query has produced any records yet.
    pub fn placeholder() -> Self {
        Self {
            id: "Unknown".to_string(),
            version: "N/A".to_string(),
            effective_date: "10/4/2025".to_string(),
            summary: "No summary available".to_string(),
            ..Self::default()
        }
    }

    /// Parses `ranks_sections` entries like `#1 (0.92) - Scope`.
    ///
    /// Entries are separated by `", "`; anything that doesn't match the
    /// `#<rank> (<score>) - <section>` shape is skipped.
    pub fn ranked_sections(&self) -> Vec<RankedSection> {
        let raw = self.ranks_sections.trim();
        if raw.is_empty() || raw == DEFAULT_RANKS_SECTIONS {
            return Vec::new();
        }

        raw.split(", ")
            .filter_map(|entry| {
                let caps = RANK_ENTRY.captures(entry)?;
                Some(RankedSection {
                    rank: caps[1].parse().ok()?,
                    score: caps[2].parse().ok()?,
                    section: caps[3].trim().to_string(),
                })
            })
            .collect()
    }

    pub fn keyword_list(&self) -> Vec<String> {
        let raw = self.keywords.trim();
        if raw.is_empty() || raw == DEFAULT_KEYWORDS {
            return Vec::new();
        }
        raw.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RankedSection {
    pub rank: u32,
    pub score: f64,
    pub section: String,
}

impl RankedSection {
    pub fn score_percent(&self) -> String {
        format!("{:.1}%", self.score * 100.0)
    }
}
