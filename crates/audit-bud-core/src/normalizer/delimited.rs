use crate::models::{
    DocumentRecord, DEFAULT_AUTHOR, DEFAULT_CHUNK_COUNT, DEFAULT_EFFECTIVE_DATE,
    DEFAULT_KEYWORDS, DEFAULT_RANKS_SECTIONS, DEFAULT_STATUS,
};
use regex::Regex;
use std::sync::LazyLock;

pub const RECORD_DELIMITER: &str = "---";

// `<ID> v<N> — <title>`
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(v\d+)\s+—\s+(.+)$").expect("header pattern is valid")
});

#[derive(Debug, Clone, Copy)]
enum Field {
    Status,
    EffectiveDate,
    Author,
    Chunks,
    RanksSections,
    Keywords,
}

impl Field {
    const ALL: [Field; 6] = [
        Field::Status,
        Field::EffectiveDate,
        Field::Author,
        Field::Chunks,
        Field::RanksSections,
        Field::Keywords,
    ];

    fn marker(self) -> &'static str {
        match self {
            Field::Status => "Status:",
            Field::EffectiveDate => "Effective Date:",
            Field::Author => "Author:",
            Field::Chunks => "Chunks:",
            Field::RanksSections => "Ranks & Sections:",
            Field::Keywords => "Keywords:",
        }
    }

    fn default_value(self) -> &'static str {
        match self {
            Field::Status => DEFAULT_STATUS,
            Field::EffectiveDate => DEFAULT_EFFECTIVE_DATE,
            Field::Author => DEFAULT_AUTHOR,
            Field::Chunks => DEFAULT_CHUNK_COUNT,
            Field::RanksSections => DEFAULT_RANKS_SECTIONS,
            Field::Keywords => DEFAULT_KEYWORDS,
        }
    }

    fn slot(self, record: &mut DocumentRecord) -> &mut String {
        match self {
            Field::Status => &mut record.status,
            Field::EffectiveDate => &mut record.effective_date,
            Field::Author => &mut record.author,
            Field::Chunks => &mut record.chunk_count,
            Field::RanksSections => &mut record.ranks_sections,
            Field::Keywords => &mut record.keywords,
        }
    }

    /// Marker that starts earliest in `line`, with the trimmed text after it.
    /// Later markers are part of the value.
    fn find(line: &str) -> Option<(Field, &str)> {
        Field::ALL
            .iter()
            .filter_map(|&field| line.find(field.marker()).map(|pos| (pos, field)))
            .min_by_key(|&(pos, _)| pos)
            .map(|(pos, field)| (field, line[pos + field.marker().len()..].trim()))
    }
}

/// Splits a `---` delimited metadata blob into document records.
///
/// Blank records are dropped, so the result has one entry per non-empty
/// section of the blob.
pub fn parse_metadata_string(blob: &str) -> Vec<DocumentRecord> {
    blob.split(RECORD_DELIMITER)
        .filter_map(parse_record)
        .collect()
}

fn parse_record(section: &str) -> Option<DocumentRecord> {
    let mut lines = section.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next()?;

    let mut record = DocumentRecord::default();

    match HEADER.captures(first) {
        Some(caps) => {
            record.id = caps[1].to_string();
            record.version = caps[2].to_string();
            record.title = caps[3].trim().to_string();
        }
        None => apply_line(&mut record, first),
    }

    for line in lines {
        apply_line(&mut record, line);
    }

    Some(record)
}

fn apply_line(record: &mut DocumentRecord, line: &str) {
    if let Some((field, value)) = Field::find(line) {
        let value = if value.is_empty() {
            field.default_value()
        } else {
            value
        };
        *field.slot(record) = value.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECORDS: &str = "\
POL-7 v3 — Access Control Policy
Status: Approved
Effective Date: 2025-01-15
Author: Priya Shah
Chunks: 14
Ranks & Sections: #1 (0.91) - Scope, #2 (0.77) - Roles
Keywords: access, identity
---
SOP-2 v1 — Backup Procedure
Status: Draft
";

    #[test]
    fn test_single_record_with_defaults() {
        let records = parse_metadata_string("DOC-1 v2 — Policy Title\nStatus: Active\nAuthor: Jane");
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.id, "DOC-1");
        assert_eq!(r.version, "v2");
        assert_eq!(r.title, "Policy Title");
        assert_eq!(r.status, "Active");
        assert_eq!(r.author, "Jane");
        assert_eq!(r.effective_date, "N/A");
        assert_eq!(r.chunk_count, "0");
        assert_eq!(r.keywords, "None");
        assert_eq!(r.ranks_sections, "N/A");
    }

    #[test]
    fn test_multiple_records() {
        let records = parse_metadata_string(TWO_RECORDS);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id, "POL-7");
        assert_eq!(records[0].effective_date, "2025-01-15");
        assert_eq!(records[0].chunk_count, "14");
        assert_eq!(records[0].keywords, "access, identity");
        assert_eq!(records[0].ranked_sections().len(), 2);

        assert_eq!(records[1].id, "SOP-2");
        assert_eq!(records[1].status, "Draft");
        assert_eq!(records[1].author, "Unknown");
    }

    #[test]
    fn test_blank_records_are_dropped() {
        let blob = "---\n\n---\nA-1 v1 — One\n---   \n  \n---\nB-2 v4 — Two\n---";
        let records = parse_metadata_string(blob);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "A-1");
        assert_eq!(records[1].id, "B-2");
        assert!(parse_metadata_string("").is_empty());
        assert!(parse_metadata_string("  \n ").is_empty());
    }

    #[test]
    fn test_empty_marker_uses_default() {
        let records = parse_metadata_string(
            "X v1 — T\nStatus:\nEffective Date:   \nAuthor:\nChunks:\nRanks & Sections:\nKeywords:",
        );
        let r = &records[0];
        assert_eq!(r.status, "N/A");
        assert_eq!(r.effective_date, "N/A");
        assert_eq!(r.author, "Unknown");
        assert_eq!(r.chunk_count, "0");
        assert_eq!(r.ranks_sections, "N/A");
        assert_eq!(r.keywords, "None");
    }

    #[test]
    fn test_unmatched_header_leaves_identity_blank() {
        let records = parse_metadata_string("Some loose heading\nStatus: Retired\nNotes: ignored");
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert!(r.id.is_empty());
        assert!(r.version.is_empty());
        assert!(r.title.is_empty());
        assert_eq!(r.status, "Retired");
    }

    #[test]
    fn test_marker_on_first_line_without_header() {
        let records = parse_metadata_string("Status: Active\nAuthor: Lee");
        assert_eq!(records[0].status, "Active");
        assert_eq!(records[0].author, "Lee");
        assert!(records[0].id.is_empty());
    }

    #[test]
    fn test_header_needs_version_token() {
        let records = parse_metadata_string("DOC-1 2 — Title");
        assert!(records[0].id.is_empty());
        assert!(records[0].title.is_empty());
    }

    #[test]
    fn test_marker_text_inside_value() {
        let records = parse_metadata_string(
            "A v1 — T\nKeywords: Status: reporting, audit\nRanks & Sections: #1 (0.9) - Author: Guide",
        );
        let r = &records[0];
        assert_eq!(r.keywords, "Status: reporting, audit");
        assert_eq!(r.ranks_sections, "#1 (0.9) - Author: Guide");
        assert_eq!(r.status, "N/A");
        assert_eq!(r.author, "Unknown");
    }

    #[test]
    fn test_parsing_is_repeatable() {
        assert_eq!(
            parse_metadata_string(TWO_RECORDS),
            parse_metadata_string(TWO_RECORDS)
        );
    }
}
