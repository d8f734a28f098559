//! JSON stage-contract decoding for the tagging and summarizing agents.

use serde::Deserialize;
use tracing::debug;
use upscnews_shared::{PartialNewsItem, Result, Stage, UpscNewsError};

use crate::parser::ParsedNews;

/// Longest payload excerpt quoted in a parse error.
const EXCERPT_CHARS: usize = 200;

/// Wire shape of one record. Every field is optional so that an untitled
/// record is counted as rejected rather than failing the whole payload.
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Source", default)]
    source: Option<String>,
    #[serde(rename = "Date", default)]
    published_date: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "UPSC_Topics", default)]
    topics: Option<Vec<String>>,
    #[serde(rename = "Summary", default)]
    summary: Option<String>,
}

impl From<WireRecord> for PartialNewsItem {
    fn from(wire: WireRecord) -> Self {
        Self {
            title: wire.title,
            source: wire.source,
            published_date: wire.published_date,
            description: wire.description,
            url: wire.url,
            topics: wire.topics.unwrap_or_default(),
            summary: wire.summary,
        }
    }
}

/// Decode a stage's JSON array of records.
///
/// The payload may be wrapped in a single Markdown code fence. Anything that
/// is not a JSON array of objects is a [`UpscNewsError::Parse`] for `stage`.
pub fn decode_records(stage: Stage, raw: &str) -> Result<ParsedNews> {
    let payload = strip_code_fence(raw.trim());
    if payload.is_empty() {
        return Err(UpscNewsError::parse(stage, "empty output"));
    }

    let records: Vec<WireRecord> = serde_json::from_str(payload).map_err(|e| {
        UpscNewsError::parse(
            stage,
            format!("invalid JSON ({e}) in output starting {:?}", excerpt(payload)),
        )
    })?;

    let mut parsed = ParsedNews::default();
    for record in records {
        match PartialNewsItem::from(record).finalize() {
            Some(item) => parsed.items.push(item),
            None => parsed.rejected += 1,
        }
    }

    debug!(
        stage = %stage,
        records = parsed.items.len(),
        rejected = parsed.rejected,
        "decoded stage output"
    );

    Ok(parsed)
}

/// Remove one surrounding ```` ``` ```` fence (with optional language tag).
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (`json`) on the opening line.
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_array() {
        let raw = r#"[{"Title":"Heavy rains","Description":"Flooding","URL":"http://example/1","UPSC_Topics":["Geography"]}]"#;
        let parsed = decode_records(Stage::Tagging, raw).expect("decode");
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].topics, vec!["Geography".to_string()]);
        assert_eq!(parsed.rejected, 0);
    }

    #[test]
    fn decode_fenced_fixture_rejects_untitled() {
        let content = std::fs::read_to_string("../../../fixtures/json/tagged.fixture.json")
            .expect("read fixture");
        let parsed = decode_records(Stage::Tagging, &content).expect("decode");
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.rejected, 1);
        assert_eq!(
            parsed.items[1].topics,
            vec![
                "Indian Polity and Governance".to_string(),
                "Current Events of National Importance".to_string()
            ]
        );
    }

    #[test]
    fn decode_bare_fence() {
        let raw = "```\n[{\"Title\":\"A\",\"Summary\":\"Short.\"}]\n```";
        let parsed = decode_records(Stage::Summarizing, raw).expect("decode");
        assert_eq!(parsed.items[0].summary.as_deref(), Some("Short."));
        assert!(parsed.items[0].topics.is_empty());
    }

    #[test]
    fn missing_title_key_is_rejected_not_fatal() {
        let raw = r#"[{"Description":"orphan"},{"Title":"Kept"}]"#;
        let parsed = decode_records(Stage::Summarizing, raw).expect("decode");
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.rejected, 1);
    }

    #[test]
    fn prose_is_a_parse_error_for_the_stage() {
        let err = decode_records(Stage::Tagging, "Here are the tagged articles: ...")
            .expect_err("prose must fail");
        match err {
            UpscNewsError::Parse { stage, message } => {
                assert_eq!(stage, Stage::Tagging);
                assert!(message.contains("Here are the tagged"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_output_is_a_parse_error() {
        let err = decode_records(Stage::Summarizing, "  \n ").expect_err("empty must fail");
        assert!(matches!(err, UpscNewsError::Parse { stage: Stage::Summarizing, .. }));
    }

    #[test]
    fn object_instead_of_array_fails() {
        assert!(decode_records(Stage::Tagging, r#"{"Title":"A"}"#).is_err());
    }

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("[1]"), "[1]");
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```[1]```"), "[1]");
        assert_eq!(strip_code_fence("```json\n[1]"), "```json\n[1]");
    }
}
