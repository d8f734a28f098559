//! Core domain types: news records, pipeline stages, run identifiers.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One phase of the curation pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetching,
    Tagging,
    Summarizing,
    Linking,
}

impl Stage {
    /// All stages in the order the pipeline runs them.
    pub const ALL: [Stage; 4] = [
        Stage::Fetching,
        Stage::Tagging,
        Stage::Summarizing,
        Stage::Linking,
    ];

    /// Stable lowercase name, used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Tagging => "tagging",
            Self::Summarizing => "summarizing",
            Self::Linking => "linking",
        }
    }

    /// The stage that runs after this one, if any.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Self::Fetching => Some(Self::Tagging),
            Self::Tagging => Some(Self::Summarizing),
            Self::Summarizing => Some(Self::Linking),
            Self::Linking => None,
        }
    }

    /// File name the stage's raw output is persisted under.
    ///
    /// These names are read by downstream tooling and must not change.
    pub fn output_file(&self) -> Option<&'static str> {
        match self {
            Self::Fetching => None,
            Self::Tagging => Some("upsc_news_tagged.json"),
            Self::Summarizing => Some("upsc_news_summaries.json"),
            Self::Linking => Some("upsc_news_links.txt"),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NewsItem
// ---------------------------------------------------------------------------

/// A validated news record as it flows between stages.
///
/// Field names on the wire match the JSON contract given to the tagging and
/// summarizing agents (`Title`, `UPSC_Topics`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Publication date exactly as the upstream reported it.
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Syllabus topics in the order the classifier emitted them.
    #[serde(
        rename = "UPSC_Topics",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub topics: Vec<String>,

    #[serde(rename = "Summary", default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl NewsItem {
    /// Create a record with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: None,
            published_date: None,
            description: None,
            url: None,
            topics: Vec::new(),
            summary: None,
        }
    }

    /// True when both records carry the same topic set, ignoring order and
    /// repeated entries.
    pub fn same_classification(&self, other: &NewsItem) -> bool {
        let ours: BTreeSet<&str> = self.topics.iter().map(String::as_str).collect();
        let theirs: BTreeSet<&str> = other.topics.iter().map(String::as_str).collect();
        ours == theirs
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// PartialNewsItem
// ---------------------------------------------------------------------------

/// A record under construction: every field optional until [`finalize`].
///
/// [`finalize`]: PartialNewsItem::finalize
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialNewsItem {
    pub title: Option<String>,
    pub source: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub topics: Vec<String>,
    pub summary: Option<String>,
}

impl PartialNewsItem {
    /// Promote to a [`NewsItem`]. Returns `None` when the title is missing or blank.
    pub fn finalize(self) -> Option<NewsItem> {
        let title = self.title?.trim().to_string();
        if title.is_empty() {
            return None;
        }
        Some(NewsItem {
            title,
            source: self.source,
            published_date: self.published_date,
            description: self.description,
            url: self.url,
            topics: self.topics,
            summary: self.summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_and_files() {
        assert_eq!(Stage::Fetching.next(), Some(Stage::Tagging));
        assert_eq!(Stage::Linking.next(), None);
        assert_eq!(Stage::Fetching.output_file(), None);
        assert_eq!(Stage::Tagging.output_file(), Some("upsc_news_tagged.json"));
        assert_eq!(
            Stage::Summarizing.output_file(),
            Some("upsc_news_summaries.json")
        );
        assert_eq!(Stage::Linking.output_file(), Some("upsc_news_links.txt"));
    }

    #[test]
    fn finalize_rejects_blank_title() {
        let partial = PartialNewsItem {
            title: Some("   ".into()),
            url: Some("http://example/1".into()),
            ..Default::default()
        };
        assert!(partial.finalize().is_none());
        assert!(PartialNewsItem::default().finalize().is_none());
    }

    #[test]
    fn finalize_keeps_fields() {
        let partial = PartialNewsItem {
            title: Some("Budget session begins".into()),
            source: Some("PIB".into()),
            ..Default::default()
        };
        let item = partial.finalize().expect("titled block");
        assert_eq!(item.title, "Budget session begins");
        assert_eq!(item.source.as_deref(), Some("PIB"));
        assert!(item.published_date.is_none());
    }

    #[test]
    fn same_classification_ignores_order() {
        let mut a = NewsItem::new("A");
        a.topics = vec!["Indian Economy".into(), "Geography".into()];
        let mut b = NewsItem::new("B");
        b.topics = vec!["Geography".into(), "Indian Economy".into(), "Geography".into()];
        assert!(a.same_classification(&b));

        b.topics.pop();
        b.topics.pop();
        assert!(!a.same_classification(&b));
    }

    #[test]
    fn news_item_json_contract() {
        let json = r#"{"Title":"Heavy rains","Description":"Flooding","URL":"http://example/1","UPSC_Topics":["Geography"]}"#;
        let item: NewsItem = serde_json::from_str(json).expect("deserialize");
        assert_eq!(item.title, "Heavy rains");
        assert_eq!(item.topics, vec!["Geography".to_string()]);
        assert!(item.summary.is_none());

        let out = serde_json::to_string(&item).expect("serialize");
        assert!(out.contains(r#""UPSC_Topics":["Geography"]"#));
        assert!(!out.contains("Summary"));
    }

    #[test]
    fn null_topics_decode_as_empty() {
        let json = r#"{"Title":"T","UPSC_Topics":null}"#;
        let item: NewsItem = serde_json::from_str(json).expect("deserialize");
        assert!(item.topics.is_empty());
    }
}
