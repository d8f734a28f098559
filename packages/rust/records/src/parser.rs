//! Block-format news parser.
//!
//! Turns the loosely structured text produced by the search renderer and by
//! the fetcher agent into [`NewsItem`]s:
//! - A block starts at `1. Headline` (1 to 10) or `Title: Headline`
//! - Field lines: `Source:`, `Date:`, `Description:`, `URL:`
//! - Unlabelled lines continue the current `Description`
//! - Rules (`-----`, `=====`) and `Article N:` headings are layout only

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use upscnews_shared::{NewsItem, PartialNewsItem};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Records recovered from a stage payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedNews {
    /// Records with a non-empty title, in input order.
    pub items: Vec<NewsItem>,
    /// Blocks dropped because they never acquired a title.
    pub rejected: usize,
}

/// Fields that can be set from a labelled line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Date,
    Description,
    Url,
}

/// Label table, checked in this order. Labels are disjoint.
const FIELD_LABELS: [(&str, Field); 4] = [
    ("Source:", Field::Source),
    ("Date:", Field::Date),
    ("Description:", Field::Description),
    ("URL:", Field::Url),
];

const TITLE_LABEL: &str = "Title:";

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `1. Headline` through `10. Headline`, and a bare `3.` marker.
static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:10|[1-9])\.(?:\s+(.*))?$").expect("numbered block regex")
});

/// Matches `Article 3:` headings emitted by the formatters.
static ARTICLE_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Article \d+:$").expect("article heading regex"));

/// Matches horizontal rules made of dashes or equals signs.
static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-{3,}|={3,})$").expect("rule regex"));

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Layout,
    BlockStart(&'a str),
    Field(Field, &'a str),
    Continuation(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }
    if RULE_RE.is_match(line) || ARTICLE_HEADING_RE.is_match(line) {
        return Line::Layout;
    }
    if let Some(caps) = NUMBERED_RE.captures(line) {
        let title = caps.get(1).map_or("", |m| m.as_str());
        return Line::BlockStart(title.trim());
    }
    if let Some(title) = line.strip_prefix(TITLE_LABEL) {
        return Line::BlockStart(title.trim());
    }
    for (label, field) in FIELD_LABELS {
        if let Some(value) = line.strip_prefix(label) {
            return Line::Field(field, value.trim());
        }
    }
    Line::Continuation(line)
}

fn set_field(block: &mut PartialNewsItem, field: Field, value: &str) {
    let slot = match field {
        Field::Source => &mut block.source,
        Field::Date => &mut block.published_date,
        Field::Description => &mut block.description,
        Field::Url => &mut block.url,
    };
    *slot = Some(value.to_string());
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse block-formatted text into records, reporting rejected blocks.
///
/// Never fails: unrecognisable input yields an empty result.
pub fn parse_news(text: &str) -> ParsedNews {
    let mut parsed = ParsedNews::default();
    let mut current: Option<PartialNewsItem> = None;

    for raw in text.lines() {
        match classify(raw.trim()) {
            Line::Blank | Line::Layout => {}
            Line::BlockStart(title) => {
                if let Some(block) = current.take() {
                    flush(&mut parsed, block);
                }
                current = Some(PartialNewsItem {
                    title: Some(title.to_string()),
                    ..Default::default()
                });
            }
            Line::Field(field, value) => {
                // Fields before the first block are preamble.
                if let Some(block) = current.as_mut() {
                    set_field(block, field, value);
                }
            }
            Line::Continuation(text) => {
                // An empty `Description:` takes the next line without a leading space.
                if let Some(description) = current.as_mut().and_then(|b| b.description.as_mut()) {
                    if !description.is_empty() {
                        description.push(' ');
                    }
                    description.push_str(text);
                }
            }
        }
    }

    if let Some(block) = current.take() {
        flush(&mut parsed, block);
    }

    if parsed.rejected > 0 {
        debug!(rejected = parsed.rejected, "dropped blocks without a title");
    }

    parsed
}

/// Parse block-formatted text, keeping only the accepted records.
pub fn parse_news_items(text: &str) -> Vec<NewsItem> {
    parse_news(text).items
}

fn flush(parsed: &mut ParsedNews, block: PartialNewsItem) {
    match block.finalize() {
        Some(item) => parsed.items.push(item),
        None => parsed.rejected += 1,
    }
}
