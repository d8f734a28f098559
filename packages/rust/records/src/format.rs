//! Record-to-text renderers for the agent prompts.
//!
//! Each renderer is total: missing fields print as `N/A`. The tagging layout
//! is also valid parser input, so tagging output can be re-read losslessly.

use std::fmt::Write;

use upscnews_shared::NewsItem;

/// Placeholder for fields a record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// Separator line between articles in the tagging and linking layouts.
const SEPARATOR: &str = "--------------------";

/// Separator line between articles in the summarization layout.
const SHORT_SEPARATOR: &str = "---";

/// Header line of the linking layout.
pub const LINKING_HEADER: &str = "Summarized and Tagged Articles for Linking:";

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

/// Render records as the input of the tagging agent.
///
/// ```text
/// Article 1:
/// Title: ...
/// Description: ...
/// URL: ...
/// --------------------
/// ```
pub fn render_for_tagging(items: &[NewsItem]) -> String {
    let mut out = String::new();
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(out, "Article {}:", idx + 1);
        let _ = writeln!(out, "Title: {}", item.title);
        let _ = writeln!(out, "Description: {}", or_na(item.description.as_deref()));
        let _ = writeln!(out, "URL: {}", or_na(item.url.as_deref()));
        let _ = writeln!(out, "{SEPARATOR}");
    }
    out
}

/// Render records as the input of the summarizing agent.
pub fn render_for_summarization(items: &[NewsItem]) -> String {
    let mut out = String::new();
    for (idx, item) in items.iter().enumerate() {
        let i = idx + 1;
        let _ = writeln!(out, "Article {i} Title: {}", item.title);
        let _ = writeln!(
            out,
            "Article {i} Content (Description): {}",
            or_na(item.description.as_deref())
        );
        let _ = writeln!(out, "Article {i} Source: {}", or_na(item.source.as_deref()));
        let _ = writeln!(out, "Article {i} URL: {}", or_na(item.url.as_deref()));
        let _ = writeln!(out, "{SHORT_SEPARATOR}");
    }
    out
}

/// Render summarized, tagged records as the input of the linking agent.
pub fn render_for_linking(items: &[NewsItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{LINKING_HEADER}");
    for (idx, item) in items.iter().enumerate() {
        let topics = if item.topics.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            item.topics.join(", ")
        };
        let _ = writeln!(out, "Article {}:", idx + 1);
        let _ = writeln!(out, "Title: {}", item.title);
        let _ = writeln!(out, "Summary: {}", or_na(item.summary.as_deref()));
        let _ = writeln!(out, "UPSC Topics: {topics}");
        let _ = writeln!(out, "URL: {}", or_na(item.url.as_deref()));
        let _ = writeln!(out, "{SEPARATOR}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_news_items;

    fn sample() -> Vec<NewsItem> {
        let mut rains = NewsItem::new("Heavy rains in Mumbai");
        rains.source = Some("The Hindu".into());
        rains.published_date = Some("2024-07-01".into());
        rains.description = Some("Flooding reported.".into());
        rains.url = Some("http://example/1".into());
        rains.topics = vec!["Geography".into(), "Disaster Management".into()];
        rains.summary = Some("Rains flood low-lying areas.".into());

        let mut budget = NewsItem::new("Budget session begins");
        budget.source = Some("PIB".into());
        budget.description = Some("Parliament to convene.".into());
        budget.url = Some("http://example/2".into());

        vec![rains, budget]
    }

    #[test]
    fn tagging_layout() {
        let text = render_for_tagging(&sample()[..1]);
        assert_eq!(
            text,
            "Article 1:\nTitle: Heavy rains in Mumbai\nDescription: Flooding reported.\nURL: http://example/1\n--------------------\n"
        );
    }

    #[test]
    fn summarization_layout_marks_missing_fields() {
        let mut item = NewsItem::new("Untracked story");
        item.url = Some("http://example/u".into());
        let text = render_for_summarization(&[item]);
        assert_eq!(
            text,
            "Article 1 Title: Untracked story\nArticle 1 Content (Description): N/A\nArticle 1 Source: N/A\nArticle 1 URL: http://example/u\n---\n"
        );
    }

    #[test]
    fn linking_layout_joins_topics() {
        let text = render_for_linking(&sample());
        assert!(text.starts_with("Summarized and Tagged Articles for Linking:\nArticle 1:\n"));
        assert!(text.contains("UPSC Topics: Geography, Disaster Management\n"));
        assert!(text.contains("Summary: Rains flood low-lying areas.\n"));
        // Second record has neither topics nor summary.
        assert!(text.contains("Article 2:\nTitle: Budget session begins\nSummary: N/A\nUPSC Topics: N/A\n"));
    }

    #[test]
    fn empty_collections_render_empty() {
        assert_eq!(render_for_tagging(&[]), "");
        assert_eq!(render_for_summarization(&[]), "");
        assert_eq!(render_for_linking(&[]), format!("{LINKING_HEADER}\n"));
    }

    #[test]
    fn tagging_render_round_trips_through_parser() {
        let items = sample();
        let parsed = parse_news_items(&render_for_tagging(&items));
        assert_eq!(parsed.len(), items.len());
        for (original, reparsed) in items.iter().zip(&parsed) {
            assert_eq!(reparsed.title, original.title);
            assert_eq!(reparsed.description, original.description);
            assert_eq!(reparsed.url, original.url);
        }
    }

    #[test]
    fn tagging_render_is_idempotent() {
        let first = render_for_tagging(&sample());
        let second = render_for_tagging(&parse_news_items(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn linking_render_is_idempotent_on_parsed_fields() {
        // The linking layout carries Title and URL through the parser; the
        // Summary and Topics lines are outside the field table and are dropped.
        let items: Vec<NewsItem> = sample()
            .into_iter()
            .map(|item| {
                let mut bare = NewsItem::new(item.title);
                bare.url = item.url;
                bare
            })
            .collect();
        let first = render_for_linking(&items);
        let second = render_for_linking(&parse_news_items(&first));
        assert_eq!(first, second);
    }
}
