//! Free-text rendering of search hits.
//!
//! The layout is the block format read back by `upscnews_records::parser`,
//! so field labels and numbering here must stay in step with it.

use std::fmt::Write;

use crate::{MAX_RESULTS, SearchHit};

/// Text returned when the provider has nothing for a query.
pub const NO_RESULTS: &str = "No news articles found for the given query.";

const HEADER: &str = "UPSC Relevant News Articles:";
const HEADER_RULE_WIDTH: usize = 50;
const ITEM_RULE_WIDTH: usize = 50;

/// Render hits as numbered article blocks.
///
/// Hits without a title are skipped and absent fields omit their line. At
/// most [`MAX_RESULTS`] blocks are emitted.
pub fn render_results(hits: &[SearchHit]) -> String {
    let titled: Vec<(&SearchHit, &str)> = hits
        .iter()
        .filter_map(|hit| {
            let title = hit.title.as_deref().map(str::trim)?;
            (!title.is_empty()).then_some((hit, title))
        })
        .take(MAX_RESULTS)
        .collect();

    if titled.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{HEADER}");
    let _ = writeln!(out, "{}\n", "=".repeat(HEADER_RULE_WIDTH));

    for (idx, (hit, title)) in titled.into_iter().enumerate() {
        let _ = writeln!(out, "{}. {title}", idx + 1);
        write_field(&mut out, "Source", hit.source.as_deref());
        write_field(&mut out, "Date", hit.date.as_deref());
        write_field(&mut out, "Description", hit.snippet.as_deref());
        write_field(&mut out, "URL", hit.link.as_deref());
        let _ = writeln!(out, "{}\n", "-".repeat(ITEM_RULE_WIDTH));
    }

    out
}

fn write_field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "   {label}: {value}");
    }
}
