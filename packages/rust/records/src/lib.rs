//! Record parsing and rendering for the curation pipeline.
//!
//! - [`parser`]: block-formatted free text to [`NewsItem`]s
//! - [`format`]: [`NewsItem`]s to the prompt layouts of each agent
//! - [`decode`]: JSON stage outputs to [`NewsItem`]s
//!
//! [`NewsItem`]: upscnews_shared::NewsItem

pub mod decode;
pub mod format;
pub mod parser;

pub use decode::decode_records;
pub use format::{NOT_AVAILABLE, render_for_linking, render_for_summarization, render_for_tagging};
pub use parser::{ParsedNews, parse_news, parse_news_items};
