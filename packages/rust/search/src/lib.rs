//! News search against the Serper news API.
//!
//! The fetching stage never talks to the provider directly: it asks a
//! [`NewsSource`] for block-formatted text. [`SerperNewsSource`] is the
//! production source; tests substitute their own.

mod render;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use upscnews_shared::{FetchConfig, Result, SearchConfig, UpscNewsError};

pub use render::{NO_RESULTS, render_results};

/// Hits used from a single provider response.
pub const MAX_RESULTS: usize = 10;

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("upscnews/", env!("CARGO_PKG_VERSION"));

/// Service name used in upstream errors.
const SERVICE: &str = "search";

/// Query used by the start-up smoke test.
pub const SMOKE_TEST_QUERY: &str = "latest news headlines";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One search request.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    /// Free-text query.
    pub q: String,
    /// Country code (`gl`).
    pub gl: String,
    /// Interface language (`hl`).
    pub hl: String,
    /// Number of results requested.
    pub num: usize,
}

impl SearchQuery {
    /// Build a query using the configured locale.
    pub fn new(q: impl Into<String>, config: &SearchConfig) -> Result<Self> {
        let q = q.into();
        if q.trim().is_empty() {
            return Err(UpscNewsError::validation("search query must not be empty"));
        }
        Ok(Self {
            q,
            gl: config.country.clone(),
            hl: config.language.clone(),
            num: MAX_RESULTS,
        })
    }
}

/// One news hit as the provider reports it. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news: Vec<SearchHit>,
}

// ---------------------------------------------------------------------------
// SearchClient
// ---------------------------------------------------------------------------

/// HTTP client for the news search endpoint.
#[derive(Clone)]
pub struct SearchClient {
    http: Client,
    endpoint: String,
    api_key: String,
    config: SearchConfig,
}

impl SearchClient {
    /// Build a client for the configured endpoint.
    pub fn new(config: &SearchConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpscNewsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: api_key.into(),
            config: config.clone(),
        })
    }

    /// Build a [`SearchQuery`] with this client's locale.
    pub fn query(&self, q: impl Into<String>) -> Result<SearchQuery> {
        SearchQuery::new(q, &self.config)
    }

    /// Run one query and return at most [`MAX_RESULTS`] hits.
    #[instrument(skip_all, fields(q = %query.q))]
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(query)
            .send()
            .await
            .map_err(|e| UpscNewsError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(UpscNewsError::config(format!(
                "search provider rejected the API key (HTTP {status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpscNewsError::upstream(
                SERVICE,
                format!("HTTP {status}: {}", body.trim()),
            ));
        }

        let parsed: NewsResponse = response.json().await.map_err(|e| {
            UpscNewsError::upstream(SERVICE, format!("unreadable response body: {e}"))
        })?;

        let mut hits = parsed.news;
        hits.truncate(MAX_RESULTS);
        debug!(hits = hits.len(), "search complete");
        Ok(hits)
    }

    /// Run one query and render the hits as article blocks.
    pub async fn search_text(&self, q: &str) -> Result<String> {
        let query = self.query(q)?;
        let hits = self.search(&query).await?;
        Ok(render_results(&hits))
    }
}

// ---------------------------------------------------------------------------
// NewsSource
// ---------------------------------------------------------------------------

/// Supplier of the raw article text the fetching stage parses.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Return block-formatted article text (see [`render_results`]).
    async fn fetch_news(&self) -> Result<String>;
}

/// Runs every configured query, merges the hits, and renders them.
#[derive(Clone)]
pub struct SerperNewsSource {
    client: SearchClient,
    queries: Vec<String>,
    max_articles: usize,
}

impl SerperNewsSource {
    pub fn new(client: SearchClient, fetch: &FetchConfig) -> Self {
        Self {
            client,
            queries: fetch
                .queries
                .iter()
                .filter(|q| !q.trim().is_empty())
                .cloned()
                .collect(),
            max_articles: fetch.max_articles.min(MAX_RESULTS),
        }
    }

    /// Run all queries in order, dropping hits whose link was already seen.
    pub async fn collect_hits(&self) -> Result<Vec<SearchHit>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut merged = Vec::new();

        for q in &self.queries {
            let query = self.client.query(q.as_str())?;
            for hit in self.client.search(&query).await? {
                if hit.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
                    continue;
                }
                if let Some(link) = &hit.link {
                    if !seen.insert(link.clone()) {
                        continue;
                    }
                }
                merged.push(hit);
            }
        }

        if merged.len() > self.max_articles {
            debug!(
                found = merged.len(),
                kept = self.max_articles,
                "more hits than fetch.max_articles, keeping the first"
            );
            merged.truncate(self.max_articles);
        }
        Ok(merged)
    }
}

#[async_trait]
impl NewsSource for SerperNewsSource {
    #[instrument(skip_all, fields(queries = self.queries.len()))]
    async fn fetch_news(&self) -> Result<String> {
        let hits = self.collect_hits().await?;
        info!(articles = hits.len(), "news fetched");
        Ok(render_results(&hits))
    }
}
