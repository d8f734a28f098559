//! End-to-end curation run: fetch → tag → summarize → link.
//!
//! The run is an explicit state machine. Each [`PipelineState`] carries the
//! records the previous stage produced; [`Coordinator::step`] consumes one
//! state and returns the next, so a stage can only start once its input has
//! been fully parsed and validated.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use upscnews_agents::{AgentInvoker, AgentRole};
use upscnews_records::{
    decode_records, parse_news, render_for_linking, render_for_summarization, render_for_tagging,
};
use upscnews_search::NewsSource;
use upscnews_shared::{AppConfig, NewsItem, Result, RunId, Stage, UpscNewsError};

use crate::output::persist_artifact;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Where a run currently is, with the records handed to that stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Fetching,
    Tagging { fetched: Vec<NewsItem> },
    Summarizing { tagged: Vec<NewsItem> },
    Linking { summarized: Vec<NewsItem> },
    Done { links: String },
}

impl PipelineState {
    /// The stage this state runs, or `None` once the run is done.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Fetching => Some(Stage::Fetching),
            Self::Tagging { .. } => Some(Stage::Tagging),
            Self::Summarizing { .. } => Some(Stage::Summarizing),
            Self::Linking { .. } => Some(Stage::Linking),
            Self::Done { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Report & progress
// ---------------------------------------------------------------------------

/// An artifact that could not be written. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistFailure {
    pub file: PathBuf,
    pub message: String,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub fetched: usize,
    pub tagged: usize,
    pub summarized: usize,
    /// Blocks and records dropped for lacking a title, across all stages.
    pub rejected: usize,
    /// Summarized records, in summarizer order. Empty until Linking completes.
    pub summaries: Vec<NewsItem>,
    pub links: String,
    pub artifacts: Vec<PathBuf>,
    pub persist_failures: Vec<PersistFailure>,
    pub elapsed: Duration,
}

impl RunReport {
    /// An empty report for a run starting now.
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Utc::now(),
            fetched: 0,
            tagged: 0,
            summarized: 0,
            rejected: 0,
            summaries: Vec::new(),
            links: String::new(),
            artifacts: Vec::new(),
            persist_failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Records a finished stage handed on. Linking reports the articles it linked.
    pub fn records_for(&self, stage: Stage) -> usize {
        match stage {
            Stage::Fetching => self.fetched,
            Stage::Tagging => self.tagged,
            Stage::Summarizing | Stage::Linking => self.summarized,
        }
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress callback for reporting pipeline status.
pub trait PipelineProgress: Send + Sync {
    /// Called before a stage starts.
    fn stage_started(&self, stage: Stage);
    /// Called after a stage validated its output; `records` is what it produced.
    fn stage_finished(&self, stage: Stage, records: usize);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl PipelineProgress for SilentProgress {
    fn stage_started(&self, _stage: Stage) {}
    fn stage_finished(&self, _stage: Stage, _records: usize) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Run settings taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub output_dir: PathBuf,
    /// Pass search results through the fetcher agent before parsing.
    pub curate_with_llm: bool,
}

impl CoordinatorOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            output_dir: config.output.dir.clone(),
            curate_with_llm: config.fetch.curate_with_llm,
        }
    }
}

/// Drives one run through the four stages with its collaborators.
pub struct Coordinator<'a> {
    source: &'a dyn NewsSource,
    agents: &'a dyn AgentInvoker,
    options: CoordinatorOptions,
}

impl<'a> Coordinator<'a> {
    pub fn new(
        source: &'a dyn NewsSource,
        agents: &'a dyn AgentInvoker,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            source,
            agents,
            options,
        }
    }

    /// Run every stage to completion.
    ///
    /// The first contract violation or upstream failure aborts the run;
    /// artifacts already written stay on disk.
    #[instrument(skip_all, fields(output_dir = %self.options.output_dir.display()))]
    pub async fn run(&self, progress: &dyn PipelineProgress) -> Result<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::new();

        info!(run_id = %report.run_id, "starting curation run");

        let mut state = PipelineState::Fetching;
        while let Some(stage) = state.stage() {
            progress.stage_started(stage);
            state = match self.step(state, &mut report).await {
                Ok(next) => next,
                Err(e) => {
                    error!(
                        run_id = %report.run_id,
                        %stage,
                        error = %e,
                        "stage failed, aborting run"
                    );
                    return Err(e);
                }
            };
            progress.stage_finished(stage, report.records_for(stage));
        }

        if let PipelineState::Done { links } = state {
            report.links = links;
        }
        report.elapsed = start.elapsed();

        progress.done(&report);

        info!(
            run_id = %report.run_id,
            fetched = report.fetched,
            tagged = report.tagged,
            summarized = report.summarized,
            rejected = report.rejected,
            artifacts = report.artifacts.len(),
            persist_failures = report.persist_failures.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "curation run complete"
        );

        Ok(report)
    }

    /// Execute the stage of `state` and return the following state.
    pub async fn step(
        &self,
        state: PipelineState,
        report: &mut RunReport,
    ) -> Result<PipelineState> {
        match state {
            PipelineState::Fetching => {
                let fetched = self.fetch(report).await?;
                report.fetched = fetched.len();
                Ok(PipelineState::Tagging { fetched })
            }
            PipelineState::Tagging { fetched } => {
                let tagged = self.tag(&fetched, report).await?;
                report.tagged = tagged.len();
                Ok(PipelineState::Summarizing { tagged })
            }
            PipelineState::Summarizing { tagged } => {
                let summarized = self.summarize(&tagged, report).await?;
                report.summarized = summarized.len();
                Ok(PipelineState::Linking { summarized })
            }
            PipelineState::Linking { summarized } => {
                let links = self.link(&summarized, report).await?;
                report.summaries = summarized;
                Ok(PipelineState::Done { links })
            }
            PipelineState::Done { links } => Ok(PipelineState::Done { links }),
        }
    }

    // --- Stage 1: Fetching ---

    #[instrument(skip_all)]
    async fn fetch(&self, report: &mut RunReport) -> Result<Vec<NewsItem>> {
        let search_text = self.source.fetch_news().await?;

        let found = parse_news(&search_text);
        report.rejected += found.rejected;
        if found.items.is_empty() {
            return Err(UpscNewsError::parse(
                Stage::Fetching,
                "search returned no usable news items",
            ));
        }
        info!(articles = found.items.len(), "search results parsed");

        if !self.options.curate_with_llm {
            return Ok(found.items);
        }

        let curated_text = self
            .agents
            .invoke(AgentRole::NewsFetcher, &search_text)
            .await?;
        let curated = parse_news(&curated_text);
        report.rejected += curated.rejected;
        if curated.items.is_empty() {
            return Err(UpscNewsError::parse(
                Stage::Fetching,
                "fetcher agent returned no parsable news items",
            ));
        }
        info!(articles = curated.items.len(), "fetcher agent curated articles");
        Ok(curated.items)
    }

    // --- Stage 2: Tagging ---

    #[instrument(skip_all, fields(articles = fetched.len()))]
    async fn tag(&self, fetched: &[NewsItem], report: &mut RunReport) -> Result<Vec<NewsItem>> {
        let input = render_for_tagging(fetched);
        let raw = self.agents.invoke(AgentRole::Tagger, &input).await?;

        let decoded = decode_records(Stage::Tagging, &raw)?;
        report.rejected += decoded.rejected;
        if decoded.items.is_empty() {
            return Err(UpscNewsError::parse(Stage::Tagging, "no tagged records"));
        }

        self.persist(Stage::Tagging, &raw, report);
        Ok(decoded.items)
    }

    // --- Stage 3: Summarizing ---

    #[instrument(skip_all, fields(articles = tagged.len()))]
    async fn summarize(
        &self,
        tagged: &[NewsItem],
        report: &mut RunReport,
    ) -> Result<Vec<NewsItem>> {
        let input = render_for_summarization(tagged);
        let raw = self.agents.invoke(AgentRole::Summarizer, &input).await?;

        let decoded = decode_records(Stage::Summarizing, &raw)?;
        report.rejected += decoded.rejected;
        if decoded.items.is_empty() {
            return Err(UpscNewsError::parse(Stage::Summarizing, "no summary records"));
        }

        let summarized = carry_topics_forward(tagged, decoded.items);
        self.persist(Stage::Summarizing, &raw, report);
        Ok(summarized)
    }

    // --- Stage 4: Linking ---

    #[instrument(skip_all, fields(articles = summarized.len()))]
    async fn link(&self, summarized: &[NewsItem], report: &mut RunReport) -> Result<String> {
        let input = render_for_linking(summarized);
        let links = self.agents.invoke(AgentRole::Linker, &input).await?;

        if links.trim().is_empty() {
            return Err(UpscNewsError::parse(Stage::Linking, "empty linking output"));
        }

        self.persist(Stage::Linking, &links, report);
        Ok(links)
    }

    /// Write a validated stage output. Failures are logged and recorded only.
    fn persist(&self, stage: Stage, content: &str, report: &mut RunReport) {
        let Some(filename) = stage.output_file() else {
            return;
        };
        match persist_artifact(&self.options.output_dir, filename, content) {
            Ok(path) => {
                info!(%stage, path = %path.display(), "artifact saved");
                report.artifacts.push(path);
            }
            Err(e) => {
                warn!(%stage, error = %e, "failed to save artifact, continuing");
                report.persist_failures.push(PersistFailure {
                    file: self.options.output_dir.join(filename),
                    message: e.to_string(),
                });
            }
        }
    }
}

/// Build summary records that keep the tagger's topics when the summarizer
/// left them out. Matching is by exact title.
fn carry_topics_forward(tagged: &[NewsItem], summaries: Vec<NewsItem>) -> Vec<NewsItem> {
    let by_title: HashMap<&str, &NewsItem> =
        tagged.iter().map(|item| (item.title.as_str(), item)).collect();

    summaries
        .into_iter()
        .map(|summary| {
            if !summary.topics.is_empty() {
                return summary;
            }
            match by_title.get(summary.title.as_str()) {
                Some(source) => NewsItem {
                    topics: source.topics.clone(),
                    ..summary
                },
                None => summary,
            }
        })
        .collect()
}
