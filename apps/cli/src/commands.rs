//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use upscnews_agents::{AgentRole, LlmAgents};
use upscnews_core::{Coordinator, CoordinatorOptions, PipelineProgress, RunReport};
use upscnews_records::parse_news;
use upscnews_search::{NO_RESULTS, SMOKE_TEST_QUERY, SearchClient, SerperNewsSource};
use upscnews_shared::{
    AppConfig, Credentials, NewsItem, Stage, UpscNewsError, init_config, load_config,
    load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// upscnews: daily UPSC-relevant news, tagged, summarized and linked.
#[derive(Parser)]
#[command(
    name = "upscnews",
    version,
    about = "Curate daily news for the UPSC Civil Services Examination with LLM agents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.upscnews/upscnews.toml).
    #[arg(long, env = "UPSCNEWS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory for stage artifacts (overrides output.dir).
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `check`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Verify credentials, agents and search, then offer to run the pipeline.
    Check,

    /// Run the same checks, then the full pipeline.
    Run {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Parse a block-formatted news file offline and print the records.
    Parse {
        /// Text file in search-result block format.
        file: PathBuf,

        /// Print records as pretty JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "upscnews=info",
        1 => "upscnews=debug",
        _ => "upscnews=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        None | Some(Command::Check) => cmd_check(&resolve_config(&cli)?, false).await,
        Some(Command::Run { yes }) => cmd_check(&resolve_config(&cli)?, *yes).await,
        Some(Command::Parse { file, json }) => cmd_parse(file, *json),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&resolve_config(&cli)?),
        },
    }
}

/// Load the config file and apply flag overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// check / run
// ---------------------------------------------------------------------------

async fn cmd_check(config: &AppConfig, skip_prompt: bool) -> Result<()> {
    println!("Starting UPSC news curator checks");
    println!("{}", "=".repeat(50));

    // --- Credentials ---
    let credentials = match Credentials::from_env(config) {
        Ok(credentials) => credentials,
        Err(e @ UpscNewsError::MissingCredentials { .. }) => {
            println!("  ✗ {e}");
            println!("  Please set these in your .env file");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    // --- Agent initialization ---
    let agents = LlmAgents::new(config, &credentials)?;
    for role in AgentRole::ALL {
        println!("Checking {role} initialization...");
        if let Err(e) = agents.check_role(role) {
            println!("  ✗ {role} initialization failed: {e}");
            return Err(e.into());
        }
        println!("  ✓ {role} initialized");
    }

    // --- Search smoke test ---
    let search = SearchClient::new(&config.search, credentials.search_api_key.clone())?;
    println!("\nChecking search API with '{SMOKE_TEST_QUERY}'...");
    match search.search_text(SMOKE_TEST_QUERY).await {
        Ok(text) if text != NO_RESULTS => {
            let snippet: String = text.chars().take(200).collect();
            println!("  ✓ search returned results. Snippet: {snippet}...");
        }
        Ok(_) => {
            warn!("search smoke test returned no results");
            println!("  ⚠ search returned no results. News fetching might not work correctly.");
        }
        Err(e) => {
            warn!(error = %e, "search smoke test failed");
            println!("  ⚠ search test failed ({e}). News fetching might not work correctly.");
        }
    }

    // --- Confirmation ---
    if !skip_prompt {
        print!(
            "\nRun the full news pipeline (fetch, tag, summarize, link)? This will make API calls. (y/n): "
        );
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        if !confirmed(&answer) {
            println!("All checks completed without running the pipeline.");
            return Ok(());
        }
    }

    let source = SerperNewsSource::new(search, &config.fetch);
    run_pipeline(config, &source, &agents).await
}

/// Only an explicit `y` starts the pipeline.
fn confirmed(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

async fn run_pipeline(
    config: &AppConfig,
    source: &SerperNewsSource,
    agents: &LlmAgents,
) -> Result<()> {
    info!(output_dir = %config.output.dir.display(), "running curation pipeline");

    let progress = CliProgress::new();
    let coordinator = Coordinator::new(source, agents, CoordinatorOptions::from_config(config));
    let report = coordinator
        .run(&progress)
        .await
        .map_err(|e| eyre!("pipeline aborted: {e}"))?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("  Pipeline finished!");
    println!("  Run:        {}", report.run_id);
    println!("  Started:    {}", report.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Fetched:    {}", report.fetched);
    println!("  Tagged:     {}", report.tagged);
    println!("  Summarized: {}", report.summarized);
    if report.rejected > 0 {
        println!("  Rejected:   {} (no title)", report.rejected);
    }
    for path in &report.artifacts {
        println!("  Saved:      {}", path.display());
    }
    for failure in &report.persist_failures {
        println!("  Not saved:  {} ({})", failure.file.display(), failure.message);
    }
    println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());
    println!();
    print!("{}", summaries_section(&report.summaries));
    println!("--- Identified Links and Patterns ---");
    println!("{}", report.links);
}

fn summaries_section(items: &[NewsItem]) -> String {
    let mut out = String::from("--- Generated Summaries ---\n");
    for (idx, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, item.title));
        if !item.topics.is_empty() {
            out.push_str(&format!("   Topics: {}\n", item.topics.join(", ")));
        }
        out.push_str(&format!(
            "   {}\n\n",
            item.summary.as_deref().unwrap_or("(no summary)")
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

fn cmd_parse(file: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(file).map_err(|e| UpscNewsError::io(file, e))?;
    let parsed = parse_news(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed.items)?);
    } else {
        for (idx, item) in parsed.items.iter().enumerate() {
            print_item(idx + 1, item);
        }
        println!("{} record(s), {} rejected", parsed.items.len(), parsed.rejected);
    }
    Ok(())
}

fn print_item(number: usize, item: &NewsItem) {
    println!("{number}. {}", item.title);
    let fields = [
        ("Source", &item.source),
        ("Date", &item.published_date),
        ("Description", &item.description),
        ("URL", &item.url),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("   {label}: {value}");
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Fetching => "Fetching news",
        Stage::Tagging => "Tagging articles with UPSC topics",
        Stage::Summarizing => "Summarizing articles",
        Stage::Linking => "Linking related stories",
    }
}

impl PipelineProgress for CliProgress {
    fn stage_started(&self, stage: Stage) {
        self.spinner.set_message(stage_message(stage));
    }

    fn stage_finished(&self, stage: Stage, records: usize) {
        self.spinner
            .println(format!("  ✓ {} ({records} articles)", stage_message(stage)));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // Clears the spinner when a stage aborts the run.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_y_confirms() {
        assert!(confirmed("y\n"));
        assert!(confirmed("  Y  "));
        assert!(!confirmed("yes"));
        assert!(!confirmed(""));
        assert!(!confirmed("n"));
    }

    #[test]
    fn summaries_section_lists_titles_topics_and_text() {
        let mut rains = NewsItem::new("Heavy rains in Mumbai".to_string());
        rains.topics = vec!["Geography".into(), "Disaster Management".into()];
        rains.summary = Some("Monsoon floods hit Mumbai.".into());
        let budget = NewsItem::new("Budget session begins".to_string());

        let section = summaries_section(&[rains, budget]);
        assert_eq!(
            section,
            "--- Generated Summaries ---\n\
             1. Heavy rains in Mumbai\n   Topics: Geography, Disaster Management\n   \
             Monsoon floods hit Mumbai.\n\n\
             2. Budget session begins\n   (no summary)\n\n"
        );
    }

    #[test]
    fn no_subcommand_means_check() {
        let cli = Cli::try_parse_from(["upscnews"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "upscnews",
            "run",
            "--yes",
            "--output-dir",
            "/tmp/out",
            "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Run { yes: true })));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn parse_subcommand_takes_file_and_json_flag() {
        let cli = Cli::try_parse_from(["upscnews", "parse", "news.txt", "--json"]).unwrap();
        match cli.command {
            Some(Command::Parse { file, json }) => {
                assert_eq!(file, PathBuf::from("news.txt"));
                assert!(json);
            }
            _ => panic!("expected parse command"),
        }
    }
}
