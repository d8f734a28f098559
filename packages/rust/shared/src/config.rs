//! Application configuration for the curator.
//!
//! User config lives at `~/.upscnews/upscnews.toml`.
//! CLI flags override config file values, which override defaults.
//! Credentials are never stored in the file; only the names of the
//! environment variables holding them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpscNewsError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "upscnews.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".upscnews";

/// Most articles one run can carry; block markers are numbered 1 to 10.
pub const MAX_ARTICLES: usize = 10;

// ---------------------------------------------------------------------------
// Config structs (matching upscnews.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// News search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// What the fetching stage searches for.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Where artifacts are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Syllabus topics offered to the tagging agent.
    #[serde(default)]
    pub syllabus: SyllabusConfig,
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; kept low for factual output.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Base URL of the Messages API (without the `/messages` suffix).
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_llm_key_env(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: default_llm_base_url(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}
fn default_model() -> String {
    "claude-3-5-sonnet-20240620".into()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_llm_base_url() -> String {
    "https://api.anthropic.com/v1".into()
}
fn default_llm_timeout() -> u64 {
    120
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// News search endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Country code (`gl`).
    #[serde(default = "default_country")]
    pub country: String,

    /// Language code (`hl`).
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            endpoint: default_search_endpoint(),
            country: default_country(),
            language: default_language(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_key_env() -> String {
    "SERPER_API_KEY".into()
}
fn default_search_endpoint() -> String {
    "https://google.serper.dev/news".into()
}
fn default_country() -> String {
    "in".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_search_timeout() -> u64 {
    30
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Queries run against the search provider, in order.
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,

    /// Upper bound on articles handed to the tagging stage.
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,

    /// Let the fetcher agent pick the most exam-relevant hits.
    #[serde(default = "default_true")]
    pub curate_with_llm: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            queries: default_queries(),
            max_articles: default_max_articles(),
            curate_with_llm: true,
        }
    }
}

fn default_queries() -> Vec<String> {
    vec![
        "India government policy news".into(),
        "Indian economy RBI budget news".into(),
        "India international relations news".into(),
        "India environment climate change news".into(),
        "India science technology space news".into(),
    ]
}
fn default_max_articles() -> usize {
    10
}
fn default_true() -> bool {
    true
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the stage artifacts (created on demand).
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// `[syllabus]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyllabusConfig {
    /// General Studies topics the tagger may assign.
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,

    /// Preferred publications, named in the fetcher agent's task prompt.
    #[serde(default = "default_news_sources")]
    pub news_sources: Vec<String>,
}

impl Default for SyllabusConfig {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            news_sources: default_news_sources(),
        }
    }
}

fn default_topics() -> Vec<String> {
    [
        "Indian Economy (Growth, Development, Employment, Inclusive Growth, Government Budgeting, Major Crops, Food Processing, Land Reforms, Liberalization, Infrastructure, Investment Models)",
        "Indian Polity & Governance (Constitution, Political System, Panchayati Raj, Public Policy, Rights Issues, Regulatory Bodies, Welfare Schemes)",
        "International Relations (India and its neighborhood, Bilateral/Regional/Global groupings, International Institutions, Important International events)",
        "Science & Technology (Developments and their applications & effects in everyday life, IT, Space, Computers, Robotics, Nanotechnology, Biotechnology, Intellectual Property Rights)",
        "Environment & Ecology (Biodiversity, Climate Change, Environmental Impact Assessment, Conservation, Pollution)",
        "Geography (Physical Geography, Indian Geography, World Geography, Human Geography, Resources)",
        "History & Culture (Ancient, Medieval, Modern Indian History, Art & Culture, Post-independence consolidation)",
        "Social Issues & Justice (Poverty, Hunger, Health, Education, Human Development, Vulnerable Sections, Role of NGOs)",
        "Internal Security & Disaster Management (Linkages between development and spread of extremism, Role of external state/non-state actors, Cyber security, Border areas, Organized crime, Disaster Management)",
        "Ethics, Integrity, and Aptitude (Not directly news-based, but current events can provide case studies)",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_news_sources() -> Vec<String> {
    [
        "The Hindu",
        "The Indian Express",
        "Press Information Bureau (PIB)",
        "Business Standard",
        "The Economic Times",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API keys resolved once at process start.
#[derive(Clone)]
pub struct Credentials {
    pub llm_api_key: String,
    pub search_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &"<redacted>")
            .field("search_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both keys from the process environment.
    pub fn from_env(config: &AppConfig) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve both keys through `lookup`, reporting every missing variable
    /// at once. Empty values count as missing.
    pub fn resolve_with<F>(config: &AppConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let llm = fetch(&config.llm.api_key_env);
        let search = fetch(&config.search.api_key_env);

        match (llm, search) {
            (Some(llm_api_key), Some(search_api_key)) => Ok(Self {
                llm_api_key,
                search_api_key,
            }),
            (llm, search) => {
                let mut vars = Vec::new();
                if llm.is_none() {
                    vars.push(config.llm.api_key_env.clone());
                }
                if search.is_none() {
                    vars.push(config.search.api_key_env.clone());
                }
                Err(UpscNewsError::MissingCredentials { vars })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.upscnews/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| UpscNewsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.upscnews/upscnews.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| UpscNewsError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        UpscNewsError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| UpscNewsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| UpscNewsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| UpscNewsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configurations the pipeline cannot run with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.llm.model.trim().is_empty() {
        return Err(UpscNewsError::config("llm.model must not be empty"));
    }
    if !(0.0..=1.0).contains(&config.llm.temperature) {
        return Err(UpscNewsError::config(format!(
            "llm.temperature must be within 0.0..=1.0, got {}",
            config.llm.temperature
        )));
    }
    if config.fetch.queries.iter().all(|q| q.trim().is_empty()) {
        return Err(UpscNewsError::config("fetch.queries needs at least one query"));
    }
    if !(1..=MAX_ARTICLES).contains(&config.fetch.max_articles) {
        return Err(UpscNewsError::config(format!(
            "fetch.max_articles must be within 1..={MAX_ARTICLES}, got {}",
            config.fetch.max_articles
        )));
    }
    url::Url::parse(&config.search.endpoint).map_err(|e| {
        UpscNewsError::config(format!("search.endpoint is not a URL: {e}"))
    })?;
    url::Url::parse(&config.llm.base_url)
        .map_err(|e| UpscNewsError::config(format!("llm.base_url is not a URL: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("ANTHROPIC_API_KEY"));
        assert!(toml_str.contains("SERPER_API_KEY"));
        assert!(toml_str.contains("google.serper.dev"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.search.country, "in");
        assert_eq!(parsed.fetch.max_articles, 10);
        assert_eq!(parsed.syllabus.topics.len(), 10);
        assert_eq!(parsed.output.dir, PathBuf::from("output"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
[llm]
model = "claude-3-haiku-20240307"

[output]
dir = "/tmp/upsc"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.llm.model, "claude-3-haiku-20240307");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.output.dir, PathBuf::from("/tmp/upsc"));
        assert!(config.fetch.curate_with_llm);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.llm.temperature = 1.5;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.fetch.queries = vec!["  ".into()];
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.search.endpoint = "not a url".into();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.fetch.max_articles = 11;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn credentials_report_all_missing_vars() {
        let config = AppConfig::default();
        let err = Credentials::resolve_with(&config, |_| None).unwrap_err();
        match err {
            UpscNewsError::MissingCredentials { vars } => {
                assert_eq!(vars, vec!["ANTHROPIC_API_KEY", "SERPER_API_KEY"]);
            }
            other => panic!("expected MissingCredentials, got {other:?}"),
        }
    }

    #[test]
    fn credentials_treat_blank_as_missing() {
        let config = AppConfig::default();
        let err = Credentials::resolve_with(&config, |name| match name {
            "ANTHROPIC_API_KEY" => Some("sk-test".into()),
            _ => Some("   ".into()),
        })
        .unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY"));
        assert!(!err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn credentials_resolve_and_redact() {
        let config = AppConfig::default();
        let creds = Credentials::resolve_with(&config, |name| Some(format!("{name}-value")))
            .expect("both present");
        assert_eq!(creds.llm_api_key, "ANTHROPIC_API_KEY-value");
        assert_eq!(creds.search_api_key, "SERPER_API_KEY-value");
        assert!(!format!("{creds:?}").contains("value"));
    }
}
