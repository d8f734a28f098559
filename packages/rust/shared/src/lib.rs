//! Shared types, error model, and configuration for the UPSC news curator.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`UpscNewsError`], the unified error type
//! - Domain types ([`NewsItem`], [`PartialNewsItem`], [`Stage`], [`RunId`])
//! - Configuration ([`AppConfig`], [`Credentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Credentials, FetchConfig, LlmConfig, MAX_ARTICLES, OutputConfig, SearchConfig,
    SyllabusConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_config,
};
pub use error::{Result, UpscNewsError};
pub use types::{NewsItem, PartialNewsItem, RunId, Stage};
