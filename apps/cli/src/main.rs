//! UPSC news curator CLI.
//!
//! Fetches the day's news, tags it against the UPSC General Studies syllabus,
//! summarizes it, and links related stories, writing each stage's output to
//! the configured output directory.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // A missing .env is fine; the credential check reports what is absent.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
