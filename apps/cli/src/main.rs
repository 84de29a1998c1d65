//! postcraft CLI: content analysis and feedback-driven blog templates.
//!
//! Analyzes extracted source text for a downstream generator and manages a
//! local store of versioned templates that evolve through confirmed feedback.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
