//! normstore: fold JSON:API documents into a normalized entity store
//!
//! Usage:
//!   normstore page1.json page2.json
//!   normstore --config schema.json --commands edits.json articles.json
//!   normstore articles.json --get article:1 --include author,comments
//!
//! Prints the resulting store (or the selected entities) as JSON on stdout.
//! Logs go to stderr.

use anyhow::Result;
use clap::Parser;
use normstore_cli::{Args, run};
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(log_level).into())
    });
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let output = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
