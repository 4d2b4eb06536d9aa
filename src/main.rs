use anyhow::{Context, Result};
use clap::Parser;

use workflow_checker::config::Config;

#[derive(Parser)]
#[command(
    name = "workflow-checker",
    about = "Import, round-trip and report on published Galaxy workflows",
    version,
    long_about = None
)]
struct Cli {
    /// Galaxy server URL
    galaxy_url: String,

    /// Galaxy username whose workflows are replaced and checked
    username: String,

    /// Galaxy API key
    api_key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the report, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.galaxy_url, cli.username, cli.api_key)
        .with_env()
        .context("Invalid configuration")?;

    tracing::info!(work_dir = %config.work_dir.display(), suite = %config.suite_name, "Running workflow checker");
    let xml = workflow_checker::check(config).await?;
    println!("{}", xml);

    Ok(())
}
