//! workflow-checker -- validate published Galaxy workflows and report the
//! results as an xUnit test suite.
//!
//! The run deletes the user's stale workflow copies, imports every published
//! workflow, then exports each one as a round-trip validity check. Every
//! step becomes one test case in an [`report::XunitReport`].

pub mod checker;
pub mod config;
pub mod galaxy;
pub mod report;
pub mod runner;
pub mod timing;

use anyhow::{Context, Result};

use crate::checker::WorkflowChecker;
use crate::config::Config;
use crate::galaxy::GalaxyClient;
use crate::runner::CommandRunner;

/// Run a full check against the configured Galaxy server and return the
/// serialized xUnit report.
///
/// Only setup faults (bad URL, HTTP client construction) are returned as
/// errors; everything after that is recorded in the report.
pub async fn check(config: Config) -> Result<String> {
    let client = GalaxyClient::new(&config.galaxy_url, &config.api_key)
        .context("Failed to create Galaxy client")?;
    let runner = CommandRunner::new(config.work_dir.clone());

    let report = WorkflowChecker::new(client, runner, config).run().await;
    report.serialize().context("Failed to serialize xUnit report")
}
