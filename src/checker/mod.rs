//! Workflow validation run: fetch → clean → import → check.
//!
//! Each stage loops over its items and finishes before the next starts.
//! Every service call is wrapped where it is made and becomes exactly one
//! test case; no per-item fault stops the run.

pub mod naming;

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::galaxy::{classify_export_fault, ExportFault, GalaxyError, WorkflowService};
use crate::report::XunitReport;
use crate::runner::{CommandRunner, CommandStep};
use crate::timing::measure;

/// Classname used for every test case the checker records.
pub const CLASSNAME: &str = "galaxy";

pub struct WorkflowChecker<S> {
    service: S,
    runner: CommandRunner,
    config: Config,
    report: XunitReport,
}

impl<S: WorkflowService> WorkflowChecker<S> {
    pub fn new(service: S, runner: CommandRunner, config: Config) -> Self {
        let report = XunitReport::new(config.suite_name.clone());
        Self {
            service,
            runner,
            config,
            report,
        }
    }

    pub fn report(&self) -> &XunitReport {
        &self.report
    }

    /// Run all four stages in order and hand back the finished report.
    pub async fn run(mut self) -> XunitReport {
        info!(galaxy = %self.config.galaxy_url, user = %self.config.username, "starting workflow check");

        let ids = self.fetch_published_ids().await;
        self.clean_workflows().await;
        self.import_workflows(&ids).await;
        self.check_workflows().await;

        info!(
            total = self.report.total(),
            failures = self.report.failures(),
            errors = self.report.errors(),
            skipped = self.report.skipped(),
            "workflow check complete"
        );
        self.report
    }

    /// The shell pipeline that scrapes published workflow ids into the ids file.
    ///
    /// The URL and ids path are shell-quoted; both come from user input.
    pub fn fetch_step(&self) -> CommandStep {
        let ids_file = self.config.ids_file.display().to_string();
        let url = self.config.published_list_url();
        CommandStep::new(
            CLASSNAME,
            "fetch_ids",
            "Download failed",
            self.config.ids_file.clone(),
            [
                "curl".to_string(),
                "-s".to_string(),
                shell_words::quote(&url).into_owned(),
                "|".to_string(),
                "grep".to_string(),
                "-Eo".to_string(),
                r#"'encode_id": "[a-f0-9]+'"#.to_string(),
                "|".to_string(),
                "sed".to_string(),
                r#"'s/encode_id": "//g'"#.to_string(),
                ">".to_string(),
                shell_words::quote(&ids_file).into_owned(),
            ],
        )
        .shell(true)
        .cache(self.config.cache_published_ids)
    }

    /// Stage 1: download (or reuse) the ids file and parse it.
    pub async fn fetch_published_ids(&mut self) -> Vec<String> {
        let step = self.fetch_step();
        self.runner.timed_command(&mut self.report, &step).await;

        let path: PathBuf = self.runner.resolve(&self.config.ids_file);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let ids = parse_ids(&text);
                info!(count = ids.len(), "published workflow ids loaded");
                ids
            }
            Err(e) => {
                warn!(path = %path.display(), "could not read published workflow ids: {}", e);
                self.report.error(
                    CLASSNAME,
                    "read_ids",
                    "Could not read published workflow ids",
                    &format!("{}: {}", path.display(), e),
                    Duration::ZERO,
                );
                Vec::new()
            }
        }
    }

    /// Stage 2: delete every workflow the configured user owns.
    ///
    /// The closing `delete_old_workflows` case marks that the sweep ran and
    /// is recorded even when individual deletions failed.
    pub async fn clean_workflows(&mut self) {
        match self.service.owned_workflows(&self.config.username).await {
            Ok(workflows) => {
                info!(count = workflows.len(), "removing previous workflows");
                for wf in workflows {
                    let name = format!("delete_old_workflows.{}", wf.id);
                    let timed = measure(self.service.delete_workflow(&wf.id)).await;
                    match timed.value {
                        Ok(()) => self.report.ok(CLASSNAME, &name, timed.interval),
                        Err(e) => {
                            warn!(id = %wf.id, "failed to delete workflow: {}", e);
                            self.report.failure(
                                CLASSNAME,
                                &name,
                                "Failed to remove previous workflow",
                                &format!("{}\n{}", e, wf.id),
                                timed.interval,
                            );
                        }
                    }
                }
            }
            Err(e) => self.record_list_error(e),
        }
        self.report.ok(CLASSNAME, "delete_old_workflows", Duration::ZERO);
    }

    /// Stage 3: import each published workflow by id.
    pub async fn import_workflows(&mut self, ids: &[String]) {
        info!(count = ids.len(), "importing published workflows");
        for id in ids {
            let name = format!("import_workflow.{}", id);
            let timed = measure(self.service.import_shared_workflow(id)).await;
            match timed.value {
                Ok(()) => self.report.ok(CLASSNAME, &name, timed.interval),
                Err(e) => {
                    warn!(%id, "failed to import workflow: {}", e);
                    self.report.failure(
                        CLASSNAME,
                        &name,
                        &format!("Failed to import workflow {}", id),
                        &e.to_string(),
                        timed.interval,
                    );
                }
            }
        }
        self.report.ok(CLASSNAME, "import_workflow", Duration::ZERO);
    }

    /// Stage 4: export every owned workflow as a validity check.
    pub async fn check_workflows(&mut self) {
        let workflows = match self.service.owned_workflows(&self.config.username).await {
            Ok(workflows) => workflows,
            Err(e) => {
                self.record_list_error(e);
                return;
            }
        };

        info!(count = workflows.len(), "checking workflow validity");
        for wf in workflows {
            let display = naming::display_name(&wf.name);
            let name = naming::validity_test_name(&wf.name);
            let timed = measure(self.service.export_workflow(&wf.id)).await;
            match timed.value {
                Ok(_) => self.report.ok(CLASSNAME, &name, timed.interval),
                Err(e) => {
                    let message = export_failure_message(&e, display);
                    warn!(id = %wf.id, "{}", message);
                    self.report
                        .failure(CLASSNAME, &name, &message, &e.to_string(), timed.interval);
                }
            }
        }
    }

    fn record_list_error(&mut self, e: GalaxyError) {
        warn!("failed to list workflows: {}", e);
        self.report.error(
            CLASSNAME,
            "list_workflows",
            "Failed to list workflows",
            &e.to_string(),
            Duration::ZERO,
        );
    }
}

/// One id per line, trimmed; blank lines are dropped.
pub fn parse_ids(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Failure message for a workflow whose export failed.
pub fn export_failure_message(err: &GalaxyError, display_name: &str) -> String {
    match classify_export_fault(err) {
        ExportFault::MissingTools => format!("Missing Tools in {}", display_name),
        ExportFault::Other => format!("Other Error in {}", display_name),
    }
}
