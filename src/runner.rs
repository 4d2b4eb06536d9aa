//! External command runner with marker-file caching.
//!
//! A step whose cache marker already exists is recorded as skipped and never
//! executed. Otherwise the command runs to completion (no timeout) and its
//! exit status decides between ok and failure. Every step ends up as exactly
//! one test case; nothing here is fatal to the run.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::report::XunitReport;
use crate::timing::Stopwatch;

/// One external command to run and record.
#[derive(Debug, Clone)]
pub struct CommandStep {
    pub classname: String,
    pub name: String,
    pub failure_message: String,
    pub cache_marker: PathBuf,
    pub argv: Vec<String>,
    pub shell: bool,
    pub cwd: Option<PathBuf>,
    pub cache: bool,
}

impl CommandStep {
    pub fn new<I, S>(
        classname: &str,
        name: &str,
        failure_message: &str,
        cache_marker: impl Into<PathBuf>,
        argv: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classname: classname.to_string(),
            name: name.to_string(),
            failure_message: failure_message.to_string(),
            cache_marker: cache_marker.into(),
            argv: argv.into_iter().map(Into::into).collect(),
            shell: false,
            cwd: None,
            cache: true,
        }
    }

    /// Join argv with spaces and hand it to the platform shell.
    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// The command line as it is logged and reported.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

/// What happened to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cache marker existed; the command was not run.
    Cached,
    Passed,
    Failed,
}

/// Runs [`CommandStep`]s relative to a fixed working directory.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    work_dir: PathBuf,
}

impl CommandRunner {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    /// Run `step` (or skip it on a cache hit) and record exactly one test case.
    pub async fn timed_command(&self, report: &mut XunitReport, step: &CommandStep) -> StepOutcome {
        let marker = self.resolve(&step.cache_marker);
        if step.cache && marker.exists() {
            debug!(marker = %marker.display(), name = %step.name, "cache marker present, skipping");
            report.skip(&step.classname, &step.name, std::time::Duration::ZERO);
            return StepOutcome::Cached;
        }

        let cwd = step
            .cwd
            .as_deref()
            .map(|dir| self.resolve(dir))
            .unwrap_or_else(|| self.work_dir.clone());

        let watch = Stopwatch::start();
        let result = execute(step, &cwd).await;
        let interval = watch.stop();

        match result {
            Ok(()) => {
                report.ok(&step.classname, &step.name, interval);
                StepOutcome::Passed
            }
            Err(details) => {
                warn!(name = %step.name, "command failed");
                report.failure(
                    &step.classname,
                    &step.name,
                    &step.failure_message,
                    &details,
                    interval,
                );
                StepOutcome::Failed
            }
        }
    }
}

/// Run the step to completion. `Err` carries a human-readable failure detail.
async fn execute(step: &CommandStep, cwd: &Path) -> Result<(), String> {
    let command_line = step.command_line();
    info!(command = %command_line, cwd = %cwd.display(), "running command");

    let mut cmd = if step.shell {
        shell_command(&command_line)
    } else {
        let (program, args) = step
            .argv
            .split_first()
            .ok_or_else(|| "no command given".to_string())?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    };

    let output = cmd
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| format!("failed to run `{}` in {}: {}", command_line, cwd.display(), e))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(failure_details(&command_line, output.status, stderr.trim()))
    }
}

fn failure_details(command_line: &str, status: ExitStatus, stderr: &str) -> String {
    let mut details = format!("Command '{}' returned non-zero exit status: {}", command_line, status);
    if !stderr.is_empty() {
        details.push('\n');
        details.push_str(stderr);
    }
    details
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}
