//! Inlining through an external program.
//!
//! The program receives the style sheet on stdin and writes the inlined
//! result to stdout. Any argument equal to `{from}` is replaced with the
//! module identifier, and the process runs in the identifier's parent
//! directory so relative includes resolve naturally.
//!
//! ```rust,no_run
//! use css_export::inline::{CommandInliner, ImportInliner};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let inliner = CommandInliner::new("postcss").args(["--use", "postcss-import", "--from", "{from}"]);
//! let result = inliner.inline("@import './reset.css';", "/project/src/red.css").await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::{ImportInliner, InlineError, Inlined};

/// Placeholder replaced with the module identifier in program arguments.
pub const FROM_PLACEHOLDER: &str = "{from}";

/// Runs an external program as the inlining engine.
#[derive(Debug, Clone)]
pub struct CommandInliner {
    program: String,
    args: Vec<String>,
    timeout_duration: Option<Duration>,
}

impl CommandInliner {
    /// Creates an inliner running `program` with no arguments and a 60 second
    /// timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout_duration: Some(Duration::from_secs(60)),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets or clears the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    fn resolved_args(&self, from: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| if a == FROM_PLACEHOLDER { from.to_string() } else { a.clone() })
            .collect()
    }

    fn working_dir(from: &str) -> Option<PathBuf> {
        Path::new(from).parent().filter(|p| p.is_dir()).map(Path::to_path_buf)
    }

    async fn run(&self, source: &str, from: &str) -> Result<std::process::Output, InlineError> {
        let args = self.resolved_args(from);
        tracing::debug!(target: "inline", "Executing command: {} {}", self.program, args.join(" "));

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = Self::working_dir(from) {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| InlineError::Spawn {
            program: self.program.clone(),
            reason: e.to_string(),
        })?;

        // stdin is fed while stdout is drained, otherwise a large sheet can
        // fill both pipes and stall the engine.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(source.as_bytes()).await {
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                        tracing::debug!(target: "inline", "Failed to write to engine stdin: {}", e);
                    }
                    _ => {}
                }
            }
        };
        let output_future = async move {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        let output = match self.timeout_duration {
            Some(duration) => match timeout(duration, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "inline",
                        "Command timed out after {} seconds: {}",
                        duration.as_secs(),
                        self.program
                    );
                    return Err(InlineError::Timeout {
                        seconds: duration.as_secs(),
                    });
                }
            },
            None => output_future.await,
        };

        output.map_err(|e| InlineError::Engine {
            message: format!("Failed to wait for inlining engine: {e}"),
        })
    }
}

#[async_trait]
impl ImportInliner for CommandInliner {
    async fn inline(&self, source: &str, from: &str) -> Result<Inlined, InlineError> {
        let output = self.run(source, from).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(target: "inline", "Command failed with exit code: {:?}", output.status.code());
            return Err(InlineError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let css = String::from_utf8(output.stdout).map_err(|e| InlineError::Engine {
            message: format!("Inlining engine produced invalid UTF-8: {e}"),
        })?;

        if css == source {
            Ok(Inlined::Unchanged)
        } else {
            Ok(Inlined::Transformed(css))
        }
    }
}
