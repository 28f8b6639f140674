//! External tool invocation
//!
//! Every capability backend that runs out of process (`say`, `ffmpeg`,
//! `mlx_whisper`, `mlx_audio`) goes through [`ToolRunner`]. Commands are
//! structured argv vectors, never shell strings.

use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

/// Longest stderr excerpt carried in an error
const STDERR_EXCERPT: usize = 512;

/// One tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<OsString>,
    pub stdin: Option<Vec<u8>>,
    pub envs: HashMap<String, String>,
    pub timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            envs: HashMap::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    /// Arguments as lossy strings, for logging and assertions
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// Captured output of a successful run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Tool invocation failures
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", .status.map_or_else(|| "signal".to_string(), |c| format!("status {}", c)))]
    Exited {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {}s", .timeout.as_secs_f64())]
    TimedOut { program: String, timeout: Duration },

    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs external tools
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, command: ToolCommand) -> Result<ToolOutput, ToolError>;
}

/// [`ToolRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct SystemToolRunner;

#[async_trait]
impl ToolRunner for SystemToolRunner {
    async fn run(&self, command: ToolCommand) -> Result<ToolOutput, ToolError> {
        let ToolCommand {
            program,
            args,
            stdin,
            envs,
            timeout,
        } = command;

        debug!(program = %program, args = ?args, "Running tool");

        let mut child = Command::new(&program)
            .args(&args)
            .envs(&envs)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: program.clone(),
                source,
            })?;

        let run = async {
            if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
                // A tool that exits early closes its end; the exit status reports why.
                if let Err(e) = pipe.write_all(&input).await {
                    warn!(program = %program, "Failed to write tool stdin: {}", e);
                }
                drop(pipe);
            }
            child.wait_with_output().await
        };

        // On timeout the future (and the child with it) is dropped, which kills the process.
        let output = match tokio::time::timeout(timeout, run).await {
            Ok(result) => result.map_err(|source| ToolError::Io {
                program: program.clone(),
                source,
            })?,
            Err(_) => return Err(ToolError::TimedOut { program, timeout }),
        };

        if output.status.success() {
            Ok(ToolOutput {
                stdout: output.stdout,
                stderr: output.stderr,
            })
        } else {
            Err(ToolError::Exited {
                program,
                status: output.status.code(),
                stderr: stderr_excerpt(&output.stderr),
            })
        }
    }
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    match text.char_indices().nth(STDERR_EXCERPT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Resolve a tool name to an executable path, searching `PATH` for bare names
pub fn locate_binary(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}
