//! Subprocess execution for the external git binary.
//!
//! Everything this tool does to a repository goes through the git CLI, so the
//! whole I/O surface is one operation: run a command in a working directory
//! and capture what it printed. The [`CommandRunner`] trait keeps that seam
//! narrow enough that the synchronizer can be tested with a scripted fake
//! instead of a real git process.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Errors returned by command execution.
///
/// A command that never ran and a command that ran and exited nonzero are
/// different failures: callers that use a command's exit status as an
/// existence probe must not treat a spawn error the same way.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The process could not be launched at all.
    #[error("failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
    /// The process ran and exited nonzero. The combined output is preserved
    /// so the caller can surface git's human-readable message.
    #[error("{command} exited with {status}: {output}")]
    Failed {
        command: String,
        status: ExitStatus,
        output: String,
    },
}

/// Runs a named command with arguments in a working directory, returning the
/// captured combined output or a structured failure.
pub trait CommandRunner {
    /// Execute `command args...`. With `cwd == None` the command runs in the
    /// caller's current directory. One synchronous invocation per call; no
    /// retry, no timeout.
    fn run(&self, cwd: Option<&Path>, command: &str, args: &[&str]) -> Result<String, CommandError>;
}

/// The real runner: spawns one external process per call.
///
/// stdin is null so a git invocation that wants credentials fails instead of
/// hanging on a prompt. The environment is inherited untouched.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cwd: Option<&Path>, command: &str, args: &[&str]) -> Result<String, CommandError> {
        let mut cmd = Command::new(command);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| CommandError::Launch {
            command: command.to_string(),
            source,
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: command.to_string(),
                status: output.status,
                output: combined,
            });
        }

        Ok(combined)
    }
}
