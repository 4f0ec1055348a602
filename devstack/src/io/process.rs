//! Blocking child process execution.
//!
//! The [`ProcessRunner`] trait decouples orchestration from real process
//! spawning. Tests use scripted runners that record invocations and return
//! predetermined exits without spawning anything.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::env::ProcessEnv;
use crate::core::types::ProcessExit;

/// One external command to run in the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; `None` inherits ours.
    pub workdir: Option<PathBuf>,
    /// Full child environment; `None` inherits ours.
    pub env: Option<ProcessEnv>,
    /// Kill the child after this long; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: None,
            env: None,
            timeout: None,
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    pub fn with_env(mut self, env: ProcessEnv) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Human-readable command line (no quoting), for logs and errors.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Abstraction over spawning a command and waiting for it.
pub trait ProcessRunner {
    /// Run to completion. `Err` means the command could not be spawned or waited on.
    fn run(&self, invocation: &Invocation) -> Result<ProcessExit>;
}

/// Runner that spawns real processes with inherited stdio.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    #[instrument(skip_all, fields(program = %invocation.program, timeout_secs = invocation.timeout.map(|t| t.as_secs())))]
    fn run(&self, invocation: &Invocation) -> Result<ProcessExit> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(workdir) = &invocation.workdir {
            cmd.current_dir(workdir);
        }
        if let Some(env) = &invocation.env {
            cmd.env_clear().envs(env.iter());
        }

        debug!(command = %invocation.command_line(), "spawning child process");
        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                error!(err = %e, "failed to spawn command");
                return Err(e).with_context(|| format!("spawn {}", invocation.program));
            }
        };

        let mut timed_out = false;
        let status = match invocation.timeout {
            None => child.wait().context("wait for command")?,
            Some(timeout) => match child.wait_timeout(timeout).context("wait for command")? {
                Some(status) => status,
                None => {
                    warn!(
                        timeout_secs = timeout.as_secs(),
                        "command timed out, killing"
                    );
                    timed_out = true;
                    child.kill().context("kill command")?;
                    child.wait().context("wait command after kill")?
                }
            },
        };

        debug!(exit_code = ?status.code(), timed_out, "command finished");
        Ok(ProcessExit {
            code: status.code(),
            timed_out,
        })
    }
}
