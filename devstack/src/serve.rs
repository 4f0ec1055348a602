//! Orchestration for `devstack serve`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::env::ProcessEnv;
use crate::core::types::ProcessExit;
use crate::io::config::ServerConfig;
use crate::io::process::{Invocation, ProcessRunner};
use crate::io::status_text::{ServerContext, StatusText};
use crate::io::venv;

/// Outcome of `devstack serve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOutcome {
    /// Whether the virtual environment was applied to the server's environment.
    pub activated: bool,
    /// `None` when the interpreter could not be spawned.
    pub exit: Option<ProcessExit>,
}

/// Activate the venv, print diagnostics, then run the entry point in the foreground.
///
/// Failures to activate or to spawn are written to `err` and do not stop the
/// sequence; the server's own exit code is not inspected.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn launch_server<R: ProcessRunner, O: Write, E: Write>(
    runner: &R,
    config: &ServerConfig,
    text: &StatusText,
    root: &Path,
    base_env: &ProcessEnv,
    out: &mut O,
    err: &mut E,
) -> Result<ServeOutcome> {
    let activated = venv::locate(root, &config.venv_dir)
        .and_then(|activation| venv::activate(base_env, &activation));
    let (env, activated) = match activated {
        Ok(env) => (env, true),
        Err(e) => {
            writeln!(err, "{e:#}").context("write error")?;
            (base_env.clone(), false)
        }
    };
    debug!(activated, "environment prepared");

    let banner = text.server_banner(&ServerContext::new(config))?;
    writeln!(out, "{banner}").context("write status")?;
    writeln!(out, "Current directory: {}", root.display()).context("write status")?;
    writeln!(
        out,
        "{}: {}",
        config.env_var,
        env.get_lossy(&config.env_var)
    )
    .context("write status")?;
    writeln!(out).context("write status")?;
    out.flush().context("flush status")?;

    let invocation = Invocation::new(&config.python, config.command_args())
        .with_workdir(root)
        .with_env(env);
    info!(command = %invocation.command_line(), "starting server");
    let exit = match runner.run(&invocation) {
        Ok(exit) => {
            debug!(exit_code = ?exit.code, "server exited");
            Some(exit)
        }
        Err(e) => {
            writeln!(err, "{e:#}").context("write error")?;
            None
        }
    };

    Ok(ServeOutcome { activated, exit })
}
