//! Orchestration for `devstack opensearch`.
//!
//! Recreates the search container: `stop` and `rm` whatever is there (a missing
//! container is the normal first-run case, so their results are ignored), then
//! `run` a fresh one. Only the `run` result is inspected, and it selects one of
//! two blocks of status text. Nothing is retried and the service inside the
//! container is never polled.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::types::{ProcessExit, StartStatus};
use crate::io::config::ContainerConfig;
use crate::io::docker::ContainerRuntime;
use crate::io::process::ProcessRunner;
use crate::io::status_text::{ContainerContext, StatusText};

/// Outcome of `devstack opensearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOutcome {
    pub status: StartStatus,
    /// `None` when the start command could not be spawned.
    pub exit: Option<ProcessExit>,
}

/// Stop, remove, and start the configured container, printing status to `out`.
#[instrument(skip_all, fields(container = %config.name, runtime = %config.runtime))]
pub fn bootstrap_container<R: ProcessRunner, W: Write>(
    runner: &R,
    config: &ContainerConfig,
    text: &StatusText,
    out: &mut W,
) -> Result<BootstrapOutcome> {
    let spec = config.spec();
    let ctx = ContainerContext::new(config, &spec);
    let runtime =
        ContainerRuntime::new(runner, &config.runtime).with_timeout(config.command_timeout());

    writeln!(out, "{}", text.container_cleanup(&ctx)?).context("write status")?;
    ignore_cleanup_result("stop", runtime.stop(&spec));
    ignore_cleanup_result("rm", runtime.remove(&spec));

    writeln!(out, "{}", text.container_start(&ctx)?).context("write status")?;
    let exit = match runtime.run_detached(&spec) {
        Ok(exit) => Some(exit),
        Err(err) => {
            warn!(
                err = %format!("{err:#}"),
                runtime = runtime.program(),
                "container start did not run"
            );
            None
        }
    };

    let status = StartStatus::from_exit(exit);
    let message = match status {
        StartStatus::Started => text.container_success(&ctx)?,
        StartStatus::Failed => text.container_failure(&ctx)?,
    };
    writeln!(out, "{message}").context("write status")?;
    out.flush().context("flush status")?;

    info!(?status, exit_code = ?exit.and_then(|e| e.code), "container bootstrap finished");
    Ok(BootstrapOutcome { status, exit })
}

fn ignore_cleanup_result(step: &str, result: Result<ProcessExit>) {
    match result {
        Ok(exit) => debug!(
            step,
            exit_code = ?exit.code,
            timed_out = exit.timed_out,
            "cleanup step finished"
        ),
        Err(err) => debug!(step, err = %format!("{err:#}"), "cleanup step did not run"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::process::Invocation;
    use crate::test_support::{Scripted, ScriptedRunner};

    fn run(responses: Vec<Scripted>) -> (BootstrapOutcome, String, Vec<Invocation>) {
        let runner = ScriptedRunner::new(responses);
        let text = StatusText::new().expect("templates");
        let mut out = Vec::new();
        let outcome = bootstrap_container(&runner, &ContainerConfig::default(), &text, &mut out)
            .expect("bootstrap");
        (outcome, String::from_utf8(out).expect("utf8"), runner.calls())
    }

    #[test]
    fn zero_exit_prints_success_only() {
        let (outcome, out, _) = run(vec![
            Scripted::Exit(0),
            Scripted::Exit(0),
            Scripted::Exit(0),
        ]);
        assert_eq!(outcome.status, StartStatus::Started);
        assert!(out.contains("OpenSearch started successfully."));
        assert!(out.contains("http://localhost:9200/_cluster/health"));
        assert!(!out.contains("Failed to start OpenSearch."));
    }

    #[test]
    fn nonzero_exit_prints_failure_only() {
        let (outcome, out, _) = run(vec![
            Scripted::Exit(0),
            Scripted::Exit(0),
            Scripted::Exit(125),
        ]);
        assert_eq!(outcome.status, StartStatus::Failed);
        assert_eq!(outcome.exit, Some(ProcessExit::code(125)));
        assert!(out.contains("Failed to start OpenSearch."));
        assert!(!out.contains("OpenSearch started successfully."));
    }

    #[test]
    fn cleanup_failures_do_not_abort_start() {
        let (outcome, out, calls) = run(vec![
            Scripted::Exit(1),
            Scripted::SpawnError("no such container".to_string()),
            Scripted::Exit(0),
        ]);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].args[0], "run");
        assert_eq!(outcome.status, StartStatus::Started);
        assert!(out.contains("OpenSearch started successfully."));
    }

    #[test]
    fn start_spawn_error_takes_failure_branch() {
        let (outcome, out, _) = run(vec![
            Scripted::SpawnError("not found".to_string()),
            Scripted::SpawnError("not found".to_string()),
            Scripted::SpawnError("not found".to_string()),
        ]);
        assert_eq!(outcome.status, StartStatus::Failed);
        assert_eq!(outcome.exit, None);
        assert!(out.contains("Failed to start OpenSearch."));
    }

    #[test]
    fn start_timeout_takes_failure_branch() {
        let (outcome, out, _) = run(vec![
            Scripted::Exit(0),
            Scripted::Exit(0),
            Scripted::TimedOut,
        ]);
        assert_eq!(outcome.status, StartStatus::Failed);
        assert!(out.contains("Failed to start OpenSearch."));
    }

    #[test]
    fn start_uses_fixed_ports_and_env() {
        let (_, _, calls) = run(vec![
            Scripted::Exit(1),
            Scripted::Exit(1),
            Scripted::Exit(0),
        ]);
        let lines: Vec<String> = calls.iter().map(Invocation::command_line).collect();
        assert_eq!(lines[0], "docker stop opensearch");
        assert_eq!(lines[1], "docker rm opensearch");
        assert_eq!(
            calls[2].args,
            vec![
                "run",
                "-d",
                "--name",
                "opensearch",
                "-p",
                "9200:9200",
                "-p",
                "9600:9600",
                "-e",
                "discovery.type=single-node",
                "-e",
                "OPENSEARCH_JAVA_OPTS=-Xms512m -Xmx512m",
                "opensearchproject/opensearch:latest",
            ]
        );
    }

    #[test]
    fn status_lines_bracket_the_commands() {
        let (_, out, _) = run(vec![
            Scripted::Exit(0),
            Scripted::Exit(0),
            Scripted::Exit(0),
        ]);
        let cleanup = out
            .find("Stopping and removing existing 'opensearch'")
            .expect("cleanup line");
        let start = out
            .find("Starting opensearchproject/opensearch:latest as 'opensearch' (ports 9200, 9600)")
            .expect("start line");
        let success = out.find("started successfully").expect("success");
        assert!(cleanup < start && start < success);
    }
}
