//! Container runtime adapter.
//!
//! The bootstrapper only ever talks to the runtime through its CLI, so this is
//! a small, explicit wrapper around `docker` subprocess calls.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::core::container::ContainerSpec;
use crate::core::types::ProcessExit;
use crate::io::process::{Invocation, ProcessRunner};

/// Wrapper for executing container runtime commands.
pub struct ContainerRuntime<'a, R: ProcessRunner> {
    runner: &'a R,
    program: String,
    timeout: Option<Duration>,
}

impl<'a, R: ProcessRunner> ContainerRuntime<'a, R> {
    pub fn new(runner: &'a R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `stop <name>`. Nonzero when the container does not exist.
    #[instrument(skip_all, fields(container = %spec.name))]
    pub fn stop(&self, spec: &ContainerSpec) -> Result<ProcessExit> {
        self.invoke(spec.stop_args())
    }

    /// `rm <name>`. Nonzero when the container does not exist.
    #[instrument(skip_all, fields(container = %spec.name))]
    pub fn remove(&self, spec: &ContainerSpec) -> Result<ProcessExit> {
        self.invoke(spec.rm_args())
    }

    /// `run -d ...` for a fresh container.
    #[instrument(skip_all, fields(container = %spec.name, image = %spec.image_ref()))]
    pub fn run_detached(&self, spec: &ContainerSpec) -> Result<ProcessExit> {
        self.invoke(spec.run_args())
    }

    fn invoke(&self, args: Vec<String>) -> Result<ProcessExit> {
        let invocation = Invocation::new(&self.program, args).with_timeout(self.timeout);
        debug!(command = %invocation.command_line(), "container runtime command");
        self.runner.run(&invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::container::{EnvVar, PortBinding};
    use crate::test_support::{Scripted, ScriptedRunner};

    fn spec() -> ContainerSpec {
        ContainerSpec {
            name: "search".to_string(),
            image: "example/search".to_string(),
            tag: "1.0".to_string(),
            ports: vec![PortBinding::same(9200)],
            env: vec![EnvVar::new("A", "b")],
        }
    }

    #[test]
    fn commands_use_configured_program_and_timeout() {
        let runner = ScriptedRunner::new(vec![
            Scripted::Exit(0),
            Scripted::Exit(0),
            Scripted::Exit(0),
        ]);
        let runtime =
            ContainerRuntime::new(&runner, "podman").with_timeout(Some(Duration::from_secs(7)));

        runtime.stop(&spec()).expect("stop");
        runtime.remove(&spec()).expect("rm");
        runtime.run_detached(&spec()).expect("run");

        let calls = runner.calls();
        let lines: Vec<String> = calls.iter().map(Invocation::command_line).collect();
        assert_eq!(
            lines,
            vec![
                "podman stop search",
                "podman rm search",
                "podman run -d --name search -p 9200:9200 -e A=b example/search:1.0",
            ]
        );
        assert!(
            calls
                .iter()
                .all(|call| call.timeout == Some(Duration::from_secs(7)))
        );
    }
}
