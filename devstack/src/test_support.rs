//! Test-only helpers: scripted process runner, output transcripts, temp projects.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::types::ProcessExit;
use crate::io::config::{DEFAULT_CONFIG_FILE, DevstackConfig, write_config};
use crate::io::process::{Invocation, ProcessRunner};
use crate::io::venv::{ACTIVATE_SCRIPT, BIN_DIR};

/// Scripted result for one invocation.
#[derive(Debug, Clone)]
pub enum Scripted {
    Exit(i32),
    TimedOut,
    SpawnError(String),
}

/// Runner that records invocations and replays scripted results in order.
pub struct ScriptedRunner {
    responses: RefCell<VecDeque<Scripted>>,
    calls: RefCell<Vec<Invocation>>,
    transcript: Option<Transcript>,
}

impl ScriptedRunner {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            calls: RefCell::new(Vec::new()),
            transcript: None,
        }
    }

    /// Also note each invocation in `transcript`, interleaved with output.
    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<ProcessExit> {
        self.calls.borrow_mut().push(invocation.clone());
        if let Some(transcript) = &self.transcript {
            transcript.push(format!("<run {}>", invocation.command_line()));
        }
        let next = self
            .responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected invocation: {}", invocation.command_line()))?;
        match next {
            Scripted::Exit(code) => Ok(ProcessExit::code(code)),
            Scripted::TimedOut => Ok(ProcessExit {
                code: None,
                timed_out: true,
            }),
            Scripted::SpawnError(msg) => Err(anyhow!("spawn {}: {msg}", invocation.program)),
        }
    }
}

/// Shared, ordered record of output chunks and process invocations.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    events: Rc<RefCell<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: String) {
        self.events.borrow_mut().push(event);
    }

    /// Writer whose output lands in this transcript.
    pub fn writer(&self) -> TranscriptWriter {
        TranscriptWriter {
            transcript: self.clone(),
        }
    }

    /// All events concatenated in order.
    pub fn text(&self) -> String {
        self.events.borrow().concat()
    }
}

pub struct TranscriptWriter {
    transcript: Transcript,
}

impl Write for TranscriptWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.transcript
            .push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Temporary project directory for launcher tests.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp project")?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create `<root>/<name>` with an (empty) activation script.
    pub fn create_venv(&self, name: &str) -> Result<()> {
        let bin_dir = self.root().join(name).join(BIN_DIR);
        fs::create_dir_all(&bin_dir).context("create venv bin dir")?;
        fs::write(bin_dir.join(ACTIVATE_SCRIPT), "").context("write activation script")?;
        Ok(())
    }

    pub fn write_file(&self, rel: &str, contents: &str) -> Result<()> {
        let path = self.root().join(rel);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }

    /// Write `config` where the binary looks for it by default.
    pub fn write_config(&self, config: &DevstackConfig) -> Result<()> {
        write_config(&self.root().join(DEFAULT_CONFIG_FILE), config)
    }
}
