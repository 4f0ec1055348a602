//! Shared result types for external command runs.

/// Exit information for a child process that was spawned and waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// True when the process was killed after exceeding its timeout.
    pub timed_out: bool,
}

impl ProcessExit {
    pub fn code(code: i32) -> Self {
        Self {
            code: Some(code),
            timed_out: false,
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.code == Some(0)
    }
}

/// Outcome of the container start command.
///
/// There is exactly one failure class: anything other than a clean zero exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    Started,
    Failed,
}

impl StartStatus {
    /// Classify the start command result. `None` means the command never spawned.
    pub fn from_exit(exit: Option<ProcessExit>) -> Self {
        match exit {
            Some(exit) if exit.success() => StartStatus::Started,
            _ => StartStatus::Failed,
        }
    }
}
