//! Python virtual environment activation.
//!
//! An activation script mutates the shell that sources it. We cannot touch our
//! parent shell, so activation is applied to the environment handed to the
//! child process instead: `VIRTUAL_ENV` is set, the venv's executable
//! directory goes first on `PATH`, and `PYTHONHOME` is cleared.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::core::env::ProcessEnv;

#[cfg(windows)]
pub const BIN_DIR: &str = "Scripts";
#[cfg(windows)]
pub const ACTIVATE_SCRIPT: &str = "activate.bat";

#[cfg(not(windows))]
pub const BIN_DIR: &str = "bin";
#[cfg(not(windows))]
pub const ACTIVATE_SCRIPT: &str = "activate";

/// A virtual environment whose activation artifact exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub venv_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub artifact: PathBuf,
}

/// Find the activation artifact for `venv_dir` (relative paths resolve against `root`).
pub fn locate(root: &Path, venv_dir: &Path) -> Result<Activation> {
    let venv_dir = if venv_dir.is_absolute() {
        venv_dir.to_path_buf()
    } else {
        root.join(venv_dir)
    };
    let bin_dir = venv_dir.join(BIN_DIR);
    let artifact = bin_dir.join(ACTIVATE_SCRIPT);
    if !artifact.is_file() {
        return Err(anyhow!(
            "cannot activate virtual environment: {} not found",
            artifact.display()
        ));
    }
    debug!(artifact = %artifact.display(), "found activation script");
    Ok(Activation {
        venv_dir,
        bin_dir,
        artifact,
    })
}

/// Environment a child sees after activating `activation` on top of `base`.
pub fn activate(base: &ProcessEnv, activation: &Activation) -> Result<ProcessEnv> {
    let mut env = base.clone();
    env.set("VIRTUAL_ENV", activation.venv_dir.as_os_str());
    env.remove("PYTHONHOME");
    env.prepend_path(&activation.bin_dir)?;
    Ok(env)
}
