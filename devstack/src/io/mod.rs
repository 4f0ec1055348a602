//! I/O helpers for devstack commands.

pub mod config;
pub mod console;
pub mod docker;
pub mod process;
pub mod status_text;
pub mod venv;
