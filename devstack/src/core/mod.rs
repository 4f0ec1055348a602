//! Pure logic for devstack commands (no I/O).

pub mod container;
pub mod env;
pub mod types;
