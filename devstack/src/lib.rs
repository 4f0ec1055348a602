//! Local development launcher for the vector-search stack.
//!
//! Two independent commands replace the old helper scripts:
//!
//! - [`bootstrap`]: recreate the OpenSearch container and report whether it started.
//! - [`serve`]: activate the project's virtual environment and run the API server.
//!
//! Pure logic (argv rendering, environment edits, outcome classification) lives
//! in [`core`]; process spawning, config files, templates and the terminal live
//! in [`io`].

pub mod bootstrap;
pub mod core;
pub mod io;
pub mod logging;
pub mod serve;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
