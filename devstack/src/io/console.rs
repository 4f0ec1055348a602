//! Terminal interaction.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

pub const PAUSE_PROMPT: &str = "Press Enter to continue...";

/// Print the pause prompt and block until a line (or EOF) arrives on `input`.
pub fn pause<I: BufRead, W: Write>(input: &mut I, out: &mut W) -> Result<()> {
    write!(out, "{PAUSE_PROMPT}").context("write pause prompt")?;
    out.flush().context("flush pause prompt")?;
    let mut line = String::new();
    input.read_line(&mut line).context("read acknowledgment")?;
    Ok(())
}
