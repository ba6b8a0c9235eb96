//! Plain text output on stdout

use std::io::{self, Write};

use super::{OutputBackend, OutputPayload};
use crate::error::OutputResult;

/// Prints `@username:`, `@password:` and one `@<field>:` line per field
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutOutput;

impl StdoutOutput {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Writes the payload lines to `out`
    ///
    /// # Errors
    /// Returns the write error
    pub fn write_to(out: &mut impl Write, payload: &OutputPayload) -> io::Result<()> {
        writeln!(out, "@username: {}", payload.username)?;
        writeln!(out, "@password: {}", payload.expose_password())?;
        for (name, value) in &payload.fields {
            writeln!(out, "@{name}: {value}")?;
        }
        out.flush()
    }
}

impl OutputBackend for StdoutOutput {
    fn deliver(&self, payload: &OutputPayload) -> OutputResult<()> {
        Self::write_to(&mut io::stdout().lock(), payload)?;
        Ok(())
    }

    fn description(&self) -> &'static str {
        "Print username, password and fields to stdout"
    }
}
