//! Terminal password prompt

use std::io::{self, BufRead, IsTerminal};

use secrecy::SecretString;
use tracing::debug;

use crate::error::QueryResult;

use super::{strip_line_ending, PasswordQuery};

/// Reads the password from the terminal, or from stdin when it is piped
///
/// On a terminal the password is read without echo. When stdin is not a
/// terminal a single line is read, which lets scripts pipe the password in.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalQuery;

impl TerminalQuery {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reads a single line from `reader`, without its line terminator
    ///
    /// # Errors
    /// Returns the read error
    pub fn read_line(reader: &mut impl BufRead) -> io::Result<String> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        Ok(strip_line_ending(line))
    }
}

impl PasswordQuery for TerminalQuery {
    fn query(&self, label: &str) -> QueryResult<SecretString> {
        let stdin = io::stdin();
        let password = if stdin.is_terminal() {
            rpassword::prompt_password(format!("Enter password for {label}: "))?
        } else {
            debug!(database = %label, "stdin is not a terminal, reading one line");
            Self::read_line(&mut stdin.lock())?
        };
        Ok(SecretString::from(password))
    }

    fn description(&self) -> &'static str {
        "Prompt on the terminal, or read one line from piped stdin"
    }
}
