//! Password prompt delegated to the selection filter (rofi password mode)

use secrecy::SecretString;
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::process;

use super::{strip_line_ending, PasswordQuery};

/// Asks for the password through the filter program in password mode
///
/// With rofi this shows a masked single-line input; closing it with Escape
/// exits non-zero with no output, which is reported as an empty password.
#[derive(Debug, Clone)]
pub struct FilterPasswordQuery {
    program: String,
}

impl FilterPasswordQuery {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments passed to the filter program
    #[must_use]
    pub fn args(label: &str) -> Vec<String> {
        vec![
            "-dmenu".to_string(),
            "-password".to_string(),
            "-p".to_string(),
            format!("Password for {label}"),
        ]
    }
}

impl Default for FilterPasswordQuery {
    fn default() -> Self {
        Self::new("rofi")
    }
}

impl PasswordQuery for FilterPasswordQuery {
    fn query(&self, label: &str) -> QueryResult<SecretString> {
        let output = process::run_with_input(&self.program, &Self::args(label), b"").map_err(
            |e| {
                if process::is_not_found(&e) {
                    QueryError::ProgramNotFound(self.program.clone())
                } else {
                    QueryError::Io(e)
                }
            },
        )?;

        if !output.status.success() {
            debug!(program = %self.program, status = ?output.status.code(), "Password prompt cancelled");
            return Ok(SecretString::from(String::new()));
        }

        let password = strip_line_ending(String::from_utf8_lossy(&output.stdout).into_owned());
        Ok(SecretString::from(password))
    }

    fn description(&self) -> &'static str {
        "Masked input through the filter program (rofi -dmenu -password)"
    }
}
