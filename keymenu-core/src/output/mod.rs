//! Output backends deliver the selected credential
//!
//! Backends receive an [`OutputPayload`] built from the selected entry and
//! hand it to the user: through the X selections, simulated typing or plain
//! text on stdout. Failures are reported as `OutputError` and never touch
//! the keyring.

mod autotype;
mod clipboard;
mod menu;
mod stdout;

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::error::{OutputError, OutputResult};
use crate::models::Entry;
use crate::process;
use crate::registry::BackendRegistry;

pub use autotype::AutotypeOutput;
pub use clipboard::ClipboardOutput;
pub use menu::MenuOutput;
pub use stdout::StdoutOutput;

/// What an output backend receives
pub struct OutputPayload {
    pub username: String,
    pub password: SecretString,
    /// Additional non-empty fields as `(name, value)`, in a fixed order
    pub fields: Vec<(String, String)>,
}

impl OutputPayload {
    /// Builds the payload for `entry`
    #[must_use]
    pub fn from_entry(entry: &Entry) -> Self {
        let fields = [
            ("title", &entry.title),
            ("url", &entry.url),
            ("group", &entry.group),
            ("notes", &entry.notes),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();

        Self {
            username: entry.username.clone(),
            password: SecretString::from(entry.password.clone()),
            fields,
        }
    }

    /// Exposes the password (should be used carefully)
    #[must_use]
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for OutputPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputPayload")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("fields", &self.fields)
            .finish()
    }
}

/// Abstraction over the ways of delivering a credential
pub trait OutputBackend: Send + Sync {
    /// Delivers `payload`
    ///
    /// # Errors
    /// Returns `OutputError` if a helper program is missing or fails
    fn deliver(&self, payload: &OutputPayload) -> OutputResult<()>;

    /// One-line description shown by `--list-backends`
    fn description(&self) -> &'static str;
}

/// One run of a helper program
#[derive(Clone, PartialEq, Eq)]
pub struct HelperCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Bytes written to the helper's stdin
    pub input: Vec<u8>,
}

impl HelperCommand {
    #[must_use]
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            input: Vec::new(),
        }
    }

    /// Sets the bytes written to stdin
    #[must_use]
    pub fn with_input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = input.into();
        self
    }

    /// Runs the command to completion
    ///
    /// # Errors
    /// Returns `OutputError::ProgramNotFound` if the program is missing, or
    /// `OutputError::CommandFailed` if it exits unsuccessfully
    pub fn run(&self) -> OutputResult<()> {
        debug!(program = %self.program, "Running output helper");
        let output =
            process::run_with_input(&self.program, &self.args, &self.input).map_err(|e| {
                if process::is_not_found(&e) {
                    OutputError::ProgramNotFound(self.program.clone())
                } else {
                    OutputError::Io(e)
                }
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(OutputError::CommandFailed {
                program: self.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

// Arguments and input may carry secrets
impl fmt::Debug for HelperCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperCommand")
            .field("program", &self.program)
            .field("input_bytes", &self.input.len())
            .finish_non_exhaustive()
    }
}

/// Runs `commands` in order, stopping at the first failure
///
/// # Errors
/// Returns the error of the first failing command
pub fn run_all(commands: &[HelperCommand]) -> OutputResult<()> {
    commands.iter().try_for_each(HelperCommand::run)
}

/// Delivers entries through backends looked up in a registry
#[derive(Debug, Clone, Copy)]
pub struct OutputDispatcher<'r> {
    registry: &'r BackendRegistry,
}

impl<'r> OutputDispatcher<'r> {
    #[must_use]
    pub const fn new(registry: &'r BackendRegistry) -> Self {
        Self { registry }
    }

    /// Delivers `entry` through the output backend `name`
    ///
    /// # Errors
    /// Returns `OutputError::Backend` for an unknown name, or the backend's
    /// own failure
    pub fn dispatch(&self, name: &str, entry: &Entry) -> OutputResult<()> {
        let backend = self.registry.output(name)?;
        let payload = OutputPayload::from_entry(entry);
        debug!(
            backend = %name,
            has_username = !payload.username.is_empty(),
            password_len = payload.expose_password().len(),
            "Delivering credential"
        );
        backend.deliver(&payload)?;
        info!(backend = %name, title = %entry.title, "Credential delivered");
        Ok(())
    }
}
