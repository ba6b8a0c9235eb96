//! Autotype output: types username, Tab, password with xdotool

use super::{run_all, HelperCommand, OutputBackend, OutputPayload};
use crate::error::OutputResult;

/// Types the credential into the focused window
#[derive(Debug, Clone)]
pub struct AutotypeOutput {
    program: String,
}

impl Default for AutotypeOutput {
    fn default() -> Self {
        Self::new("xdotool")
    }
}

impl AutotypeOutput {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Types `text` read from stdin so it never shows up in the argument list
    fn type_text(&self, text: &str) -> HelperCommand {
        HelperCommand::new(&self.program, ["type", "--clearmodifiers", "--file", "-"])
            .with_input(text.as_bytes())
    }

    /// The xdotool runs needed for `payload`
    #[must_use]
    pub fn commands(&self, payload: &OutputPayload) -> Vec<HelperCommand> {
        vec![
            self.type_text(&payload.username),
            HelperCommand::new(&self.program, ["key", "Tab"]),
            self.type_text(payload.expose_password()),
        ]
    }
}

impl OutputBackend for AutotypeOutput {
    fn deliver(&self, payload: &OutputPayload) -> OutputResult<()> {
        run_all(&self.commands(payload))
    }

    fn description(&self) -> &'static str {
        "Type username, Tab and password into the focused window (xdotool)"
    }
}
