//! Copy output: username to CLIPBOARD, password to PRIMARY via xsel

use super::{run_all, HelperCommand, OutputBackend, OutputPayload};
use crate::error::OutputResult;

/// Puts the username on the clipboard (Ctrl-V) and the password on the
/// primary selection (middle click)
#[derive(Debug, Clone)]
pub struct ClipboardOutput {
    program: String,
}

impl Default for ClipboardOutput {
    fn default() -> Self {
        Self::new("xsel")
    }
}

impl ClipboardOutput {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn xsel(&self, selection: &str, text: &str) -> HelperCommand {
        let args = [
            "--logfile".to_string(),
            "/dev/null".to_string(),
            format!("--{selection}"),
            "--input".to_string(),
        ];
        HelperCommand::new(&self.program, args).with_input(text.as_bytes())
    }

    /// The xsel runs needed for `payload`
    #[must_use]
    pub fn commands(&self, payload: &OutputPayload) -> Vec<HelperCommand> {
        vec![
            self.xsel("clipboard", &payload.username),
            self.xsel("primary", payload.expose_password()),
        ]
    }
}

impl OutputBackend for ClipboardOutput {
    fn deliver(&self, payload: &OutputPayload) -> OutputResult<()> {
        run_all(&self.commands(payload))
    }

    fn description(&self) -> &'static str {
        "Username to the clipboard, password to the primary selection (xsel)"
    }
}
