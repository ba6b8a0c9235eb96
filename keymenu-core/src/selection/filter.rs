//! Filter program invocation and the process driver

use std::io::{self, Read};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{SelectionError, SelectionResult};
use crate::process;

/// Default filter program
pub const DEFAULT_FILTER: &str = "rofi";

/// Default separator token between multi-line blocks (ASCII unit separator)
pub const DEFAULT_SEPARATOR: &str = "\u{1f}";

/// How the filter program is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCommand {
    /// Program name or path
    pub program: String,
    /// Arguments always passed, before the mode arguments
    pub args: Vec<String>,
    /// Separator token used in multi-line mode
    pub separator: String,
    /// Optional prompt text
    pub prompt: Option<String>,
}

impl Default for FilterCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_FILTER.to_string(),
            args: vec!["-dmenu".to_string(), "-i".to_string()],
            separator: DEFAULT_SEPARATOR.to_string(),
            prompt: None,
        }
    }
}

impl FilterCommand {
    /// Returns a copy with a different prompt
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Builds the argument vector for blocks of `lines_per_block` lines
    ///
    /// Multi-line mode tells the filter the block height (`-eh`) and the
    /// separator token (`-sep`); single-line mode adds neither.
    #[must_use]
    pub fn argv(&self, lines_per_block: usize) -> Vec<String> {
        let mut argv = self.args.clone();
        if let Some(prompt) = &self.prompt {
            argv.push("-p".to_string());
            argv.push(prompt.clone());
        }
        if lines_per_block > 1 {
            argv.push("-eh".to_string());
            argv.push(lines_per_block.to_string());
            argv.push("-sep".to_string());
            argv.push(self.separator.clone());
        }
        argv
    }

    /// Joins the blocks into the text written to the filter's stdin
    #[must_use]
    pub fn encode(&self, blocks: &[&str], lines_per_block: usize) -> String {
        if lines_per_block > 1 {
            blocks.join(&format!("\n{}", self.separator))
        } else {
            blocks.join("\n")
        }
    }
}

/// One run of the filter: arguments and stdin contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInvocation {
    pub args: Vec<String>,
    pub input: String,
}

/// Something that lets the user pick one block out of the input
pub trait SelectionFilter: Send + Sync {
    /// Runs the filter and returns everything it wrote to stdout
    ///
    /// # Errors
    /// Returns `SelectionError` if the filter cannot be run
    fn run(&self, invocation: &FilterInvocation) -> SelectionResult<String>;
}

/// Runs the filter as a child process over its standard streams
#[derive(Debug, Clone)]
pub struct ProcessFilter {
    program: String,
}

impl ProcessFilter {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SelectionFilter for ProcessFilter {
    fn run(&self, invocation: &FilterInvocation) -> SelectionResult<String> {
        debug!(program = %self.program, args = ?invocation.args, bytes = invocation.input.len(), "Starting filter");

        let mut child = Command::new(&self.program)
            .args(&invocation.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                if process::is_not_found(&e) {
                    SelectionError::FilterNotFound(self.program.clone())
                } else {
                    SelectionError::Io(e)
                }
            })?;

        let writer = process::feed_stdin(&mut child, invocation.input.clone().into_bytes());

        let mut stdout = String::new();
        let read = child
            .stdout
            .take()
            .map_or(Ok(0), |mut out| out.read_to_string(&mut stdout));

        // The filter is done once its output is closed; make sure it is gone
        if let Err(e) = child.kill() {
            if e.kind() != io::ErrorKind::InvalidInput {
                warn!(error = %e, "Failed to terminate filter");
            }
        }
        let status = child.wait()?;
        debug!(status = ?status.code(), "Filter exited");

        if let Some(handle) = writer {
            handle
                .join()
                .map_err(|_| io::Error::other("stdin writer thread panicked"))??;
        }
        read?;

        Ok(stdout)
    }
}
