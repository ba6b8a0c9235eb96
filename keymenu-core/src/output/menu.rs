//! Menu output: pick another output backend through the selection filter

use std::sync::Arc;

use tracing::{info, warn};

use super::{OutputBackend, OutputPayload};
use crate::error::OutputResult;
use crate::selection::SelectionProtocol;

/// Lets the user choose the output backend after choosing the entry
pub struct MenuOutput {
    protocol: SelectionProtocol,
    backends: Vec<(String, Arc<dyn OutputBackend>)>,
}

impl MenuOutput {
    /// Creates a menu over `backends`, shown in the given order
    #[must_use]
    pub fn new(protocol: &SelectionProtocol, backends: Vec<(String, Arc<dyn OutputBackend>)>) -> Self {
        Self {
            protocol: protocol.with_prompt("output").with_lines_per_block(None),
            backends,
        }
    }

    /// Names offered in the menu
    #[must_use]
    pub fn choices(&self) -> Vec<&str> {
        self.backends.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl OutputBackend for MenuOutput {
    fn deliver(&self, payload: &OutputPayload) -> OutputResult<()> {
        let Some(position) = self.protocol.choose_position(&self.choices())? else {
            warn!("No output method selected, nothing delivered");
            return Ok(());
        };
        // choices() lists the backends in order, so the position is in range
        let (name, backend) = &self.backends[position];
        info!(backend = %name, "Output method selected from menu");
        backend.deliver(payload)
    }

    fn description(&self) -> &'static str {
        "Choose one of the other output backends from a menu"
    }
}

impl std::fmt::Debug for MenuOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuOutput")
            .field("protocol", &self.protocol)
            .field("choices", &self.choices())
            .finish()
    }
}
