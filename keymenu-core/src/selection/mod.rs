//! Selection protocol between `keymenu` and an external filter program
//!
//! Candidate blocks are written to the filter's stdin; the filter writes the
//! block the user picked back to stdout. The returned text is matched
//! verbatim against the candidates, so anything the filter prints that is not
//! a candidate (an empty line from a cancelled menu, free text typed by the
//! user) resolves to "no selection".

mod filter;

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SelectionResult;
use crate::index::EntryIndex;
use crate::models::Entry;

pub use filter::{
    FilterCommand, FilterInvocation, ProcessFilter, SelectionFilter, DEFAULT_FILTER,
    DEFAULT_SEPARATOR,
};

/// Returns the number of lines per block
///
/// An explicit value wins. Otherwise the height is inferred as the largest
/// number of embedded newlines plus one, which assumes all blocks have the
/// same height.
#[must_use]
pub fn lines_per_block<'a>(blocks: impl IntoIterator<Item = &'a str>, explicit: Option<usize>) -> usize {
    explicit.map_or_else(
        || {
            blocks
                .into_iter()
                .map(|block| block.matches('\n').count())
                .max()
                .unwrap_or(0)
                + 1
        },
        |n| n.max(1),
    )
}

/// Drives a filter to pick one of a set of text blocks
#[derive(Clone)]
pub struct SelectionProtocol {
    command: FilterCommand,
    filter: Arc<dyn SelectionFilter>,
    lines_per_block: Option<usize>,
}

impl SelectionProtocol {
    /// Creates a protocol running `filter` with the arguments of `command`
    #[must_use]
    pub fn new(command: FilterCommand, filter: Arc<dyn SelectionFilter>) -> Self {
        Self {
            command,
            filter,
            lines_per_block: None,
        }
    }

    /// Creates a protocol that spawns `command.program` as a child process
    #[must_use]
    pub fn with_process(command: FilterCommand) -> Self {
        let filter = Arc::new(ProcessFilter::new(command.program.clone()));
        Self::new(command, filter)
    }

    /// Overrides the inferred block height
    #[must_use]
    pub const fn with_lines_per_block(mut self, lines: Option<usize>) -> Self {
        self.lines_per_block = lines;
        self
    }

    /// Returns a copy using a different prompt
    #[must_use]
    pub fn with_prompt(&self, prompt: impl Into<String>) -> Self {
        Self {
            command: self.command.clone().with_prompt(prompt),
            filter: Arc::clone(&self.filter),
            lines_per_block: self.lines_per_block,
        }
    }

    /// Returns the filter command
    #[must_use]
    pub const fn command(&self) -> &FilterCommand {
        &self.command
    }

    /// Builds the filter invocation for `blocks`
    #[must_use]
    pub fn invocation(&self, blocks: &[&str]) -> FilterInvocation {
        let lines = lines_per_block(blocks.iter().copied(), self.lines_per_block);
        FilterInvocation {
            args: self.command.argv(lines),
            input: self.command.encode(blocks, lines),
        }
    }

    /// Lets the user pick one of `blocks`
    ///
    /// # Returns
    /// The chosen block, or `None` if nothing (or something unknown) was
    /// returned by the filter
    ///
    /// # Errors
    /// Returns `SelectionError` if the filter cannot be run
    pub fn choose<'b>(&self, blocks: &[&'b str]) -> SelectionResult<Option<&'b str>> {
        Ok(self.choose_position(blocks)?.map(|position| blocks[position]))
    }

    /// Like [`choose`](Self::choose), but returns the position in `blocks`
    ///
    /// # Errors
    /// Returns `SelectionError` if the filter cannot be run
    pub fn choose_position(&self, blocks: &[&str]) -> SelectionResult<Option<usize>> {
        let invocation = self.invocation(blocks);
        let output = self.filter.run(&invocation)?;
        let picked = output.trim_end();

        let found = blocks.iter().position(|block| *block == picked);
        if found.is_none() {
            debug!(returned_bytes = picked.len(), "Filter returned no known block");
        }
        Ok(found)
    }

    /// Lets the user pick an entry out of `index`
    ///
    /// # Returns
    /// The chosen display key and entry, or `None` if nothing was selected
    ///
    /// # Errors
    /// Returns `SelectionError` if the filter cannot be run
    pub fn select<'i>(&self, index: &'i EntryIndex) -> SelectionResult<Option<(&'i str, &'i Entry)>> {
        let keys: Vec<&str> = index.keys().collect();
        let Some(key) = self.choose(&keys)? else {
            info!("No entry was selected");
            return Ok(None);
        };
        Ok(index.get_key_value(key))
    }
}

impl std::fmt::Debug for SelectionProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionProtocol")
            .field("command", &self.command)
            .field("lines_per_block", &self.lines_per_block)
            .finish_non_exhaustive()
    }
}
