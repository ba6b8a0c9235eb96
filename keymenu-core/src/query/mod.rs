//! Password query backends
//!
//! A query backend asks the user for the master password of a database.
//! An empty answer means the user gave up; the credential resolver turns it
//! into `ResolveError::NoPasswordProvided`.

mod filter;
mod terminal;

use secrecy::SecretString;

use crate::error::QueryResult;

pub use filter::FilterPasswordQuery;
pub use terminal::TerminalQuery;

/// Abstraction over the ways of asking for a database password
pub trait PasswordQuery: Send + Sync {
    /// Asks for the password of the database labelled `label`
    ///
    /// # Arguments
    /// * `label` - Short name of the database (its file name)
    ///
    /// # Returns
    /// The entered password; empty if the user cancelled
    ///
    /// # Errors
    /// Returns `QueryError` if the prompt itself failed
    fn query(&self, label: &str) -> QueryResult<SecretString>;

    /// One-line description shown by `--list-backends`
    fn description(&self) -> &'static str;
}

/// Strips one trailing line terminator, keeping any other whitespace
pub(crate) fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
