//! Integration tests running a real child process as the filter
//!
//! `sh -c 'head -n 3'` stands in for rofi: it prints the first block, which
//! is exactly what a user pressing enter on the first row would return.

#![cfg(unix)]

use std::sync::Arc;

use keymenu_core::error::{QueryResult, SelectionError};
use keymenu_core::query::PasswordQuery;
use keymenu_core::selection::{FilterCommand, SelectionProtocol};
use keymenu_core::{BackendRegistry, Credential, KeymenuError, MenuSession, SessionOutcome};
use secrecy::SecretString;

use crate::fixtures::{RecordingOutput, StubLoader, GOOGLE_DB, NETFLIX_DB};

struct Fixed;

impl PasswordQuery for Fixed {
    fn query(&self, _label: &str) -> QueryResult<SecretString> {
        Ok(SecretString::from("pw".to_string()))
    }

    fn description(&self) -> &'static str {
        "fixed"
    }
}

fn shell_filter(script: &str) -> FilterCommand {
    FilterCommand {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        ..FilterCommand::default()
    }
}

fn registry(output: Arc<RecordingOutput>) -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register_query("fixed", Arc::new(Fixed), false).unwrap();
    registry.register_output("record", output, false).unwrap();
    registry
}

fn requests() -> Vec<Credential> {
    vec![Credential::new(NETFLIX_DB), Credential::new(GOOGLE_DB)]
}

#[test]
fn test_first_block_from_child_process() {
    let output = Arc::new(RecordingOutput::default());
    let registry = registry(output.clone());
    let loader = StubLoader::two_databases();
    let protocol = SelectionProtocol::with_process(shell_filter("head -n 3"));
    let session = MenuSession::new(&registry, &loader, protocol);

    let outcome = session.run("fixed", "record", requests()).unwrap();

    assert!(matches!(outcome, SessionOutcome::Delivered { ref title, .. } if title == "Netflix"));
    assert_eq!(
        *output.delivered.lock().unwrap(),
        vec![("n@example.com".to_string(), "n-secret".to_string())]
    );
}

#[test]
fn test_cancelled_child_process_selects_nothing() {
    let output = Arc::new(RecordingOutput::default());
    let registry = registry(output.clone());
    let loader = StubLoader::two_databases();
    let protocol = SelectionProtocol::with_process(shell_filter("cat > /dev/null; exit 1"));
    let session = MenuSession::new(&registry, &loader, protocol);

    let outcome = session.run("fixed", "record", requests()).unwrap();

    assert_eq!(outcome, SessionOutcome::NothingSelected);
    assert!(output.delivered.lock().unwrap().is_empty());
}

#[test]
fn test_missing_filter_program() {
    let output = Arc::new(RecordingOutput::default());
    let registry = registry(output);
    let loader = StubLoader::two_databases();
    let command = FilterCommand {
        program: "keymenu-no-such-filter".to_string(),
        ..FilterCommand::default()
    };
    let session = MenuSession::new(&registry, &loader, SelectionProtocol::with_process(command));

    let err = session.run("fixed", "record", requests()).unwrap_err();
    assert!(matches!(
        err,
        KeymenuError::Selection(SelectionError::FilterNotFound(_))
    ));
}
