//! Integration tests for menu sessions over two databases

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keymenu_core::cache::{MemoryStore, SecretCache};
use keymenu_core::error::QueryResult;
use keymenu_core::index::{DuplicateKeys, EntryFormatter, EntryIndex};
use keymenu_core::query::PasswordQuery;
use keymenu_core::selection::{FilterCommand, SelectionProtocol};
use keymenu_core::{
    BackendRegistry, CachePolicy, Credential, KeymenuError, MenuSession, SessionOutcome,
};
use secrecy::SecretString;

use crate::fixtures::{
    google, netflix, PickContaining, RecordingOutput, StubLoader, GOOGLE_DB, NETFLIX_DB,
};

/// Query answering every prompt with the same password
struct Answer {
    password: &'static str,
    calls: AtomicUsize,
}

impl Answer {
    fn new(password: &'static str) -> Arc<Self> {
        Arc::new(Self {
            password,
            calls: AtomicUsize::new(0),
        })
    }
}

impl PasswordQuery for Answer {
    fn query(&self, _label: &str) -> QueryResult<SecretString> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SecretString::from(self.password.to_string()))
    }

    fn description(&self) -> &'static str {
        "answers with a fixed password"
    }
}

struct Harness {
    registry: BackendRegistry,
    output: Arc<RecordingOutput>,
    query: Arc<Answer>,
}

fn harness(password: &'static str) -> Harness {
    let output = Arc::new(RecordingOutput::default());
    let query = Answer::new(password);
    let mut registry = BackendRegistry::new();
    registry.register_query("answer", query.clone(), false).unwrap();
    registry.register_output("record", output.clone(), false).unwrap();
    Harness {
        registry,
        output,
        query,
    }
}

fn protocol(filter: Arc<PickContaining>) -> SelectionProtocol {
    SelectionProtocol::new(FilterCommand::default(), filter)
}

fn requests() -> Vec<Credential> {
    vec![Credential::new(NETFLIX_DB), Credential::new(GOOGLE_DB)]
}

#[test]
fn test_selecting_google_delivers_google_credentials() {
    let h = harness("pw");
    let loader = StubLoader::two_databases();
    let filter = Arc::new(PickContaining::new("Google"));
    let session = MenuSession::new(&h.registry, &loader, protocol(filter.clone()));

    let outcome = session.run("answer", "record", requests()).unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Delivered {
            title: "Google".to_string(),
            backend: "record".to_string(),
        }
    );
    assert_eq!(
        *h.output.delivered.lock().unwrap(),
        vec![("g@example.com".to_string(), "g-secret".to_string())]
    );
    assert_eq!(h.query.calls.load(Ordering::SeqCst), 2);

    let invocations = filter.invocations.lock().unwrap();
    assert_eq!(invocations.len(), 1);
    assert!(invocations[0].args.contains(&"-eh".to_string()));
    assert!(invocations[0].input.find("Netflix") < invocations[0].input.find("Google"));
}

#[test]
fn test_merged_index_has_one_key_per_entry() {
    let h = harness("pw");
    let loader = StubLoader::two_databases();
    let session = MenuSession::new(
        &h.registry,
        &loader,
        protocol(Arc::new(PickContaining::new("x"))),
    );

    let databases = session.load_all("answer", requests()).unwrap();
    let index = EntryIndex::build(&databases, &EntryFormatter::default(), DuplicateKeys::default());

    assert_eq!(index.len(), 2);
    let entries: Vec<_> = index.iter().map(|(_, entry)| entry.clone()).collect();
    assert_eq!(entries, vec![netflix(), google()]);
    assert_eq!(
        *loader.opened.lock().unwrap(),
        vec![PathBuf::from(NETFLIX_DB), PathBuf::from(GOOGLE_DB)]
    );
}

#[test]
fn test_filter_returning_unknown_text_selects_nothing() {
    let h = harness("pw");
    let loader = StubLoader::two_databases();
    let session = MenuSession::new(
        &h.registry,
        &loader,
        protocol(Arc::new(PickContaining::new("Dropbox"))),
    );

    let outcome = session.run("answer", "record", requests()).unwrap();
    assert_eq!(outcome, SessionOutcome::NothingSelected);
    assert!(h.output.delivered.lock().unwrap().is_empty());
}

#[test]
fn test_empty_password_aborts_before_loading() {
    let h = harness("");
    let loader = StubLoader::two_databases();
    let session = MenuSession::new(
        &h.registry,
        &loader,
        protocol(Arc::new(PickContaining::new("Google"))),
    );

    let err = session.run("answer", "record", requests()).unwrap_err();
    assert!(err.is_user_abort());
    assert!(loader.opened.lock().unwrap().is_empty());
}

#[test]
fn test_wrong_password_is_database_error() {
    let h = harness("wrong");
    let loader = StubLoader::two_databases();
    let session = MenuSession::new(
        &h.registry,
        &loader,
        protocol(Arc::new(PickContaining::new("Google"))),
    );

    let err = session.run("answer", "record", requests()).unwrap_err();
    assert!(matches!(err, KeymenuError::Database(_)));
    assert!(!err.is_user_abort());
}

#[test]
fn test_keyring_skips_prompt_on_second_run() {
    let h = harness("pw");
    let loader = StubLoader::two_databases();
    let cache = SecretCache::new(MemoryStore::new());

    for _ in 0..2 {
        let session = MenuSession::new(
            &h.registry,
            &loader,
            protocol(Arc::new(PickContaining::new("Netflix"))),
        )
        .with_cache(&cache, CachePolicy::read_write());
        session.run("answer", "record", requests()).unwrap();
    }

    assert_eq!(h.query.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.output.delivered.lock().unwrap().len(), 2);
}

#[test]
fn test_identical_entries_stay_selectable() {
    let h = harness("pw");
    let loader = StubLoader::new()
        .with(NETFLIX_DB, "pw", vec![netflix()])
        .with(GOOGLE_DB, "pw", vec![netflix()]);
    let session = MenuSession::new(
        &h.registry,
        &loader,
        protocol(Arc::new(PickContaining::new("Netflix"))),
    );

    let databases = session.load_all("answer", requests()).unwrap();
    let kept = EntryIndex::build(&databases, &EntryFormatter::default(), DuplicateKeys::Disambiguate);
    let shadowed = EntryIndex::build(&databases, &EntryFormatter::default(), DuplicateKeys::LastWins);

    assert_eq!(kept.len(), 2);
    assert_eq!(shadowed.len(), 1);
}
