//! Property-based tests for the selection protocol
//!
//! **Property: Verbatim echo** - a filter echoing back the Nth block selects
//! the Nth entry, for every N.

use keymenu_core::error::SelectionResult;
use keymenu_core::index::{DuplicateKeys, EntryFormatter, EntryIndex};
use keymenu_core::selection::{
    lines_per_block, FilterCommand, FilterInvocation, SelectionFilter, SelectionProtocol,
};
use keymenu_core::{Entry, LoadedDatabase};
use proptest::prelude::*;
use std::sync::Arc;

/// Filter that splits its input back into blocks and echoes block `pick`
struct EchoNth {
    pick: usize,
    separator: String,
}

impl SelectionFilter for EchoNth {
    fn run(&self, invocation: &FilterInvocation) -> SelectionResult<String> {
        let multi_line = invocation.args.iter().any(|a| a == "-eh");
        let blocks: Vec<&str> = if multi_line {
            invocation
                .input
                .split(&format!("\n{}", self.separator))
                .collect()
        } else {
            invocation.input.split('\n').collect()
        };
        Ok(blocks
            .get(self.pick)
            .map(|block| format!("{block}\n"))
            .unwrap_or_default())
    }
}

fn protocol(pick: usize) -> SelectionProtocol {
    let command = FilterCommand::default();
    let filter = Arc::new(EchoNth {
        pick,
        separator: command.separator.clone(),
    });
    SelectionProtocol::new(command, filter)
}

// ========== Generators ==========

fn arb_entries() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(
        ("[a-z]{1,10}", "[a-z@.]{0,20}", "[ -~]{1,16}", "[A-Za-z]{0,8}"),
        1..10,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, user, password, group))| {
                Entry::new(format!("{title}{i}"), user, password).with_group(group)
            })
            .collect()
    })
}

/// Strategy for single-line blocks without the separator or newlines
fn arb_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-zA-Z0-9 ]{1,20}", 1..10)
        .prop_map(|set| set.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .prop_filter("need at least one line", |v: &Vec<String>| !v.is_empty())
}

// ========== Properties ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Echoing the Nth block resolves to the Nth entry
    #[test]
    fn prop_echo_selects_nth_entry(entries in arb_entries(), pick in any::<prop::sample::Index>()) {
        let n = pick.index(entries.len());
        let databases = vec![LoadedDatabase::new("/tmp/db.kdbx", entries.clone())];
        let index = EntryIndex::build(&databases, &EntryFormatter::default(), DuplicateKeys::Disambiguate);

        let (_, entry) = protocol(n).select(&index).unwrap().unwrap();
        prop_assert_eq!(entry, &entries[n]);
    }

    /// Echoing one of many single-line blocks returns that block
    #[test]
    fn prop_single_line_choice(lines in arb_lines(), pick in any::<prop::sample::Index>()) {
        let n = pick.index(lines.len());
        let blocks: Vec<&str> = lines.iter().map(String::as_str).collect();

        let chosen = protocol(n).choose(&blocks).unwrap();
        prop_assert_eq!(chosen, Some(blocks[n]));
    }

    /// Anything past the last block selects nothing
    #[test]
    fn prop_out_of_range_selects_nothing(entries in arb_entries()) {
        let databases = vec![LoadedDatabase::new("/tmp/db.kdbx", entries.clone())];
        let index = EntryIndex::build(&databases, &EntryFormatter::default(), DuplicateKeys::Disambiguate);

        prop_assert!(protocol(entries.len()).select(&index).unwrap().is_none());
    }

    /// The inferred height is the largest newline count plus one
    #[test]
    fn prop_inferred_height(heights in prop::collection::vec(1usize..6, 1..8)) {
        let blocks: Vec<String> = heights.iter().map(|h| vec!["x"; *h].join("\n")).collect();
        let expected = *heights.iter().max().unwrap();

        prop_assert_eq!(lines_per_block(blocks.iter().map(String::as_str), None), expected);
        prop_assert_eq!(lines_per_block(blocks.iter().map(String::as_str), Some(2)), 2);
    }

    /// Multi-line mode passes the height and separator to the filter
    #[test]
    fn prop_multi_line_arguments(lines in 2usize..8) {
        let args = FilterCommand::default().argv(lines);
        let eh = args.iter().position(|a| a == "-eh").unwrap();
        prop_assert_eq!(&args[eh + 1], &lines.to_string());
        prop_assert!(args.iter().any(|a| a == "-sep"));
        prop_assert!(!FilterCommand::default().argv(1).iter().any(|a| a == "-eh"));
    }
}
