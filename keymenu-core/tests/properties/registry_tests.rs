//! Property-based tests for the backend registry
//!
//! **Property: Overwrite** - a taken name is rejected unless overwriting, and
//! an overwrite keeps the original position.

use keymenu_core::error::OutputResult;
use keymenu_core::output::{OutputBackend, OutputPayload};
use keymenu_core::registry::Namespace;
use keymenu_core::{BackendError, BackendKind, BackendRegistry};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Output backend identified only by its description
struct Named(&'static str);

impl OutputBackend for Named {
    fn deliver(&self, _payload: &OutputPayload) -> OutputResult<()> {
        Ok(())
    }

    fn description(&self) -> &'static str {
        self.0
    }
}

// ========== Generators ==========

fn arb_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9_-]{0,11}", 1..10)
        .prop_map(|set: BTreeSet<String>| set.into_iter().collect())
}

// ========== Properties ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Names are listed in registration order and the first is the default
    #[test]
    fn prop_registration_order(names in arb_names()) {
        let mut registry = BackendRegistry::new();
        for name in &names {
            registry.register_output(name.as_str(), Arc::new(Named("first")), false).unwrap();
        }

        prop_assert_eq!(registry.names(BackendKind::Output), names.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(registry.default_name(BackendKind::Output), Some(names[0].as_str()));
        prop_assert!(registry.names(BackendKind::Query).is_empty());
    }

    /// Re-registering fails without overwrite and replaces in place with it
    #[test]
    fn prop_overwrite_keeps_position(names in arb_names(), pick in any::<prop::sample::Index>()) {
        let mut registry = BackendRegistry::new();
        for name in &names {
            registry.register_output(name.as_str(), Arc::new(Named("first")), false).unwrap();
        }
        let target = pick.get(&names).as_str();

        let err = registry
            .register_output(target, Arc::new(Named("second")), false)
            .unwrap_err();
        let is_duplicate = matches!(err, BackendError::Duplicate { .. });
        prop_assert!(is_duplicate);
        prop_assert_eq!(registry.output(target).unwrap().description(), "first");

        registry.register_output(target, Arc::new(Named("second")), true).unwrap();
        prop_assert_eq!(registry.output(target).unwrap().description(), "second");
        prop_assert_eq!(registry.names(BackendKind::Output), names.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Dotted paths resolve from the root
    #[test]
    fn prop_dotted_resolution(names in arb_names()) {
        let mut registry = BackendRegistry::new();
        for name in &names {
            registry.register_output(name.as_str(), Arc::new(Named("first")), false).unwrap();
        }
        for name in &names {
            let dotted = format!("output.{name}");
            prop_assert!(registry.output(&dotted).is_ok());
        }
    }

    /// Unknown names report what is available
    #[test]
    fn prop_unknown_lists_available(names in arb_names(), missing in "[A-Z]{3,8}") {
        let mut registry = BackendRegistry::new();
        for name in &names {
            registry.register_output(name.as_str(), Arc::new(Named("first")), false).unwrap();
        }

        match registry.output(&missing) {
            Err(BackendError::Unknown { available, .. }) => prop_assert_eq!(available, names),
            other => prop_assert!(false, "unexpected {:?}", other.map(|o| o.description())),
        }
    }

    /// A namespace renders as `name.{children}` in order
    #[test]
    fn prop_namespace_display(names in arb_names()) {
        let mut ns: Namespace<u32> = Namespace::new("tools");
        for (i, name) in names.iter().enumerate() {
            ns.register(name.as_str(), u32::try_from(i).unwrap(), false).unwrap();
        }
        prop_assert_eq!(ns.to_string(), format!("tools.{{{}}}", names.join(", ")));
    }
}
