// crates/autoroute-core/tests/proptest_paths.rs
// ============================================================================
// Module: Route Path Property-Based Tests
// Description: Property tests for route path building and template matching.
// Purpose: Check id placeholder invariants across generated names and overrides.
// ============================================================================

//! Property-based tests for route path invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;

use autoroute_core::ActionDescriptor;
use autoroute_core::HttpMethod;
use autoroute_core::ID_PLACEHOLDER;
use autoroute_core::MethodName;
use autoroute_core::RouteName;
use autoroute_core::RouteTemplate;
use autoroute_core::TypeName;
use autoroute_core::build_path;
use proptest::prelude::*;

fn descriptor(method: &str, instance: bool, path: Option<String>) -> ActionDescriptor {
    let mut descriptor =
        ActionDescriptor::new(TypeName::new("Widget"), MethodName::new(method), HttpMethod::Post);
    descriptor.is_instance_action = instance;
    descriptor.path_override = path;
    descriptor
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn override_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        segment().prop_map(|single| Some(format!("/{single}"))),
        prop::collection::vec(segment(), 2 .. 4)
            .prop_map(|parts| Some(format!("/{}", parts.join("/")))),
    ]
}

proptest! {
    #[test]
    fn instance_paths_have_one_id_unless_multi_segment(
        owner in segment(),
        method in segment(),
        path in override_strategy(),
    ) {
        let multi = path.as_deref().is_some_and(|raw| raw.trim_matches('/').contains('/'));
        let route_name = RouteName::new(owner.clone());
        let built = build_path(&route_name, &descriptor(&method, true, path)).unwrap();
        let ids = built.matches(ID_PLACEHOLDER).count();
        if multi {
            prop_assert_eq!(ids, 0);
        } else {
            prop_assert_eq!(ids, 1);
        }
        let owner_prefix = format!("/{owner}/");
        prop_assert!(built.starts_with(&owner_prefix));
    }

    #[test]
    fn type_level_paths_never_have_id(
        owner in segment(),
        method in segment(),
        path in override_strategy(),
    ) {
        let built = build_path(&RouteName::new(owner), &descriptor(&method, false, path)).unwrap();
        prop_assert!(!built.contains(ID_PLACEHOLDER));
    }

    #[test]
    fn rendered_paths_match_their_template(
        owner in segment(),
        method in segment(),
        id in "[^/]{1,16}",
    ) {
        let built = build_path(&RouteName::new(owner), &descriptor(&method, true, None)).unwrap();
        let template = RouteTemplate::parse(&built);
        let mut params = BTreeMap::new();
        params.insert("id".to_string(), id.clone());
        let rendered = template.render(&params).unwrap();
        let matched = template.match_path(&rendered).unwrap();
        prop_assert_eq!(matched.get("id"), Some(&id));
    }
}
