// crates/autoroute-core/tests/proptest_coercion.rs
// ============================================================================
// Module: Coercion Property-Based Tests
// Description: Property tests for parameter extraction and coercion.
// Purpose: Detect panics and source-precedence violations across wide inputs.
// ============================================================================

//! Property-based tests for parameter coercion.

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

use autoroute_core::NormalizedRequest;
use autoroute_core::ParameterSpec;
use autoroute_core::RecordDecoders;
use autoroute_core::SemanticType;
use autoroute_core::runtime::extract_arguments;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

fn semantic_type_strategy() -> impl Strategy<Value = SemanticType> {
    let leaf = prop_oneof![
        Just(SemanticType::String),
        Just(SemanticType::Integer),
        Just(SemanticType::Float),
        Just(SemanticType::Boolean),
        Just(SemanticType::record("Anything")),
    ];
    leaf.prop_recursive(2, 4, 1, |inner| inner.prop_map(SemanticType::list))
}

proptest! {
    #[test]
    fn text_coercion_never_panics(raw in ".*", semantic_type in semantic_type_strategy()) {
        let params = vec![ParameterSpec::new("value", semantic_type)];
        let request = NormalizedRequest::new().with_query_param("value", raw);
        let _ = extract_arguments(&params, &request, &RecordDecoders::new());
    }

    #[test]
    fn integers_survive_query_transport(value in any::<i64>()) {
        let params = vec![ParameterSpec::new("value", SemanticType::Integer)];
        let request = NormalizedRequest::new().with_query_param("value", value.to_string());
        let args = extract_arguments(&params, &request, &RecordDecoders::new()).unwrap();
        prop_assert_eq!(args.integer("value").unwrap(), value);
    }

    #[test]
    fn comma_lists_preserve_order(values in prop::collection::vec(any::<i32>(), 1 .. 8)) {
        let params = vec![ParameterSpec::new("values", SemanticType::list(SemanticType::Integer))];
        let raw = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        let request = NormalizedRequest::new().with_query_param("values", raw);
        let args = extract_arguments(&params, &request, &RecordDecoders::new()).unwrap();
        prop_assert_eq!(args.get("values"), Some(&json!(values)));
    }

    #[test]
    fn query_takes_precedence_over_body(query in any::<i64>(), body in any::<i64>()) {
        let params = vec![ParameterSpec::new("value", SemanticType::Integer)];
        let mut map = Map::new();
        map.insert("value".to_string(), Value::from(body));
        let request = NormalizedRequest::new()
            .with_query_param("value", query.to_string())
            .with_body(map);
        let args = extract_arguments(&params, &request, &RecordDecoders::new()).unwrap();
        prop_assert_eq!(args.integer("value").unwrap(), query);
    }
}
