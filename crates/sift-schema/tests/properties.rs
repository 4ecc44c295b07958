//! # Property Tests
//!
//! Invariants that must hold for arbitrary inputs: parse/safe_parse
//! agreement, sync/async agreement, brand transparency, rewrite idempotence
//! and declaration-order issue paths.

use futures::FutureExt;
use proptest::prelude::*;
use serde_json::{json, Value};
use sift_schema::{
    array, boolean, normalize, number, object, optional, string, to_lower_case, trim, union,
    NormalizationForm, Schema,
};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        (-1.0e6..1.0e6f64).prop_map(|f| json!(f)),
        "\\PC{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]{1,2}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn sample_schema() -> Schema {
    object([
        ("a", string().trim().and_then(|s| s.min_length(1)).unwrap()),
        ("b", optional(union([number().gte(0.0).unwrap(), boolean()]))),
        ("c", optional(array(string().max_length(3).unwrap()))),
    ])
}

fn rewritten(schema: &Schema, input: &str) -> Value {
    schema.parse(json!(input)).expect("rewrites cannot fail")
}

proptest! {
    #[test]
    fn parse_and_safe_parse_agree(input in arb_json()) {
        let schema = sample_schema();
        let safe = schema.safe_parse(input.clone()).unwrap();
        match schema.parse(input) {
            Ok(value) => prop_assert_eq!(safe.value(), Some(&value)),
            Err(err) => {
                prop_assert!(!safe.is_success());
                prop_assert_eq!(err.issues(), Some(safe.issues()));
            }
        }
    }

    #[test]
    fn sync_and_async_agree(input in arb_json()) {
        let schema = sample_schema();
        let sync = schema.safe_parse(input.clone()).unwrap();
        let asynchronous = schema
            .safe_parse_async(input)
            .now_or_never()
            .expect("no async checks, so the parse completes immediately")
            .unwrap();
        prop_assert_eq!(sync, asynchronous);
    }

    #[test]
    fn brand_is_transparent(input in arb_json()) {
        let schema = sample_schema();
        let branded = schema.brand("Sample");
        prop_assert_eq!(
            schema.safe_parse(input.clone()).unwrap(),
            branded.safe_parse(input).unwrap()
        );
    }

    #[test]
    fn string_rewrites_are_idempotent(s in "\\PC{0,24}") {
        for entry in [
            trim(),
            to_lower_case(),
            normalize(NormalizationForm::Nfc),
            normalize(NormalizationForm::Nfkd),
        ] {
            let schema = string().check(entry).unwrap();
            let once = rewritten(&schema, &s);
            let Value::String(once_str) = &once else {
                panic!("rewrite produced a non-string");
            };
            prop_assert_eq!(rewritten(&schema, once_str), once.clone());
        }
    }

    #[test]
    fn issue_paths_follow_field_declaration(bad in prop::collection::vec(any::<bool>(), 5)) {
        let names = ["e", "d", "c", "b", "a"];
        let schema = object(names.iter().map(|n| (*n, number())));
        let input: serde_json::Map<String, Value> = names
            .iter()
            .zip(&bad)
            .map(|(n, b)| (n.to_string(), if *b { json!("x") } else { json!(1) }))
            .collect();
        let result = schema.safe_parse(Value::Object(input)).unwrap();
        let expected: Vec<String> = names
            .iter()
            .zip(&bad)
            .filter(|(_, b)| **b)
            .map(|(n, _)| n.to_string())
            .collect();
        let actual: Vec<String> = result.issues().iter().map(|i| i.path.to_string()).collect();
        prop_assert_eq!(actual, expected);
    }
}
