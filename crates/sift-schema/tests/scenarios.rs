//! # End-to-End Parse Scenarios
//!
//! Full parses through the public surfaces. No test here installs a
//! process-wide locale, so unrendered messages are always the fallback.

use serde_json::json;
use sift_schema::{
    array, boolean, check, enum_of, int, literal, min_length, number, object, optional, record,
    recursive, refine, refine_async, strict_object, string, trim, tuple, union, with_default,
    ConfigurationError, CustomIssue, ExecutionError, IssueCode, IssueDetail, ParseError,
    ParseOptions, Schema,
};
use sift_core::{locales, ValueType, FALLBACK_MESSAGE};

fn codes(schema: &Schema, input: serde_json::Value) -> Vec<IssueCode> {
    schema
        .safe_parse(input)
        .unwrap()
        .issues()
        .iter()
        .map(|i| i.code())
        .collect()
}

// ─── Default Locale ──────────────────────────────────────────────────

#[test]
fn test_min_length_without_locale_renders_fallback() {
    let schema = string().min_length(5).unwrap();
    let result = schema.safe_parse(json!("ab")).unwrap();
    assert_eq!(result.issues().len(), 1);
    let issue = &result.issues()[0];
    assert_eq!(issue.code(), IssueCode::TooSmall);
    assert_eq!(issue.message(), FALLBACK_MESSAGE);
    assert_eq!(issue.message(), "Invalid input");
}

#[test]
fn test_custom_message_wins_over_fallback() {
    let schema = check(&string(), [min_length(5).with_message("at least five")]).unwrap();
    let result = schema.safe_parse(json!("ab")).unwrap();
    assert_eq!(result.issues()[0].message(), "at least five");
}

// ─── Unions ──────────────────────────────────────────────────────────

#[test]
fn test_union_failure_carries_every_member() {
    let schema = union([number(), string()]);
    let result = schema.safe_parse(json!(true)).unwrap();
    assert_eq!(result.issues().len(), 1);
    let issue = &result.issues()[0];
    assert_eq!(issue.code(), IssueCode::InvalidUnion);
    let branches = issue.union_errors();
    assert_eq!(branches.len(), 2);
    for branch in branches {
        assert_eq!(branch.len(), 1);
        assert_eq!(branch[0].code(), IssueCode::InvalidType);
        assert_eq!(branch[0].message(), FALLBACK_MESSAGE);
    }
    assert_eq!(
        branches[0][0].detail,
        IssueDetail::InvalidType {
            expected: ValueType::Number,
            received: ValueType::Boolean,
        }
    );
}

#[test]
fn test_union_member_issues_do_not_leak_on_success() {
    let schema = union([string().min_length(3).unwrap(), number()]);
    let result = schema.safe_parse(json!(4)).unwrap();
    assert!(result.is_success());
}

// ─── Objects ─────────────────────────────────────────────────────────

#[test]
fn test_object_aggregates_every_field() {
    let schema = object([("a", string()), ("b", number())]);
    let result = schema.safe_parse(json!({"a": 1, "b": "x"})).unwrap();
    let issues = result.issues();
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.code() == IssueCode::InvalidType));
    assert_eq!(issues[0].path.to_string(), "a");
    assert_eq!(issues[1].path.to_string(), "b");
}

#[test]
fn test_issues_follow_declaration_order_depth_first() {
    let schema = object([
        ("z", object([("inner", number()), ("other", boolean())])),
        ("a", array(string())),
    ]);
    let input = json!({"a": [1, "ok", 2], "z": {"other": "no", "inner": "no"}});
    let result = schema.safe_parse(input).unwrap();
    let paths: Vec<String> = result.issues().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["z.inner", "z.other", "a[0]", "a[2]"]);
}

#[test]
fn test_kind_mismatch_skips_only_that_subtree() {
    let schema = object([
        ("nested", object([("deep", string())])),
        ("sibling", int()),
    ]);
    let result = schema
        .safe_parse(json!({"nested": "flat", "sibling": 1.5}))
        .unwrap();
    let paths: Vec<String> = result.issues().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["nested", "sibling"]);
}

#[test]
fn test_strict_object_reports_unknown_keys_after_fields() {
    let schema = strict_object([("a", string())]);
    assert_eq!(
        codes(&schema, json!({"a": 1, "x": 1, "y": 2})),
        vec![IssueCode::InvalidType, IssueCode::UnrecognizedKeys]
    );
}

#[test]
fn test_optional_and_default_fields() {
    let schema = object([
        ("nick", optional(string())),
        ("role", with_default(enum_of(["admin", "user"]), "user")),
    ]);
    let value = schema.parse(json!({})).unwrap();
    assert_eq!(value, json!({"role": "user"}));
}

#[test]
fn test_enum_and_literal_mismatches_are_invalid_value() {
    assert_eq!(
        codes(&enum_of(["a", "b"]), json!("c")),
        vec![IssueCode::InvalidValue]
    );
    assert_eq!(codes(&literal(3), json!(4)), vec![IssueCode::InvalidValue]);
}

#[test]
fn test_record_and_tuple_paths() {
    let scores = record(int());
    let result = scores.safe_parse(json!({"ann": 1, "bob": "two"})).unwrap();
    assert_eq!(result.issues()[0].path.to_string(), "bob");

    let pair = tuple([string(), number()]);
    let result = pair.safe_parse(json!(["x"])).unwrap();
    assert_eq!(result.issues()[0].path.to_string(), "[1]");
}

// ─── Checks & Transforms ─────────────────────────────────────────────

#[test]
fn test_checks_run_before_descent_and_rewrite_the_value() {
    let schema = string().trim().and_then(|s| s.to_upper_case()).unwrap();
    assert_eq!(schema.parse(json!("  ab ")).unwrap(), json!("AB"));
}

#[test]
fn test_refinement_path_and_params() {
    let form = object([("password", string()), ("confirm", string())])
        .check(
            refine(|v| v["password"] == v["confirm"])
                .message("passwords differ")
                .at(["confirm"])
                .params(json!({"rule": "match"})),
        )
        .unwrap();
    let result = form
        .safe_parse(json!({"password": "a", "confirm": "b"}))
        .unwrap();
    let issue = &result.issues()[0];
    assert_eq!(issue.path.to_string(), "confirm");
    assert_eq!(issue.message(), "passwords differ");
    assert_eq!(
        issue.detail,
        IssueDetail::Custom {
            params: Some(json!({"rule": "match"}))
        }
    );
}

#[test]
fn test_transform_runs_only_on_success() {
    let length = string().transform(|v| json!(v.as_str().map(str::len).unwrap_or(0)));
    assert_eq!(length.parse(json!("abcd")).unwrap(), json!(4));
    assert!(length.parse(json!(4)).is_err());
}

#[test]
fn test_pipe_feeds_output_into_second_stage() {
    let schema = string()
        .trim()
        .unwrap()
        .pipe(string().min_length(2).unwrap());
    assert!(schema.parse(json!(" a ")).is_err());
    assert_eq!(schema.parse(json!(" ab ")).unwrap(), json!("ab"));
}

#[test]
fn test_custom_checks_report_multiple_issues() {
    let schema = array(number())
        .custom(|value, ctx| {
            if let Some(items) = value.as_array() {
                for (i, item) in items.iter().enumerate() {
                    if item.as_f64().is_some_and(|n| n < 0.0) {
                        ctx.add_issue(CustomIssue::custom("negative").at([i]));
                    }
                }
            }
        })
        .unwrap();
    let result = schema.safe_parse(json!([1, -1, 2, -3])).unwrap();
    let paths: Vec<String> = result.issues().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["[1]", "[3]"]);
}

#[test]
fn test_property_check_validates_nested_key() {
    let schema = record(string())
        .property("id", string().uuid().unwrap())
        .unwrap();
    let result = schema.safe_parse(json!({"id": "nope"})).unwrap();
    assert_eq!(result.issues()[0].path.to_string(), "id");
    assert_eq!(result.issues()[0].code(), IssueCode::InvalidFormat);
}

#[test]
fn test_aborting_custom_check_skips_children() {
    let schema = object([("a", string())])
        .custom(|_, ctx| {
            ctx.add_issue(CustomIssue::custom("object rejected"));
            ctx.abort();
        })
        .unwrap();
    let result = schema.safe_parse(json!({"a": 1})).unwrap();
    assert_eq!(result.issues().len(), 1);
    assert_eq!(result.issues()[0].code(), IssueCode::Custom);
    assert_eq!(result.issues()[0].message(), "object rejected");
}

// ─── Configuration Errors ────────────────────────────────────────────

#[test]
fn test_async_refinement_under_sync_parse_is_a_configuration_error() {
    let schema = string()
        .check(refine_async(|_| async { true }))
        .unwrap();
    let err = schema.safe_parse(json!("x")).unwrap_err();
    match err {
        ExecutionError::Configuration(ref config) => {
            assert_eq!(config.code(), IssueCode::InvalidConfiguration);
            assert!(matches!(
                config,
                ConfigurationError::AsyncCheckInSyncParse { check, .. } if check == "refine"
            ));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
    let err = schema.parse(json!("x")).unwrap_err();
    assert!(matches!(err, ParseError::Execution(_)));
    assert!(err.is_configuration());
}

#[test]
fn test_async_check_in_unreached_union_member_allows_sync_parse() {
    let schema = union([number(), string().check(refine_async(|_| async { true })).unwrap()]);
    assert!(schema.contains_async_checks());
    assert!(schema.safe_parse(json!(5)).unwrap().is_success());
    assert!(schema.safe_parse(json!("x")).is_err());
}

#[test]
fn test_left_recursive_schema_is_rejected() {
    let schema = recursive(|this| union([this, string()]));
    let err = schema.safe_parse(json!("x")).unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Configuration(ConfigurationError::InvalidDefinition(_))
    ));
}

#[test]
fn test_incompatible_check_is_rejected_at_construction() {
    let err = boolean().min_length(1).unwrap_err();
    assert!(matches!(err, ConfigurationError::IncompatibleCheck { .. }));
}

#[test]
fn test_brand_does_not_change_results() {
    let base = check(&string(), [trim(), min_length(2)]).unwrap();
    let branded = base.brand("Username");
    for input in [json!("a"), json!(" ab "), json!(3)] {
        assert_eq!(
            base.safe_parse(input.clone()).unwrap(),
            branded.safe_parse(input).unwrap()
        );
    }
}

// ─── Options ─────────────────────────────────────────────────────────

#[test]
fn test_explicit_locale_and_report_input() {
    let options = ParseOptions::new()
        .with_locale(locales::en())
        .with_report_input(true);
    let schema = object([("age", int().gte(18.0).unwrap())]);
    let result = schema
        .safe_parse_with(json!({"age": 12}), &options)
        .unwrap();
    let issue = &result.issues()[0];
    assert_eq!(issue.message(), "Too small: expected number to be >=18");
    assert_eq!(issue.input, Some(json!(12)));
}

#[test]
fn test_validation_error_reports() {
    let schema = object([("a", string()), ("b", number())]);
    let options = ParseOptions::new().with_locale(locales::en());
    let err = match schema.parse_with(json!({"a": 1}), &options) {
        Err(ParseError::Validation(err)) => err,
        other => panic!("expected validation failure, got {other:?}"),
    };
    let flat = err.flatten();
    assert_eq!(flat.field_errors.len(), 2);
    assert!(err.prettify().contains("→ at b"));
}
