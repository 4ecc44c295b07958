//! # Asynchronous Parsing
//!
//! Async entry points: suspension at async checks, ordering, agreement with
//! the synchronous path, timeouts and caller cancellation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use sift_schema::{
    array, custom_async, number, object, string, CheckReport, CustomIssue, ExecutionError,
    IssueCode, ParseOptions, Schema,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn slow_positive(delay: Duration) -> Schema {
    number()
        .refine_async(move |v| async move {
            tokio::time::sleep(delay).await;
            v.as_f64().is_some_and(|n| n > 0.0)
        })
        .unwrap()
}

#[tokio::test]
async fn test_async_refinement_suspends_and_reports() {
    init_tracing();
    let schema = slow_positive(Duration::from_millis(1));
    let ok = schema.safe_parse_async(json!(3)).await.unwrap();
    assert!(ok.is_success());
    let bad = schema.safe_parse_async(json!(-3)).await.unwrap();
    assert_eq!(bad.issues()[0].code(), IssueCode::Custom);
}

#[tokio::test(start_paused = true)]
async fn test_siblings_run_sequentially_in_declaration_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let field = |name: &'static str, delay: u64| {
        let order = order.clone();
        string()
            .refine_async(move |_| {
                let order = order.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    order.lock().push(name);
                    false
                }
            })
            .unwrap()
    };
    // The slower field is declared first and still finishes first.
    let schema = object([("first", field("first", 50)), ("second", field("second", 1))]);
    let result = schema
        .safe_parse_async(json!({"first": "a", "second": "b"}))
        .await
        .unwrap();
    assert_eq!(*order.lock(), vec!["first", "second"]);
    let paths: Vec<String> = result.issues().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["first", "second"]);
}

#[tokio::test]
async fn test_sync_and_async_agree_without_async_checks() {
    let schema = object([
        ("name", string().trim().and_then(|s| s.min_length(2)).unwrap()),
        ("tags", array(string().max_length(3).unwrap())),
    ]);
    for input in [
        json!({"name": " bo ", "tags": ["a", "bcd"]}),
        json!({"name": "b", "tags": ["toolong", 1]}),
        json!("not an object"),
    ] {
        let sync = schema.safe_parse(input.clone()).unwrap();
        let asynchronous = schema.safe_parse_async(input).await.unwrap();
        assert_eq!(sync, asynchronous);
    }
}

#[tokio::test]
async fn test_async_custom_check_can_abort() {
    let schema = number()
        .check(custom_async(|_| async {
            CheckReport::ok()
                .issue(CustomIssue::custom("rejected upstream"))
                .aborting()
        }))
        .and_then(|s| s.gt(100.0))
        .unwrap();
    let result = schema.safe_parse_async(json!(1)).await.unwrap();
    assert_eq!(result.issues().len(), 1);
    assert_eq!(result.issues()[0].message(), "rejected upstream");
}

#[tokio::test]
async fn test_parse_async_raises_validation_failure() {
    let schema = slow_positive(Duration::from_millis(1));
    let err = schema.parse_async(json!(-1)).await.unwrap_err();
    assert_eq!(err.issues().map(|i| i.len()), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_resolves_to_timed_out() {
    let schema = slow_positive(Duration::from_secs(60));
    let options = ParseOptions::new().with_timeout(Duration::from_secs(1));
    let err = schema
        .safe_parse_async_with(json!(1), &options)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ExecutionError::TimedOut {
            after: Duration::from_secs(1)
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_timeout_longer_than_parse_is_harmless() {
    let schema = slow_positive(Duration::from_millis(10));
    let options = ParseOptions::new().with_timeout(Duration::from_secs(5));
    let result = schema.safe_parse_async_with(json!(1), &options).await.unwrap();
    assert!(result.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_resolves_to_cancelled() {
    let schema = slow_positive(Duration::from_secs(60));
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let cancel = async move {
        let _ = rx.await;
    };
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let _ = tx.send(());
    });
    let err = schema
        .safe_parse_async_cancellable(json!(1), &ParseOptions::default(), cancel)
        .await
        .unwrap_err();
    assert_eq!(err, ExecutionError::Cancelled);
}

#[tokio::test]
async fn test_cancel_future_that_never_fires_lets_parse_finish() {
    let schema = slow_positive(Duration::from_millis(1));
    let result = schema
        .safe_parse_async_cancellable(json!(2), &ParseOptions::default(), std::future::pending())
        .await
        .unwrap();
    assert!(result.is_success());
}

#[tokio::test]
async fn test_schemas_are_shared_across_tasks() {
    let schema = Arc::new(slow_positive(Duration::from_millis(1)));
    let mut handles = Vec::new();
    for n in [-2, -1, 1, 2] {
        let schema = schema.clone();
        handles.push(tokio::spawn(async move {
            schema.safe_parse_async(json!(n)).await.map(|r| r.is_success())
        }));
    }
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(outcomes, vec![false, false, true, true]);
}
