//! Review sessions driven through [`Engine`], including branches,
//! revisions and caller-keyed isolation.

use devkit::engine::Engine;
use devkit::test_support::{ScriptedChangeSource, review_args};
use serde_json::{Value, json};

fn engine() -> Engine {
    Engine::new(ScriptedChangeSource::new(vec![]))
}

fn summary_json(engine: &Engine, args: &Value) -> Value {
    let summary = engine.review_step(args).expect("review step");
    serde_json::from_str(&summary.to_json().expect("json")).expect("parse")
}

#[test]
fn linear_review_reports_progress() {
    let engine = engine();
    summary_json(&engine, &review_args("read the handler", 1, 3, true));
    summary_json(&engine, &review_args("error path swallows io errors", 2, 3, true));
    let last = summary_json(&engine, &review_args("recommend propagating", 3, 3, false));

    assert_eq!(
        last,
        json!({
            "thoughtNumber": 3,
            "totalThoughts": 3,
            "nextThoughtNeeded": false,
            "branches": [],
            "thoughtHistoryLength": 3,
        })
    );
}

#[test]
fn branches_are_listed_in_order_without_growing_history() {
    let engine = engine();
    summary_json(&engine, &review_args("baseline", 1, 3, true));
    for id in ["zeta", "alpha"] {
        let mut args = review_args("alternative", 2, 3, true);
        args["branchFromThought"] = json!(1);
        args["branchId"] = json!(id);
        summary_json(&engine, &args);
    }
    let last = summary_json(&engine, &review_args("merge findings", 2, 3, false));

    assert_eq!(last["branches"], json!(["alpha", "zeta"]));
    assert_eq!(last["thoughtHistoryLength"], json!(2));
}

#[test]
fn revision_counts_as_a_history_entry() {
    let engine = engine();
    summary_json(&engine, &review_args("first take", 1, 2, true));
    let mut revision = review_args("first take was wrong", 1, 2, true);
    revision["isRevision"] = json!(true);
    revision["revisesThought"] = json!(1);
    let summary = summary_json(&engine, &revision);

    assert_eq!(summary["thoughtNumber"], json!(1));
    assert_eq!(summary["thoughtHistoryLength"], json!(2));
}

#[test]
fn total_reflects_largest_step_seen() {
    let engine = engine();
    summary_json(&engine, &review_args("start", 1, 2, true));
    summary_json(&engine, &review_args("more than expected", 4, 2, true));
    let later = summary_json(&engine, &review_args("scaled back", 5, 1, false));
    assert_eq!(later["totalThoughts"], json!(5));
}

#[test]
fn sessions_do_not_share_history() {
    let engine = engine();
    let mut a = review_args("a", 1, 2, true);
    a["sessionId"] = json!("pr-1");
    let mut b = review_args("b", 1, 2, true);
    b["sessionId"] = json!("pr-2");

    summary_json(&engine, &a);
    summary_json(&engine, &a);
    let other = summary_json(&engine, &b);

    assert_eq!(other["thoughtHistoryLength"], json!(1));
    assert!(engine.reviews().reset("pr-1"));
    let fresh = summary_json(&engine, &a);
    assert_eq!(fresh["thoughtHistoryLength"], json!(1));
}

#[test]
fn concurrent_callers_on_one_session_lose_no_steps() {
    let engine = std::sync::Arc::new(engine());
    let handles: Vec<_> = (0..4u32)
        .map(|worker| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || {
                for step in 1..=25 {
                    let args = review_args(&format!("worker {worker}"), step, 25, true);
                    engine.review_step(&args).expect("review step");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("join");
    }
    let len = engine
        .reviews()
        .with_session("default", |s| s.store().history_len());
    assert_eq!(len, 100);
}
