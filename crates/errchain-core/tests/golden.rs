//! Golden fixture integration tests for errchain-core.
//!
//! Each test loads a fixture JSON from `fixtures/records/`, reads its `record`
//! field back as a [`Serialized`] value, and checks depth, rendering and
//! lossless re-encoding against the fixture's expectations. The `produced_*`
//! tests build the same chains with the library and compare `to_object(false)`
//! against the fixture's `record`.

use errchain_core::{ChainedError, Code, Serialized};
use serde_json::json;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn fixture_path(name: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/records");
    p.push(name);
    p
}

fn load_fixture(name: &str) -> serde_json::Value {
    let content = std::fs::read_to_string(fixture_path(name)).expect("fixture not found");
    serde_json::from_str(&content).expect("invalid fixture JSON")
}

fn read_record(fixture: &serde_json::Value) -> Serialized {
    let text = fixture["record"].to_string();
    Serialized::from_json_str(&text).expect("record did not parse")
}

fn check_fixture(name: &str) -> Serialized {
    let f = load_fixture(name);
    let parsed = read_record(&f);

    let record = parsed.as_record().expect("top level must be a record");
    assert_eq!(
        record.depth() as u64,
        f["expectedDepth"].as_u64().unwrap(),
        "depth mismatch in {name}"
    );
    assert_eq!(
        parsed.to_string(),
        f["expectedRender"].as_str().unwrap(),
        "render mismatch in {name}"
    );
    assert_eq!(
        serde_json::to_value(&parsed).unwrap(),
        f["record"],
        "re-encoding is lossy in {name}"
    );
    parsed
}

fn assert_produces(name: &str, err: &ChainedError) {
    let f = load_fixture(name);
    assert_eq!(
        serde_json::to_value(err.to_object(false)).unwrap(),
        f["record"],
        "serializer output differs from {name}"
    );
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

#[test]
fn golden_three_deep_chain() {
    let parsed = check_fixture("three-deep-chain.json");
    let last = parsed.as_record().unwrap().chain().last().unwrap();
    assert!(last.cause.is_none());
}

#[test]
fn golden_process_killed() {
    let parsed = check_fixture("process-killed.json");
    let failure = parsed.as_record().unwrap().chain().nth(1).unwrap();
    assert_eq!(failure.signal.as_deref(), Some("SIGKILL"));
    assert_eq!(failure.code, None);
}

#[test]
fn golden_io_errno() {
    let parsed = check_fixture("io-errno.json");
    let io = parsed.as_record().unwrap().chain().nth(1).unwrap();
    assert_eq!(io.code, Some(Code::Number(2)));
}

#[test]
fn golden_foreign_cause_value() {
    let parsed = check_fixture("foreign-cause-value.json");
    let cause = parsed.as_record().unwrap().cause.as_deref().unwrap();
    assert!(!cause.is_record());
}

#[test]
fn golden_with_stacks_strip() {
    let parsed = check_fixture("with-stacks.json");
    assert!(format!("{parsed:#}").contains("app::flush"));

    let stripped = parsed.without_stack();
    let json = serde_json::to_value(&stripped).unwrap();
    assert!(json.get("stack").is_none());
    assert!(json["cause"].get("stack").is_none());
    assert_eq!(json["cause"]["code"], "ECONNRESET");
}

// ─── Serializer output ────────────────────────────────────────────────────────

#[test]
fn produced_three_deep_chain() {
    let err = ChainedError::with_cause(
        "request failed",
        ChainedError::with_cause("disk full", ChainedError::new("permission denied")),
    );
    assert_produces("three-deep-chain.json", &err);
}

#[test]
fn produced_foreign_cause_value() {
    let err = ChainedError::with_cause(
        "retry budget exhausted",
        json!({ "attempts": 5, "lastStatus": 503 }),
    );
    assert_produces("foreign-cause-value.json", &err);
}

#[cfg(target_os = "linux")]
#[test]
fn produced_io_errno() {
    let root = std::io::Error::from_raw_os_error(2);
    let err = ChainedError::with_cause(
        "could not open spool file",
        errchain_core::NativeError::new(root),
    );
    assert_produces("io-errno.json", &err);
}

#[cfg(unix)]
#[test]
fn produced_process_killed() {
    use errchain_core::ProcessFailure;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    let killed = ProcessFailure::new("worker", ExitStatus::from_raw(9));
    let err = ChainedError::with_cause("worker pool degraded", killed);
    assert_produces("process-killed.json", &err);
}
