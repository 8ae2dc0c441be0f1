//! Library integration tests for the analysis engine
//!
//! These drive the public crate surface end-to-end over real temp files:
//! context extraction feeding the taint tracer and hazard matcher, the
//! way the agent tools and the offline commands compose them.

use std::io::Write;
use std::path::Path;
use taintriage::analysis::AnalysisError;
use taintriage::{detect_sanitizers, detect_sink, extract_context, trace_taint};

/// A small vulnerable-and-safe sample in the shape SAST tools report on.
const SAMPLE: &str = r#"import sqlite3
import subprocess

def get_user_data_unsafe(user_id):
    conn = sqlite3.connect("users.db")
    cursor = conn.cursor()
    query = "SELECT * FROM users WHERE id = " + user_id
    cursor.execute(query)
    return cursor.fetchall()

def get_user_data_safe(user_id):
    conn = sqlite3.connect("users.db")
    cursor = conn.cursor()
    query = "SELECT * FROM users WHERE id = ?"
    cursor.execute(query, (user_id,))
    return cursor.fetchall()

def health_check_unsafe(ip_address):
    command = f"ping -c 1 {ip_address}"
    subprocess.run(command, shell=True)
"#;

fn write_sample() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::with_suffix(".py").expect("create temp file");
    file.write_all(SAMPLE.as_bytes()).expect("write sample");
    file
}

/// Translate file lines to snippet-relative lines, as the commands do.
fn trace_in_file(
    path: &Path,
    source_line: u32,
    sink_line: u32,
    radius: u32,
) -> taintriage::analysis::FlowVerdict {
    let window = extract_context(path, source_line, sink_line, radius).expect("extract window");
    let rel_source = source_line - window.start_line + 1;
    let rel_sink = sink_line - window.start_line + 1;
    trace_taint(&window.snippet, rel_source, rel_sink).expect("trace")
}

#[test]
fn unsafe_query_flow_is_detected() {
    let file = write_sample();
    // user-controlled `query` (line 7) reaches cursor.execute (line 8)
    let verdict = trace_in_file(file.path(), 7, 8, 1);
    assert!(verdict.data_flow_detected);
    let chain = &verdict.matched_chains[0];
    assert_eq!(chain.candidate, "query");
    assert!(chain.tainted_by.contains("query"));
}

#[test]
fn unrelated_seed_reports_no_flow() {
    let file = write_sample();
    // Seed `conn = sqlite3.connect(...)` (line 12): it never reaches the
    // arguments of cursor.execute on line 15, so both sets are non-empty
    // but disjoint.
    let verdict = trace_in_file(file.path(), 12, 15, 2);
    assert!(!verdict.data_flow_detected);
    assert!(verdict.explanation.contains("No data flow"));
}

#[test]
fn window_function_names_are_recovered() {
    let file = write_sample();
    let window = extract_context(file.path(), 7, 8, 2).expect("extract");
    assert_eq!(window.function_name.as_deref(), Some("get_user_data_unsafe"));
    assert!(window.start_line <= 7);
    assert!(window.end_line >= 8);
}

#[test]
fn hazard_scenario_parameterized_query() {
    let file = write_sample();
    let window = extract_context(file.path(), 14, 15, 2).expect("extract");

    let sink = detect_sink(&window.snippet, "sql injection");
    assert!(sink.sink_detected);
    assert_eq!(sink.sink_type, "execute");

    let sanitizers = detect_sanitizers(&window.snippet, "sql injection");
    assert!(sanitizers.sufficient);
    assert!(sanitizers
        .sanitizers_found
        .contains(&"Parameterized Query (Placeholder)".to_string()));
}

#[test]
fn command_injection_flow_and_sink() {
    let file = write_sample();
    let verdict = trace_in_file(file.path(), 19, 20, 2);
    assert!(verdict.data_flow_detected);
    assert_eq!(verdict.matched_chains[0].candidate, "command");

    let window = extract_context(file.path(), 19, 20, 2).expect("extract");
    let sink = detect_sink(&window.snippet, "command injection");
    assert!(sink.sink_detected);
    // "subprocess" precedes "run" in the table.
    assert_eq!(sink.sink_type, "subprocess");
}

#[test]
fn trace_is_idempotent_over_files() {
    let file = write_sample();
    let first = trace_in_file(file.path(), 7, 8, 1);
    let second = trace_in_file(file.path(), 7, 8, 1);
    assert_eq!(first, second);
}

#[test]
fn dedented_window_from_function_body_still_parses() {
    let file = write_sample();
    // Radius 1 keeps the window strictly inside the function body, so
    // every line carries the function indentation.
    let window = extract_context(file.path(), 7, 8, 1).expect("extract");
    assert!(window.snippet.starts_with("    "));
    let verdict = trace_taint(&window.snippet, 7 - window.start_line + 1, 8 - window.start_line + 1)
        .expect("trace");
    assert!(verdict.data_flow_detected);
}

#[test]
fn malformed_snippet_is_a_parse_error_not_a_verdict() {
    let err = trace_taint("def broken(:\n    x = (1, 2\n", 1, 2).unwrap_err();
    assert!(matches!(err, AnalysisError::Parse { .. }));
}

#[test]
fn missing_file_is_not_found() {
    let err = extract_context(Path::new("/nonexistent/sample.py"), 1, 2, 5).unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { .. }));
}

#[test]
fn inverted_line_pair_is_rejected() {
    let file = write_sample();
    let err = extract_context(file.path(), 8, 7, 3).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidRange { .. }));
}
