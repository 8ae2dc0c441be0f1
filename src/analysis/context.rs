//! Code context extraction
//!
//! Recovers a bounded window of source text around a (source, sink) line
//! pair, plus the name of the nearest enclosing function. This is the
//! only analysis operation that touches the filesystem.

use crate::analysis::AnalysisError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

static DEF_LINE: OnceLock<Regex> = OnceLock::new();

fn def_line() -> &'static Regex {
    DEF_LINE.get_or_init(|| {
        Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap()
    })
}

/// A bounded window of source text. Immutable once produced.
///
/// Invariant: `start_line <= source_line` and `end_line >= sink_line`
/// whenever those lines fall inside the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeWindow {
    pub snippet: String,
    pub function_name: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
}

/// Extract a code window of `context_radius` lines around the
/// source/sink pair.
///
/// `source_line` is the lower anchor and `sink_line` the upper anchor;
/// a pair given out of document order is rejected with `InvalidRange`
/// rather than producing a degenerate window.
pub fn extract_context(
    file_path: &Path,
    source_line: u32,
    sink_line: u32,
    context_radius: u32,
) -> Result<CodeWindow, AnalysisError> {
    if source_line == 0 || sink_line == 0 || source_line > sink_line {
        return Err(AnalysisError::InvalidRange {
            source_line,
            sink_line,
        });
    }
    if !file_path.exists() {
        return Err(AnalysisError::NotFound {
            path: file_path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(file_path)?;
    let lines: Vec<&str> = content.lines().collect();

    let end = (lines.len()).min(sink_line.saturating_add(context_radius) as usize);
    let start = ((source_line - 1).saturating_sub(context_radius) as usize).min(end);

    let snippet = lines[start..end].join("\n");
    let function_name = enclosing_function(&lines, start);

    Ok(CodeWindow {
        snippet,
        function_name,
        start_line: (start + 1) as u32,
        end_line: end as u32,
    })
}

/// Scan backward from the window start for the nearest line that opens a
/// function definition.
fn enclosing_function(lines: &[&str], window_start: usize) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let from = window_start.min(lines.len() - 1);
    lines[..=from]
        .iter()
        .rev()
        .find_map(|line| def_line().captures(line))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write fixture");
        file
    }

    const SAMPLE: &str = "\
import sqlite3

def fetch_user(conn, request):
    user_id = request.args.get('id')
    query = \"SELECT * FROM users WHERE id = \" + user_id
    cursor = conn.cursor()
    cursor.execute(query)
    return cursor.fetchall()
";

    #[test]
    fn window_brackets_source_and_sink() {
        let file = write_fixture(SAMPLE);
        let window = extract_context(file.path(), 4, 7, 1).expect("extract");
        assert_eq!(window.start_line, 3);
        assert_eq!(window.end_line, 8);
        assert!(window.snippet.contains("user_id = request.args.get"));
        assert!(window.snippet.contains("cursor.execute(query)"));
    }

    #[test]
    fn window_clamps_to_file_bounds() {
        let file = write_fixture(SAMPLE);
        let window = extract_context(file.path(), 1, 8, 50).expect("extract");
        assert_eq!(window.start_line, 1);
        assert_eq!(window.end_line, 8);
    }

    #[test]
    fn recovers_enclosing_function() {
        let file = write_fixture(SAMPLE);
        let window = extract_context(file.path(), 5, 7, 1).expect("extract");
        assert_eq!(window.function_name.as_deref(), Some("fetch_user"));
    }

    #[test]
    fn recovers_async_function() {
        let file = write_fixture("async def handler(req):\n    x = req.body\n    run(x)\n");
        let window = extract_context(file.path(), 2, 3, 0).expect("extract");
        assert_eq!(window.function_name.as_deref(), Some("handler"));
    }

    #[test]
    fn no_function_outside_definitions() {
        let file = write_fixture("x = 1\ny = x + 1\nprint(y)\n");
        let window = extract_context(file.path(), 1, 3, 0).expect("extract");
        assert_eq!(window.function_name, None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = extract_context(Path::new("/nonexistent/app.py"), 1, 2, 5).unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { .. }));
    }

    #[test]
    fn inverted_lines_are_rejected() {
        let file = write_fixture(SAMPLE);
        let err = extract_context(file.path(), 7, 4, 5).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRange { .. }));
    }

    #[test]
    fn zero_lines_are_rejected() {
        let file = write_fixture(SAMPLE);
        let err = extract_context(file.path(), 0, 4, 5).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRange { .. }));
    }
}
