//! HTML reporter with embedded styles
//!
//! Generates a standalone HTML report that can be viewed in any browser:
//! a summary header plus one card per triaged finding with its
//! classification, trace, sanitizers, and assumptions.

use crate::models::{Classification, VulnerabilityAnalysis};
use anyhow::Result;
use chrono::Local;

const CSS: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif; margin: 0; background: #f6f7f9; color: #24292f; }
.container { max-width: 900px; margin: auto; padding: 24px; }
.header { background: #1f2328; color: #fff; padding: 24px; border-radius: 8px; }
.header h1 { margin: 0 0 4px 0; font-size: 1.5em; }
.timestamp { color: #9da7b1; margin: 0; }
.summary { margin: 16px 0; color: #57606a; }
.card { background: #fff; border: 1px solid #d0d7de; border-radius: 8px; margin: 16px 0; padding: 20px; }
.card h2 { margin: 0 0 8px 0; font-size: 1.1em; }
.lines { font-size: 0.75em; color: #57606a; font-weight: normal; }
.badge { display: inline-block; padding: 2px 10px; border-radius: 12px; font-size: 0.85em; font-weight: 600; }
.badge.true-positive { background: #ffebe9; color: #cf222e; }
.badge.false-positive { background: #dafbe1; color: #116329; }
.critical { color: #cf222e; font-weight: bold; }
.high { color: #bc4c00; font-weight: bold; }
.medium { color: #9a6700; font-weight: bold; }
.low { color: #116329; font-weight: bold; }
.section h3 { margin: 16px 0 4px 0; font-size: 0.95em; color: #424a53; }
.section p, .section li { font-size: 0.9em; line-height: 1.5; }
code { background: #f6f8fa; padding: 1px 5px; border-radius: 4px; font-size: 0.85em; }
"#;

/// Render results as standalone HTML
pub fn render(results: &[VulnerabilityAnalysis]) -> Result<String> {
    let mut html = String::new();

    html.push_str(&render_head());
    html.push_str("<body>\n<div class=\"container\">\n");
    html.push_str(&render_header(results.len()));

    for result in results {
        html.push_str(&render_card(result));
    }

    html.push_str("</div>\n</body>\n</html>\n");
    Ok(html)
}

fn render_head() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Taintriage Report</title>
    <style>{CSS}</style>
</head>
"#
    )
}

fn render_header(total: usize) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!(
        r#"<div class="header">
    <h1>Vulnerability Triage Report</h1>
    <p class="timestamp">Generated {timestamp}</p>
</div>
<p class="summary">Total analyzed: {total}</p>
"#
    )
}

fn render_card(result: &VulnerabilityAnalysis) -> String {
    let badge_class = match result.classification {
        Classification::TruePositive => "true-positive",
        Classification::FalsePositive => "false-positive",
    };
    let severity_class = result.severity.to_string();

    let flow = if result.trace.flow.is_empty() {
        "<li>No intermediate flow recorded</li>".to_string()
    } else {
        format!("<li><strong>Flow:</strong> {}</li>", escape(&result.trace.flow.join(", ")))
    };

    let sanitizers = if result.sanitizers.is_empty() {
        "<li>None detected</li>".to_string()
    } else {
        result
            .sanitizers
            .iter()
            .map(|s| format!("<li>{} (line {})</li>", escape(&s.name), s.line))
            .collect::<Vec<_>>()
            .join("\n                ")
    };

    let assumptions = result
        .assumptions
        .iter()
        .map(|a| format!("<li>{}</li>", escape(a)))
        .collect::<Vec<_>>()
        .join("\n                ");

    let counterexample = result
        .counterexample
        .as_ref()
        .map(|c| format!("<h3>Counterexample</h3>\n        <p><code>{}</code></p>", escape(c)))
        .unwrap_or_default();

    format!(
        r#"<div class="card">
    <h2>{id} <span class="lines">{file}::{function} source:{source} -&gt; sink:{sink}</span></h2>
    <p>
        <span class="badge {badge_class}">{classification}</span>
        <strong>Severity:</strong> <span class="{severity_class}">{severity}</span>
    </p>
    <div class="section">
        <h3>Justification</h3>
        <p>{justification}</p>
        <h3>Trace</h3>
        <ul>
            {flow}
        </ul>
        <h3>Sanitizers</h3>
        <ul>
            {sanitizers}
        </ul>
        {counterexample}
        <h3>Assumptions</h3>
        <ul>
            {assumptions}
        </ul>
    </div>
</div>
"#,
        id = escape(&result.id),
        file = escape(&result.trace.file),
        function = escape(&result.trace.function),
        source = result.trace.source_line,
        sink = result.trace.sink_line,
        classification = result.classification,
        severity = result.severity,
        justification = escape(&result.justification),
    )
}

/// Minimal HTML escaping for text interpolated into the report
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_results;

    #[test]
    fn html_render_contains_cards_and_badges() {
        let rendered = render(&test_results()).expect("render HTML");
        assert!(rendered.starts_with("<!DOCTYPE html>"));
        assert!(rendered.contains("Total analyzed: 2"));
        assert!(rendered.contains("badge true-positive"));
        assert!(rendered.contains("badge false-positive"));
        assert!(rendered.contains("VULN-1"));
        assert!(rendered.contains("Parameterized Query (Placeholder)"));
    }

    #[test]
    fn html_escapes_untrusted_text() {
        let mut results = test_results();
        results[0].justification = "query = \"<script>\" + x".to_string();
        let rendered = render(&results).expect("render HTML");
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }

    #[test]
    fn html_render_empty_results() {
        let rendered = render(&[]).expect("render HTML");
        assert!(rendered.contains("Total analyzed: 0"));
    }
}
