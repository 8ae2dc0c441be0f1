//! Text (terminal) reporter with colors and formatting

use crate::models::{Classification, Severity, VulnerabilityAnalysis};
use anyhow::Result;

/// Severity colors (ANSI escape codes)
fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m", // Red
        Severity::High => "\x1b[91m",     // Light red
        Severity::Medium => "\x1b[33m",   // Yellow
        Severity::Low => "\x1b[34m",      // Blue
    }
}

fn classification_color(classification: &Classification) -> &'static str {
    match classification {
        Classification::TruePositive => "\x1b[31m", // Red
        Classification::FalsePositive => "\x1b[32m", // Green
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Render results as formatted terminal output
pub fn render(results: &[VulnerabilityAnalysis]) -> Result<String> {
    let mut out = String::new();

    let true_positives = results
        .iter()
        .filter(|r| r.classification == Classification::TruePositive)
        .count();
    let false_positives = results.len() - true_positives;

    out.push_str(&format!("\n{BOLD}Taintriage Report{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Analyzed: {}  \x1b[31m{} confirmed{RESET}  \x1b[32m{} false positives{RESET}\n\n",
        results.len(),
        true_positives,
        false_positives
    ));

    for result in results {
        let sev_c = severity_color(&result.severity);
        let cls_c = classification_color(&result.classification);
        out.push_str(&format!(
            "{BOLD}{}{RESET}  {cls_c}{}{RESET}  {sev_c}{}{RESET}\n",
            result.id, result.classification, result.severity
        ));
        out.push_str(&format!(
            "  {DIM}{}::{} source:{} -> sink:{}{RESET}\n",
            result.trace.file,
            result.trace.function,
            result.trace.source_line,
            result.trace.sink_line
        ));
        if !result.trace.flow.is_empty() {
            out.push_str(&format!("  flow: {}\n", result.trace.flow.join(" -> ")));
        }
        for sanitizer in &result.sanitizers {
            let marker = if sanitizer.sufficient { "+" } else { "-" };
            out.push_str(&format!(
                "  sanitizer [{marker}] {} (line {})\n",
                sanitizer.name, sanitizer.line
            ));
        }
        out.push_str(&format!("  {}\n", result.justification));
        if let Some(counterexample) = &result.counterexample {
            out.push_str(&format!("  {DIM}counterexample: {counterexample}{RESET}\n"));
        }
        out.push('\n');
    }

    if results.is_empty() {
        out.push_str("No findings were triaged.\n");
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_results;

    #[test]
    fn text_render_summarizes_classifications() {
        let rendered = render(&test_results()).expect("render text");
        assert!(rendered.contains("1 confirmed"));
        assert!(rendered.contains("1 false positives"));
        assert!(rendered.contains("VULN-1"));
        assert!(rendered.contains("user_id -> query"));
        assert!(rendered.contains("Parameterized Query (Placeholder)"));
    }

    #[test]
    fn text_render_empty_results() {
        let rendered = render(&[]).expect("render text");
        assert!(rendered.contains("No findings were triaged."));
    }
}
