//! Prompt builders for the triage agent
//!
//! The system prompt embeds the JSON schema the model must emit so the
//! second round can be validated mechanically.

use crate::models::VulnerabilityReport;
use serde_json::json;
use std::path::Path;

/// JSON schema of the final verdict the model must produce.
fn verdict_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "description": "Unique identifier of the finding"},
            "classification": {
                "type": "string",
                "enum": ["True Positive", "False Positive"],
                "description": "Final classification of the finding"
            },
            "severity": {
                "type": "string",
                "enum": ["Low", "Medium", "High", "Critical"],
                "description": "Severity assigned by impact"
            },
            "trace": {
                "type": "object",
                "properties": {
                    "file": {"type": "string"},
                    "function": {"type": "string"},
                    "source_line": {"type": "integer"},
                    "sink_line": {"type": "integer"},
                    "flow": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Variables or intermediate steps from source to sink"
                    }
                },
                "required": ["file", "function", "source_line", "sink_line", "flow"]
            },
            "sanitizers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "line": {"type": "integer"},
                        "sufficient": {"type": "boolean"},
                        "explanation": {"type": "string"}
                    },
                    "required": ["name", "line", "sufficient", "explanation"]
                }
            },
            "assumptions": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Explicit assumptions made during the analysis"
            },
            "justification": {"type": "string", "description": "Detailed explanation of the decision"},
            "counterexample": {
                "type": ["string", "null"],
                "description": "Minimal counterexample demonstrating non-exploitability for a False Positive"
            }
        },
        "required": ["id", "classification", "severity", "trace", "assumptions", "justification"]
    })
}

/// System prompt: role, tool discipline, and the output schema.
pub fn system_prompt() -> String {
    let schema = serde_json::to_string_pretty(&verdict_schema())
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are an expert Security Validation Agent, specialized in OWASP Top 10 vulnerabilities (SQLi, SSRF, Command Injection, etc.).
Your goal is to validate static analysis findings (SAST) by analyzing code, tracing data flow, and checking for sinks and sanitizers.

You must use the provided tools to gather evidence. Do not guess.
1. ALWAYS start by reading the code context around the source and sink.
2. Check for data flow from source to sink.
3. Check for specific sinks and sanitizers.

Your final output MUST be a JSON object strictly adhering to the following schema:
{schema}

If the vulnerability is a True Positive, you must provide a proof of concept trace.
If it is a False Positive, you must explain why (e.g., sanitizer found, broken flow) and provide a counterexample if possible."#
    )
}

/// User prompt carrying one finding's details.
pub fn user_prompt(finding: &VulnerabilityReport, source_file: &Path) -> String {
    format!(
        "Analyze this vulnerability:\n\
         ID: {}\n\
         Type: {}\n\
         Message: {}\n\
         File: {}\n\
         Source Line: {}\n\
         Sink Line: {}\n",
        finding.id_or_default(),
        finding.vulnerability_type,
        finding.message,
        source_file.display(),
        finding.source_line,
        finding.sink_line,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_embeds_the_schema() {
        let prompt = system_prompt();
        assert!(prompt.contains("\"classification\""));
        assert!(prompt.contains("True Positive"));
        assert!(prompt.contains("provided tools"));
    }

    #[test]
    fn user_prompt_carries_finding_details() {
        let finding = VulnerabilityReport {
            id: Some("VULN-7".to_string()),
            vulnerability_type: "SQL Injection".to_string(),
            message: "user input reaches query".to_string(),
            source_line: 12,
            sink_line: 19,
        };
        let prompt = user_prompt(&finding, Path::new("app/db.py"));
        assert!(prompt.contains("ID: VULN-7"));
        assert!(prompt.contains("Type: SQL Injection"));
        assert!(prompt.contains("Source Line: 12"));
        assert!(prompt.contains("Sink Line: 19"));
        assert!(prompt.contains("app/db.py"));
    }
}
