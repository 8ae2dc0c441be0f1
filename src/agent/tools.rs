//! Tool registry for the triage agent
//!
//! Maps the agent-facing tool names onto the analysis operations, with
//! typed argument decoding. Execution problems come back as error
//! *strings*, not failures: the conversation continues and the model
//! sees what went wrong.

use crate::analysis::{extract_context, HazardMatcher, TaintTracer};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

fn default_radius() -> u32 {
    5
}

#[derive(Debug, Deserialize)]
struct CodeContextArgs {
    file_path: PathBuf,
    source_line: u32,
    sink_line: u32,
    #[serde(default = "default_radius")]
    context_radius: u32,
}

#[derive(Debug, Deserialize)]
struct TaintTraceArgs {
    snippet: String,
    source_line: u32,
    sink_line: u32,
}

#[derive(Debug, Deserialize)]
struct HazardArgs {
    snippet: String,
    vulnerability_type: String,
}

/// Dispatches tool calls by name to the analysis engine.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    matcher: HazardMatcher,
    tracer: TaintTracer,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            matcher: HazardMatcher::new(),
            tracer: TaintTracer::new(),
        }
    }

    /// OpenAI function-calling schemas for the four analysis tools.
    pub fn definitions(&self) -> Vec<Value> {
        vec![
            json!({
                "type": "function",
                "function": {
                    "name": "get_code_context",
                    "description": "Retrieve a code window around the source and sink lines of a finding, plus the name of the enclosing function.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "file_path": {"type": "string", "description": "Path of the file to analyze"},
                            "source_line": {"type": "integer", "description": "Line where the controlled input enters"},
                            "sink_line": {"type": "integer", "description": "Line where the dangerous sink occurs"},
                            "context_radius": {"type": "integer", "description": "Extra lines of context before and after", "default": 5}
                        },
                        "required": ["file_path", "source_line", "sink_line"]
                    }
                }
            }),
            json!({
                "type": "function",
                "function": {
                    "name": "detect_taint_flow",
                    "description": "Trace whether variables used at the sink line depend on variables assigned at the source line, using a variable dependency graph built from the snippet.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "snippet": {"type": "string", "description": "Code block to analyze"},
                            "source_line": {"type": "integer", "description": "Source line, 1-based and relative to the snippet"},
                            "sink_line": {"type": "integer", "description": "Sink line, 1-based and relative to the snippet"}
                        },
                        "required": ["snippet", "source_line", "sink_line"]
                    }
                }
            }),
            json!({
                "type": "function",
                "function": {
                    "name": "detect_sink",
                    "description": "Check the snippet for known dangerous sink patterns for the reported vulnerability category.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "snippet": {"type": "string", "description": "Code block to analyze"},
                            "vulnerability_type": {"type": "string", "description": "Reported vulnerability category"}
                        },
                        "required": ["snippet", "vulnerability_type"]
                    }
                }
            }),
            json!({
                "type": "function",
                "function": {
                    "name": "detect_sanitizers",
                    "description": "Check the snippet for known sanitization or validation patterns for the reported vulnerability category.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "snippet": {"type": "string", "description": "Code block to analyze"},
                            "vulnerability_type": {"type": "string", "description": "Reported vulnerability category"}
                        },
                        "required": ["snippet", "vulnerability_type"]
                    }
                }
            }),
        ]
    }

    /// Execute a named tool with JSON-encoded arguments. Always returns
    /// a string: a JSON result on success, an `Error: ...` line
    /// otherwise.
    pub fn execute(&self, name: &str, arguments: &str) -> String {
        info!(tool = name, args = arguments, "executing tool call");

        match name {
            "get_code_context" => match serde_json::from_str::<CodeContextArgs>(arguments) {
                Ok(args) => extract_context(
                    &args.file_path,
                    args.source_line,
                    args.sink_line,
                    args.context_radius,
                )
                .map(|window| to_json(&window))
                .unwrap_or_else(|e| execution_error(name, &e)),
                Err(_) => invalid_arguments(),
            },
            "detect_taint_flow" => match serde_json::from_str::<TaintTraceArgs>(arguments) {
                Ok(args) => self
                    .tracer
                    .trace(&args.snippet, args.source_line, args.sink_line)
                    .map(|verdict| to_json(&verdict))
                    .unwrap_or_else(|e| execution_error(name, &e)),
                Err(_) => invalid_arguments(),
            },
            "detect_sink" => match serde_json::from_str::<HazardArgs>(arguments) {
                Ok(args) => to_json(&self.matcher.match_sinks(&args.snippet, &args.vulnerability_type)),
                Err(_) => invalid_arguments(),
            },
            "detect_sanitizers" => match serde_json::from_str::<HazardArgs>(arguments) {
                Ok(args) => {
                    to_json(&self.matcher.match_sanitizers(&args.snippet, &args.vulnerability_type))
                }
                Err(_) => invalid_arguments(),
            },
            _ => format!("Error: Tool '{name}' not found."),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("Error: failed to serialize result: {e}"))
}

fn invalid_arguments() -> String {
    "Error: Invalid JSON arguments.".to_string()
}

fn execution_error(name: &str, error: &dyn std::fmt::Display) -> String {
    format!("Error executing tool '{name}': {error}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_cover_all_four_tools() {
        let defs = ToolRegistry::new().definitions();
        let names: Vec<&str> = defs
            .iter()
            .map(|d| d["function"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "get_code_context",
                "detect_taint_flow",
                "detect_sink",
                "detect_sanitizers"
            ]
        );
    }

    #[test]
    fn taint_flow_dispatch_returns_json_verdict() {
        let registry = ToolRegistry::new();
        let result = registry.execute(
            "detect_taint_flow",
            r#"{"snippet": "x = input()\nrun(x)", "source_line": 1, "sink_line": 2}"#,
        );
        let verdict: Value = serde_json::from_str(&result).expect("json result");
        assert_eq!(verdict["data_flow_detected"], true);
    }

    #[test]
    fn sink_dispatch_returns_json() {
        let registry = ToolRegistry::new();
        let result = registry.execute(
            "detect_sink",
            r#"{"snippet": "cursor.execute(q)", "vulnerability_type": "sql injection"}"#,
        );
        let detection: Value = serde_json::from_str(&result).expect("json result");
        assert_eq!(detection["sink_detected"], true);
        assert_eq!(detection["sink_type"], "execute");
    }

    #[test]
    fn unknown_tool_is_an_error_string() {
        let registry = ToolRegistry::new();
        let result = registry.execute("drop_tables", "{}");
        assert_eq!(result, "Error: Tool 'drop_tables' not found.");
    }

    #[test]
    fn malformed_arguments_are_an_error_string() {
        let registry = ToolRegistry::new();
        let result = registry.execute("detect_sink", "not json");
        assert_eq!(result, "Error: Invalid JSON arguments.");
    }

    #[test]
    fn tool_failures_are_reported_not_raised() {
        let registry = ToolRegistry::new();
        let result = registry.execute(
            "get_code_context",
            r#"{"file_path": "/nonexistent/app.py", "source_line": 1, "sink_line": 2}"#,
        );
        assert!(result.starts_with("Error executing tool 'get_code_context'"));
    }
}
