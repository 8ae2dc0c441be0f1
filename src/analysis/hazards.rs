//! Hazard pattern matching
//!
//! Detects known dangerous-operation names ("sinks") and known mitigation
//! patterns ("sanitizers") in a snippet, keyed by vulnerability category.
//! Matching is pure lowercase substring containment against an immutable
//! table injected at construction, so tests can swap tables freely.
//!
//! Two deliberate asymmetries are preserved for compatibility with the
//! decision layer that consumes these results: sink matching stops at the
//! first pattern in declared order, while sanitizer matching collects
//! every hit but lets the last hit in table order own the rationale.

use serde::{Deserialize, Serialize};

/// Result of sink detection for one snippet/category pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkDetection {
    pub sink_detected: bool,
    pub sink_type: String,
    pub explanation: String,
}

/// Result of sanitizer detection for one snippet/category pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerDetection {
    pub sanitizers_found: Vec<String>,
    pub sufficient: bool,
    pub explanation: String,
}

/// A mitigation pattern and the human-readable name reported for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizerPattern {
    pub pattern: String,
    pub name: String,
}

/// Category-keyed sink and sanitizer pattern lists. Order matters: sink
/// lists are matched first-wins, sanitizer lists last-wins-for-rationale.
#[derive(Debug, Clone)]
pub struct HazardTables {
    sinks: Vec<(String, Vec<String>)>,
    sanitizers: Vec<(String, Vec<SanitizerPattern>)>,
}

fn sink_category(key: &str, patterns: &[&str]) -> (String, Vec<String>) {
    (
        key.to_string(),
        patterns.iter().map(|p| p.to_string()).collect(),
    )
}

fn sanitizer_category(key: &str, patterns: &[(&str, &str)]) -> (String, Vec<SanitizerPattern>) {
    (
        key.to_string(),
        patterns
            .iter()
            .map(|(pattern, name)| SanitizerPattern {
                pattern: pattern.to_string(),
                name: name.to_string(),
            })
            .collect(),
    )
}

impl HazardTables {
    /// The built-in category tables
    pub fn builtin() -> Self {
        Self {
            sinks: vec![
                sink_category(
                    "sql injection",
                    &["execute", "cursor", "raw_sql", "executemany"],
                ),
                sink_category(
                    "command injection",
                    &["system", "popen", "subprocess", "call", "run"],
                ),
                sink_category("xss", &["render_template_string", "response", "markup"]),
                sink_category(
                    "ssrf",
                    &["requests.get", "requests.post", "urlopen", "httpclient", "get"],
                ),
            ],
            sanitizers: vec![
                sanitizer_category(
                    "sql injection",
                    &[
                        ("?", "Parameterized Query (Placeholder)"),
                        ("%s", "Parameterized Query (Placeholder Postgres/MySQL)"),
                        (":", "Named Parameter"),
                        ("literal", "SQLAlchemy Literal"),
                    ],
                ),
                sanitizer_category(
                    "command injection",
                    &[
                        ("shlex.quote", "Shell Escape"),
                        ("subprocess.run", "Subprocess List Args (Implicit)"),
                    ],
                ),
                sanitizer_category(
                    "xss",
                    &[("escape", "HTML Escape"), ("bleach", "Bleach Sanitizer")],
                ),
            ],
        }
    }

    /// Build custom tables. Both lists keep their declared order.
    pub fn new(
        sinks: Vec<(String, Vec<String>)>,
        sanitizers: Vec<(String, Vec<SanitizerPattern>)>,
    ) -> Self {
        Self { sinks, sanitizers }
    }

    fn sink_patterns(&self, category: &str) -> &[String] {
        let key = category.to_lowercase();
        if let Some((_, patterns)) = self.sinks.iter().find(|(k, _)| *k == key) {
            return patterns;
        }
        // Unrecognized category: classify by substring of the name itself.
        let fallback = if key.contains("sql") {
            "sql injection"
        } else if key.contains("command") || key.contains("rce") {
            "command injection"
        } else if key.contains("xss") {
            "xss"
        } else if key.contains("ssrf") {
            "ssrf"
        } else {
            return &[];
        };
        self.sinks
            .iter()
            .find(|(k, _)| k == fallback)
            .map(|(_, patterns)| patterns.as_slice())
            .unwrap_or(&[])
    }

    fn sanitizer_patterns(&self, category: &str) -> &[SanitizerPattern] {
        let key = category.to_lowercase();
        if let Some((_, patterns)) = self.sanitizers.iter().find(|(k, _)| *k == key) {
            return patterns;
        }
        // The fallback chain only covers SQL variants here.
        if key.contains("sql") {
            return self
                .sanitizers
                .iter()
                .find(|(k, _)| k == "sql injection")
                .map(|(_, patterns)| patterns.as_slice())
                .unwrap_or(&[]);
        }
        &[]
    }
}

impl Default for HazardTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Sink and sanitizer matcher over an immutable table
#[derive(Debug, Clone, Default)]
pub struct HazardMatcher {
    tables: HazardTables,
}

impl HazardMatcher {
    pub fn new() -> Self {
        Self {
            tables: HazardTables::builtin(),
        }
    }

    pub fn with_tables(tables: HazardTables) -> Self {
        Self { tables }
    }

    /// Report the first matching sink pattern for the category, in
    /// declared table order.
    pub fn match_sinks(&self, snippet: &str, category: &str) -> SinkDetection {
        let haystack = snippet.to_lowercase();

        for pattern in self.tables.sink_patterns(category) {
            if haystack.contains(pattern.as_str()) {
                return SinkDetection {
                    sink_detected: true,
                    sink_type: pattern.clone(),
                    explanation: format!(
                        "Detected dangerous sink pattern '{pattern}' associated with {category}."
                    ),
                };
            }
        }

        if haystack.contains("execute") || haystack.contains("eval") {
            return SinkDetection {
                sink_detected: true,
                sink_type: "Generic Execution".to_string(),
                explanation: "Detected potentially dangerous generic execution.".to_string(),
            };
        }

        SinkDetection {
            sink_detected: false,
            sink_type: "Unknown".to_string(),
            explanation: "No known sink detected.".to_string(),
        }
    }

    /// Collect every matching sanitizer pattern for the category.
    pub fn match_sanitizers(&self, snippet: &str, category: &str) -> SanitizerDetection {
        let haystack = snippet.to_lowercase();

        let mut sanitizers_found = Vec::new();
        let mut sufficient = false;
        let mut explanation = String::from("No relevant sanitizers detected.");

        for check in self.tables.sanitizer_patterns(category) {
            if haystack.contains(check.pattern.as_str()) {
                sanitizers_found.push(check.name.clone());
                sufficient = true;
                explanation = format!("Detected mitigation: {}.", check.name);
            }
        }

        SanitizerDetection {
            sanitizers_found,
            sufficient,
            explanation,
        }
    }
}

/// Detect the first known sink pattern in a snippet for a category.
pub fn detect_sink(snippet: &str, category: &str) -> SinkDetection {
    HazardMatcher::new().match_sinks(snippet, category)
}

/// Detect every known sanitizer pattern in a snippet for a category.
pub fn detect_sanitizers(snippet: &str, category: &str) -> SanitizerDetection {
    HazardMatcher::new().match_sanitizers(snippet, category)
}
