//! Snippet syntax adapters
//!
//! The dependency-graph builder needs three facts about a snippet: which
//! names each assignment binds, which names its right-hand side reads,
//! and which names appear as call arguments. `SnippetParser` exposes
//! exactly that, keeping the concrete grammar behind one seam.

use crate::analysis::AnalysisError;
use tree_sitter::{Node, Parser};

/// One assignment statement observed in a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// 1-based line of the statement within the (dedented) snippet
    pub line: u32,
    /// Names bound by the assignment; tuple and chained forms bind several
    pub targets: Vec<String>,
    /// Names read anywhere in the right-hand side
    pub reads: Vec<String>,
}

/// One call expression observed in a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// 1-based line where the call expression starts
    pub line: u32,
    /// Names read in positional arguments and keyword-argument values.
    /// The callee expression itself is not included.
    pub argument_reads: Vec<String>,
}

/// Assignment and call facts extracted from one snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetFacts {
    pub assignments: Vec<Assignment>,
    pub calls: Vec<CallSite>,
}

/// A language adapter that turns snippet text into [`SnippetFacts`].
pub trait SnippetParser {
    fn parse(&self, snippet: &str) -> Result<SnippetFacts, AnalysisError>;
}

/// Strip the common leading indentation shared by all non-blank lines,
/// so snippets lifted from inside a function body parse as module-level
/// statements. Whitespace-only lines are normalized to empty.
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = &line[..line.len() - line.trim_start().len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => {
                let shared = current
                    .bytes()
                    .zip(indent.bytes())
                    .take_while(|(a, b)| a == b)
                    .count();
                &current[..shared]
            }
        });
    }

    let margin = margin.unwrap_or("");
    if margin.is_empty() {
        return text.to_string();
    }

    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Python snippet adapter backed by tree-sitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonParser;

impl SnippetParser for PythonParser {
    fn parse(&self, snippet: &str) -> Result<SnippetFacts, AnalysisError> {
        let cleaned = dedent(snippet);

        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE;
        parser
            .set_language(&language.into())
            .map_err(|e| AnalysisError::Parse {
                detail: format!("failed to load Python grammar: {e}"),
            })?;

        let tree = parser
            .parse(&cleaned, None)
            .ok_or_else(|| AnalysisError::Parse {
                detail: "parser produced no syntax tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(AnalysisError::Parse {
                detail: "snippet is not syntactically valid Python".to_string(),
            });
        }

        let mut facts = SnippetFacts::default();
        collect_facts(root, cleaned.as_bytes(), &mut facts);
        Ok(facts)
    }
}

fn collect_facts(node: Node, source: &[u8], facts: &mut SnippetFacts) {
    match node.kind() {
        "assignment" => {
            // Bare annotations (`x: int`) have no right-hand side and
            // bind nothing.
            if let Some(right) = node.child_by_field_name("right") {
                let mut targets = Vec::new();
                if let Some(left) = node.child_by_field_name("left") {
                    collect_targets(left, source, &mut targets);
                }
                let mut reads = Vec::new();
                collect_reads(right, source, &mut reads);
                facts.assignments.push(Assignment {
                    line: node.start_position().row as u32 + 1,
                    targets,
                    reads,
                });
            }
        }
        "call" => {
            let mut argument_reads = Vec::new();
            if let Some(args) = node.child_by_field_name("arguments") {
                let mut cursor = args.walk();
                for child in args.named_children(&mut cursor) {
                    match child.kind() {
                        "keyword_argument" => {
                            if let Some(value) = child.child_by_field_name("value") {
                                collect_reads(value, source, &mut argument_reads);
                            }
                        }
                        "comment" => {}
                        _ => collect_reads(child, source, &mut argument_reads),
                    }
                }
            }
            facts.calls.push(CallSite {
                line: node.start_position().row as u32 + 1,
                argument_reads,
            });
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_facts(child, source, facts);
    }
}

/// Collect variable-read names from an expression subtree.
fn collect_reads(node: Node, source: &[u8], out: &mut Vec<String>) {
    match node.kind() {
        "identifier" => {
            if let Ok(text) = node.utf8_text(source) {
                out.push(text.to_string());
            }
        }
        // `obj.attr`: only the object is a variable read.
        "attribute" => {
            if let Some(object) = node.child_by_field_name("object") {
                collect_reads(object, source, out);
            }
        }
        // `f(key=value)`: the keyword name is not a read.
        "keyword_argument" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_reads(value, source, out);
            }
        }
        // `a = b = rhs`: a nested assignment's targets are not reads.
        "assignment" => {
            if let Some(right) = node.child_by_field_name("right") {
                collect_reads(right, source, out);
            }
        }
        // `[x for x in xs]`: the loop variable binds, the iterable reads.
        "for_in_clause" => {
            if let Some(right) = node.child_by_field_name("right") {
                collect_reads(right, source, out);
            }
        }
        // `(y := f())`: the walrus target binds, its value reads.
        "named_expression" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_reads(value, source, out);
            }
        }
        // Lambda parameters bind, they do not read.
        "lambda_parameters" => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_reads(child, source, out);
            }
        }
    }
}

/// Collect plain variable names bound by an assignment target pattern.
/// Attribute and subscript targets do not bind a variable name.
fn collect_targets(node: Node, source: &[u8], out: &mut Vec<String>) {
    match node.kind() {
        "identifier" => {
            if let Ok(text) = node.utf8_text(source) {
                out.push(text.to_string());
            }
        }
        "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_targets(child, source, out);
            }
        }
        _ => {}
    }
}
