//! Taint-flow tracing
//!
//! Builds an intraprocedural variable-dependency graph from a snippet,
//! seeds it with the assignments on the declared source line, and decides
//! by transitive reachability whether any variable read at the declared
//! sink line depends on tainted input.

use crate::analysis::syntax::{PythonParser, SnippetFacts, SnippetParser};
use crate::analysis::AnalysisError;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Variable name -> union of every name its assignments read.
///
/// Reassignment accumulates dependencies instead of clearing them: a
/// sound-leaning over-approximation that may over-report flow.
pub type DependencyGraph = BTreeMap<String, BTreeSet<String>>;

/// Everything derived from one snippet and one (source, sink) line pair.
/// Scoped to a single analysis call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetAnalysis {
    pub graph: DependencyGraph,
    pub seeds: BTreeSet<String>,
    pub candidates: BTreeSet<String>,
    pub source_line: u32,
    pub sink_line: u32,
}

/// A sink candidate together with the seed variables it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedChain {
    pub candidate: String,
    pub tainted_by: BTreeSet<String>,
}

/// The flow decision for one analysis call. Produced fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowVerdict {
    pub data_flow_detected: bool,
    /// Every variable that appears as an assignment target in the window
    pub flow_variables: Vec<String>,
    pub matched_chains: Vec<MatchedChain>,
    pub explanation: String,
}

/// Fold parsed snippet facts into the dependency graph, seed set, and
/// candidate set for one (source, sink) line pair.
pub fn build_graph(facts: &SnippetFacts, source_line: u32, sink_line: u32) -> SnippetAnalysis {
    let mut analysis = SnippetAnalysis {
        source_line,
        sink_line,
        ..Default::default()
    };

    for assignment in &facts.assignments {
        for target in &assignment.targets {
            let deps = analysis.graph.entry(target.clone()).or_default();
            deps.extend(assignment.reads.iter().cloned());
            if assignment.line == source_line {
                analysis.seeds.insert(target.clone());
            }
        }
    }

    for call in &facts.calls {
        if call.line == sink_line {
            analysis
                .candidates
                .extend(call.argument_reads.iter().cloned());
        }
    }

    analysis
}

/// Decide reachability from every sink candidate back to the seed set.
pub fn evaluate(analysis: &SnippetAnalysis) -> FlowVerdict {
    // Lower the adjacency map into a petgraph DiGraph once; per-candidate
    // closures are DFS walks over it. The visited set inside Dfs makes
    // the walk total on cyclic graphs.
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: FxHashMap<&str, NodeIndex> = FxHashMap::default();

    for (var, deps) in &analysis.graph {
        let from = intern(&mut graph, &mut index, var);
        for dep in deps {
            let to = intern(&mut graph, &mut index, dep);
            graph.add_edge(from, to, ());
        }
    }

    let mut matched_chains = Vec::new();
    for candidate in &analysis.candidates {
        let mut tainted_by: BTreeSet<String> = BTreeSet::new();

        if let Some(&start) = index.get(candidate.as_str()) {
            let mut dfs = Dfs::new(&graph, start);
            while let Some(node) = dfs.next(&graph) {
                let name = graph[node];
                if analysis.seeds.contains(name) {
                    tainted_by.insert(name.to_string());
                }
            }
        }
        // A candidate assigned on the source line is tainted outright,
        // even when it never appears as a graph node.
        if analysis.seeds.contains(candidate) {
            tainted_by.insert(candidate.clone());
        }

        if !tainted_by.is_empty() {
            matched_chains.push(MatchedChain {
                candidate: candidate.clone(),
                tainted_by,
            });
        }
    }

    let data_flow_detected = !matched_chains.is_empty();
    let explanation = explain(analysis, &matched_chains, data_flow_detected);

    FlowVerdict {
        data_flow_detected,
        flow_variables: analysis.graph.keys().cloned().collect(),
        matched_chains,
        explanation,
    }
}

fn intern<'a>(
    graph: &mut DiGraph<&'a str, ()>,
    index: &mut FxHashMap<&'a str, NodeIndex>,
    name: &'a str,
) -> NodeIndex {
    *index.entry(name).or_insert_with(|| graph.add_node(name))
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn explain(analysis: &SnippetAnalysis, chains: &[MatchedChain], detected: bool) -> String {
    if detected {
        let rendered: Vec<String> = chains
            .iter()
            .map(|chain| format!("{} (depends on {})", chain.candidate, join(&chain.tainted_by)))
            .collect();
        format!(
            "Flow detected: sink arguments [{}] depend on source assignments [{}]. Chains: {}.",
            join(&analysis.candidates),
            join(&analysis.seeds),
            rendered.join("; ")
        )
    } else if analysis.seeds.is_empty() {
        format!(
            "No tainted variables were recorded at line {}. (Possible line mismatch or snippet too narrow.)",
            analysis.source_line
        )
    } else if analysis.candidates.is_empty() {
        format!(
            "No sink call arguments were recorded at line {}.",
            analysis.sink_line
        )
    } else {
        format!(
            "No data flow between source [{}] and sink [{}].",
            join(&analysis.seeds),
            join(&analysis.candidates)
        )
    }
}

/// Taint-trace service: parse, build, evaluate in one call.
///
/// Generic over the snippet language adapter; defaults to Python.
#[derive(Debug, Clone, Default)]
pub struct TaintTracer<P = PythonParser> {
    parser: P,
}

impl TaintTracer<PythonParser> {
    pub fn new() -> Self {
        Self {
            parser: PythonParser,
        }
    }
}

impl<P: SnippetParser> TaintTracer<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    /// Trace taint from `source_line` to `sink_line` within `snippet`.
    /// Line numbers are 1-based and relative to the snippet.
    pub fn trace(
        &self,
        snippet: &str,
        source_line: u32,
        sink_line: u32,
    ) -> Result<FlowVerdict, AnalysisError> {
        let facts = self.parser.parse(snippet)?;
        let analysis = build_graph(&facts, source_line, sink_line);
        Ok(evaluate(&analysis))
    }
}

/// Trace taint through a Python snippet.
pub fn trace_taint(
    snippet: &str,
    source_line: u32,
    sink_line: u32,
) -> Result<FlowVerdict, AnalysisError> {
    TaintTracer::new().trace(snippet, source_line, sink_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(edges: Vec<(&str, Vec<&str>)>) -> DependencyGraph {
        edges
            .into_iter()
            .map(|(var, deps)| {
                (
                    var.to_string(),
                    deps.into_iter().map(str::to_string).collect(),
                )
            })
            .collect()
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn direct_flow_is_detected() {
        let verdict = trace_taint(
            "x = input()\ncursor.execute(\"SELECT * FROM t WHERE id=\" + x)\n",
            1,
            2,
        )
        .expect("trace");
        assert!(verdict.data_flow_detected);
        let chain = &verdict.matched_chains[0];
        assert_eq!(chain.candidate, "x");
        assert!(chain.tainted_by.contains("x"));
    }

    #[test]
    fn unrelated_variable_reports_no_flow() {
        let verdict = trace_taint(
            "x = input()\ny = \"?\"\ncursor.execute(query, (y,))\n",
            1,
            3,
        )
        .expect("trace");
        assert!(!verdict.data_flow_detected);
        assert!(verdict.explanation.contains("No data flow"));
    }

    #[test]
    fn transitive_chain_is_chased() {
        let snippet = "c = input()\nb = c.strip()\na = b + suffix\nsend(a)\n";
        let verdict = trace_taint(snippet, 1, 4).expect("trace");
        assert!(verdict.data_flow_detected);
        let chain = &verdict.matched_chains[0];
        assert_eq!(chain.candidate, "a");
        assert!(chain.tainted_by.contains("c"));
    }

    #[test]
    fn cyclic_graph_terminates_and_classifies() {
        let analysis = SnippetAnalysis {
            graph: graph_of(vec![
                ("x", vec!["y"]),
                ("y", vec!["x"]),
                ("z", vec!["x", "seed"]),
            ]),
            seeds: names(&["seed"]),
            candidates: names(&["z"]),
            source_line: 1,
            sink_line: 4,
        };
        let verdict = evaluate(&analysis);
        assert!(verdict.data_flow_detected);
        assert_eq!(verdict.matched_chains[0].tainted_by, names(&["seed"]));
    }

    #[test]
    fn self_referential_variable_terminates() {
        let analysis = SnippetAnalysis {
            graph: graph_of(vec![("x", vec!["x"])]),
            seeds: names(&["other"]),
            candidates: names(&["x"]),
            source_line: 1,
            sink_line: 2,
        };
        let verdict = evaluate(&analysis);
        assert!(!verdict.data_flow_detected);
    }

    #[test]
    fn no_assignment_on_source_line_yields_no_seeds() {
        let verdict = trace_taint("x = input()\ncursor.execute(x)\n", 5, 2).expect("trace");
        assert!(!verdict.data_flow_detected);
        assert!(verdict.explanation.contains("line 5"));
        assert!(verdict.explanation.contains("No tainted variables"));
    }

    #[test]
    fn no_call_on_sink_line_yields_no_candidates() {
        let verdict = trace_taint("x = input()\ny = x\n", 1, 2).expect("trace");
        assert!(!verdict.data_flow_detected);
        assert!(verdict.explanation.contains("line 2"));
        assert!(verdict.explanation.contains("No sink call arguments"));
    }

    #[test]
    fn tuple_assignment_seeds_every_target() {
        let snippet = "a, b = request.form()\nquery(a)\n";
        let verdict = trace_taint(snippet, 1, 2).expect("trace");
        assert!(verdict.data_flow_detected);
        assert_eq!(verdict.matched_chains[0].candidate, "a");
    }

    #[test]
    fn reassignment_accumulates_dependencies() {
        // x keeps its dependency on tainted input even after being
        // reassigned from a clean value.
        let snippet = "x = input()\nx = \"clean\"\nsink(x)\n";
        let verdict = trace_taint(snippet, 1, 3).expect("trace");
        assert!(verdict.data_flow_detected);
    }

    #[test]
    fn trace_is_idempotent() {
        let snippet = "c = input()\nb = c\na = b\nsend(a, b)\n";
        let first = trace_taint(snippet, 1, 4).expect("trace");
        let second = trace_taint(snippet, 1, 4).expect("trace");
        assert_eq!(first, second);
    }

    #[test]
    fn flow_variables_list_every_graph_key_sorted() {
        let verdict = trace_taint("b = raw\na = b\nuse(a)\n", 1, 3).expect("trace");
        assert_eq!(verdict.flow_variables, vec!["a", "b"]);
    }

    #[test]
    fn candidate_missing_from_graph_is_handled() {
        let analysis = SnippetAnalysis {
            graph: DependencyGraph::new(),
            seeds: names(&["ghost"]),
            candidates: names(&["ghost", "other"]),
            source_line: 1,
            sink_line: 2,
        };
        let verdict = evaluate(&analysis);
        assert!(verdict.data_flow_detected);
        assert_eq!(verdict.matched_chains.len(), 1);
        assert_eq!(verdict.matched_chains[0].candidate, "ghost");
    }

    #[test]
    fn malformed_snippet_is_an_error_not_a_verdict() {
        let err = trace_taint("cursor.execute(\"SELECT\"\n", 1, 1).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }
}
