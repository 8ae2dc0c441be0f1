//! Core analysis engine
//!
//! Pure, stateless operations over code snippets: bounded context
//! extraction, hazard pattern matching, and taint-flow tracing. Every
//! operation computes over its explicit inputs and owns no shared state,
//! so concurrent callers need no locking.

pub mod context;
pub mod hazards;
pub mod syntax;
pub mod taint;

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the analysis engine
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error(
        "invalid line range: source line {source_line}, sink line {sink_line} \
         (lines are 1-based and the source must not come after the sink)"
    )]
    InvalidRange { source_line: u32, sink_line: u32 },

    #[error("failed to parse snippet: {detail}")]
    Parse { detail: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub use context::{extract_context, CodeWindow};
pub use hazards::{
    detect_sanitizers, detect_sink, HazardMatcher, HazardTables, SanitizerDetection,
    SanitizerPattern, SinkDetection,
};
pub use syntax::{PythonParser, SnippetFacts, SnippetParser};
pub use taint::{trace_taint, DependencyGraph, FlowVerdict, MatchedChain, TaintTracer};
