//! Taintriage - AI-assisted triage of static-analysis findings
//!
//! A local-first tool that validates SAST injection findings instead of
//! just listing them: it reconstructs taint flow through a bounded code
//! snippet, matches known sink and sanitizer patterns, and optionally
//! drives an LLM through those tools to a structured True Positive /
//! False Positive verdict.

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod models;
pub mod reporters;

pub use analysis::{detect_sanitizers, detect_sink, extract_context, trace_taint};
