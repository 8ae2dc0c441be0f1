//! JSON reporter
//!
//! Outputs the verdicts as a pretty-printed JSON array, matching the
//! shape consumers pipe into jq or archive next to the findings file.

use crate::models::VulnerabilityAnalysis;
use anyhow::Result;

/// Render results as JSON
pub fn render(results: &[VulnerabilityAnalysis]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}
