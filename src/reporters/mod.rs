//! Output reporters for triage results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON (array of verdicts)
//! - `html` - Standalone HTML report

mod html;
mod json;
mod text;

use crate::models::VulnerabilityAnalysis;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, html",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

/// Render triage results in the specified format
pub fn report(results: &[VulnerabilityAnalysis], format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(results, fmt)
}

/// Render triage results using an OutputFormat enum
pub fn report_with_format(
    results: &[VulnerabilityAnalysis],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(results),
        OutputFormat::Json => json::render(results),
        OutputFormat::Html => html::render(results),
    }
}

/// Get the recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Html => "html",
    }
}
