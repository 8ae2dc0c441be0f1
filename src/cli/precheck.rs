//! `precheck` command: offline static evidence for every finding
//!
//! Runs the same tools the LLM agent would call — context extraction,
//! sink/sanitizer matching, taint trace — over every finding in the
//! file, in parallel, without touching the network. Useful to spot
//! line-number mismatches and obvious false positives before spending
//! tokens on them.

use crate::analysis::{
    detect_sanitizers, detect_sink, extract_context, trace_taint, FlowVerdict, SanitizerDetection,
    SinkDetection,
};
use crate::cli::PrecheckArgs;
use crate::config::TriageConfig;
use crate::models::{load_findings, VulnerabilityReport};
use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

/// Static evidence for one finding
#[derive(Debug, Serialize)]
pub struct PrecheckResult {
    pub id: String,
    pub vulnerability_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sink: Option<SinkDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitizers: Option<SanitizerDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn run(args: PrecheckArgs) -> Result<()> {
    let file_config = TriageConfig::load(Path::new("."))?;
    let radius = args.radius.unwrap_or(file_config.analysis.context_radius);

    if !args.source.exists() {
        anyhow::bail!("source file not found: {}", args.source.display());
    }
    let findings = load_findings(&args.findings)?;
    if findings.is_empty() {
        println!("No findings to precheck.");
        return Ok(());
    }

    // Each finding is independent; a bounded pool maps them in parallel
    // while collect() preserves input order.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers)
        .build()?;
    let results: Vec<PrecheckResult> = pool.install(|| {
        findings
            .par_iter()
            .map(|finding| precheck_one(finding, &args.source, radius))
            .collect()
    });

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => print_text(&results),
    }

    Ok(())
}

fn precheck_one(finding: &VulnerabilityReport, source: &Path, radius: u32) -> PrecheckResult {
    let id = finding.id_or_default();

    let window = match extract_context(source, finding.source_line, finding.sink_line, radius) {
        Ok(window) => window,
        Err(e) => {
            return PrecheckResult {
                id,
                vulnerability_type: finding.vulnerability_type.clone(),
                function_name: None,
                sink: None,
                sanitizers: None,
                flow: None,
                error: Some(e.to_string()),
            }
        }
    };

    let sink = detect_sink(&window.snippet, &finding.vulnerability_type);
    let sanitizers = detect_sanitizers(&window.snippet, &finding.vulnerability_type);

    // The tracer takes snippet-relative lines.
    let rel_source = finding.source_line - window.start_line + 1;
    let rel_sink = finding.sink_line - window.start_line + 1;
    let (flow, error) = match trace_taint(&window.snippet, rel_source, rel_sink) {
        Ok(verdict) => (Some(verdict), None),
        Err(e) => (None, Some(e.to_string())),
    };

    PrecheckResult {
        id,
        vulnerability_type: finding.vulnerability_type.clone(),
        function_name: window.function_name,
        sink: Some(sink),
        sanitizers: Some(sanitizers),
        flow,
        error,
    }
}

fn print_text(results: &[PrecheckResult]) {
    println!("\nPrecheck ({} findings)", results.len());
    println!("──────────────────────────────────────");
    for result in results {
        println!("{}  {}", result.id, result.vulnerability_type);
        if let Some(function) = &result.function_name {
            println!("  function: {function}");
        }
        if let Some(sink) = &result.sink {
            if sink.sink_detected {
                println!("  sink: {}", sink.sink_type);
            } else {
                println!("  sink: none");
            }
        }
        if let Some(sanitizers) = &result.sanitizers {
            if sanitizers.sanitizers_found.is_empty() {
                println!("  sanitizers: none");
            } else {
                println!("  sanitizers: {}", sanitizers.sanitizers_found.join(", "));
            }
        }
        if let Some(flow) = &result.flow {
            println!(
                "  flow: {}",
                if flow.data_flow_detected {
                    "detected"
                } else {
                    "not detected"
                }
            );
            println!("  {}", flow.explanation);
        }
        if let Some(error) = &result.error {
            println!("  error: {error}");
        }
        println!();
    }
}
