//! `analyze` command: full LLM triage of a findings file

use crate::agent::{LlmBackend, LlmClient, LlmConfig, SecurityAgent};
use crate::cli::AnalyzeArgs;
use crate::config::{self, TriageConfig};
use crate::models::load_findings;
use crate::reporters;
use anyhow::{anyhow, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::warn;

pub fn run(args: AnalyzeArgs) -> Result<()> {
    config::load_dotenv(Path::new("."));
    let file_config = TriageConfig::load(Path::new("."))?;

    if !args.source.exists() {
        anyhow::bail!("source file not found: {}", args.source.display());
    }

    let findings = load_findings(&args.findings)?;
    if findings.is_empty() {
        println!("No findings to analyze.");
        return Ok(());
    }

    let backend: LlmBackend = args
        .backend
        .or(file_config.llm.backend)
        .unwrap_or_else(|| "openai".to_string())
        .parse()
        .map_err(|e: String| anyhow!(e))?;

    let llm_config = LlmConfig {
        backend,
        model: args.model.or(file_config.llm.model),
        max_tokens: file_config.llm.max_tokens,
        temperature: file_config.llm.temperature,
    };

    let agent = match args.api_key {
        Some(key) => SecurityAgent::new(LlmClient::new(llm_config, key)),
        None => SecurityAgent::from_env(llm_config)?,
    };

    println!(
        "Found {} findings to analyze against '{}'.",
        findings.len(),
        args.source.display()
    );

    let bar = ProgressBar::new(findings.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::new();
    for finding in &findings {
        let id = finding.id_or_default();
        bar.set_message(format!("{id} ({})", finding.vulnerability_type));

        match agent.analyze(finding, &args.source) {
            Ok(analysis) => results.push(analysis),
            Err(e) => {
                warn!(id = %id, error = %e, "triage failed for finding");
                bar.println(format!("  {} {id}: {e}", style("error").red()));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if results.is_empty() {
        println!("No successful results were produced.");
        return Ok(());
    }

    let rendered = reporters::report(&results, &args.format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            println!(
                "{} report written to {}",
                style("ok").green(),
                path.display()
            );
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
