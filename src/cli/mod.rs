//! CLI command definitions and handlers

pub(crate) mod analyze;
mod precheck;
mod trace;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Taintriage - AI-assisted triage of static-analysis findings
#[derive(Parser, Debug)]
#[command(name = "taintriage")]
#[command(
    version,
    about = "AI-assisted triage of static-analysis injection findings — trace taint flow, match sinks and sanitizers, and let an LLM settle true vs false positive",
    long_about = "Taintriage validates SAST findings instead of just listing them. For every \
finding it extracts a bounded code window, builds a variable dependency graph to check \
whether tainted input actually reaches the sink, matches known sink and sanitizer \
patterns, and (in analyze mode) drives an LLM through those tools to a structured \
True Positive / False Positive verdict.\n\n\
The static tools run fully offline; only `analyze` talks to an LLM (BYOK).",
    after_help = "\
Examples:
  taintriage analyze findings.json --source app.py          Full LLM triage
  taintriage analyze findings.json --source app.py --format html -o report.html
  taintriage precheck findings.json --source app.py         Offline static evidence only
  taintriage trace --source app.py --source-line 4 --sink-line 9 --category \"sql injection\"

Documentation: https://github.com/taintriage/taintriage"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Triage findings with the LLM agent (runs the analysis tools on demand)
    #[command(after_help = "\
Examples:
  taintriage analyze findings.json --source app.py
  taintriage analyze findings.json --source app.py --format json -o verdicts.json
  taintriage analyze findings.json --source app.py --backend ollama
  taintriage analyze findings.json --source app.py --model gpt-4o-mini")]
    Analyze(AnalyzeArgs),

    /// Offline static evidence for every finding (no LLM, no network)
    Precheck(PrecheckArgs),

    /// Trace one source/sink pair through a file (no LLM, no network)
    Trace(TraceArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the findings JSON file
    pub findings: PathBuf,

    /// Source file the findings refer to
    #[arg(long)]
    pub source: PathBuf,

    /// Output format: text, json, html
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "html"])]
    pub format: String,

    /// Output file path (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// LLM backend: openai, openrouter, deepinfra, ollama
    #[arg(long, value_parser = ["openai", "openrouter", "deepinfra", "ollama"])]
    pub backend: Option<String>,

    /// Model override (default: the backend's default model)
    #[arg(long)]
    pub model: Option<String>,

    /// API key (default: the backend's environment variable)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Args, Debug)]
pub struct PrecheckArgs {
    /// Path to the findings JSON file
    pub findings: PathBuf,

    /// Source file the findings refer to
    #[arg(long)]
    pub source: PathBuf,

    /// Output format: text, json
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Lines of context around each source/sink pair
    #[arg(long)]
    pub radius: Option<u32>,

    /// Number of parallel workers (1-64)
    #[arg(long, default_value = "8", value_parser = parse_workers)]
    pub workers: usize,
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// Source file to analyze
    #[arg(long)]
    pub source: PathBuf,

    /// Line where the controlled input enters (1-based)
    #[arg(long)]
    pub source_line: u32,

    /// Line where the dangerous sink occurs (1-based)
    #[arg(long)]
    pub sink_line: u32,

    /// Vulnerability category for sink/sanitizer matching
    #[arg(long)]
    pub category: Option<String>,

    /// Lines of context around the source/sink pair
    #[arg(long)]
    pub radius: Option<u32>,

    /// Output format: text, json
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => analyze::run(args),
        Commands::Precheck(args) => precheck::run(args),
        Commands::Trace(args) => trace::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workers_parser_bounds() {
        assert_eq!(parse_workers("8"), Ok(8));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("eight").is_err());
    }

    #[test]
    fn trace_command_parses() {
        let cli = Cli::try_parse_from([
            "taintriage",
            "trace",
            "--source",
            "app.py",
            "--source-line",
            "4",
            "--sink-line",
            "9",
        ])
        .unwrap();
        match cli.command {
            Commands::Trace(args) => {
                assert_eq!(args.source_line, 4);
                assert_eq!(args.sink_line, 9);
                assert_eq!(args.format, "text");
            }
            _ => panic!("expected trace subcommand"),
        }
    }

    #[test]
    fn analyze_rejects_unknown_format() {
        let result = Cli::try_parse_from([
            "taintriage",
            "analyze",
            "findings.json",
            "--source",
            "app.py",
            "--format",
            "sarif",
        ]);
        assert!(result.is_err());
    }
}
