//! `trace` command: one-shot offline taint trace of a file/line pair

use crate::analysis::{detect_sanitizers, detect_sink, extract_context, trace_taint};
use crate::cli::TraceArgs;
use crate::config::TriageConfig;
use anyhow::Result;
use console::style;
use serde_json::json;
use std::path::Path;

pub fn run(args: TraceArgs) -> Result<()> {
    let file_config = TriageConfig::load(Path::new("."))?;
    let radius = args.radius.unwrap_or(file_config.analysis.context_radius);

    let window = extract_context(&args.source, args.source_line, args.sink_line, radius)?;

    // The tracer takes snippet-relative lines.
    let rel_source = args.source_line - window.start_line + 1;
    let rel_sink = args.sink_line - window.start_line + 1;
    let verdict = trace_taint(&window.snippet, rel_source, rel_sink)?;

    let hazards = args
        .category
        .as_deref()
        .map(|category| {
            (
                detect_sink(&window.snippet, category),
                detect_sanitizers(&window.snippet, category),
            )
        });

    if args.format == "json" {
        let mut output = json!({
            "context": window,
            "flow": verdict,
        });
        if let Some((sink, sanitizers)) = &hazards {
            output["sink"] = serde_json::to_value(sink)?;
            output["sanitizers"] = serde_json::to_value(sanitizers)?;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "\n{} lines {}-{}{}",
        args.source.display(),
        window.start_line,
        window.end_line,
        window
            .function_name
            .as_deref()
            .map(|name| format!(" in {name}()"))
            .unwrap_or_default()
    );
    println!("──────────────────────────────────────");
    for (offset, line) in window.snippet.lines().enumerate() {
        let line_number = window.start_line + offset as u32;
        let marker = if line_number == args.source_line {
            "source"
        } else if line_number == args.sink_line {
            "sink"
        } else {
            ""
        };
        println!("{line_number:>5} {marker:>6} | {line}");
    }
    println!();

    if verdict.data_flow_detected {
        println!("{}: {}", style("flow detected").red().bold(), verdict.explanation);
    } else {
        println!("{}: {}", style("no flow").green().bold(), verdict.explanation);
    }

    if let Some((sink, sanitizers)) = &hazards {
        if sink.sink_detected {
            println!("sink: {} — {}", sink.sink_type, sink.explanation);
        } else {
            println!("sink: none — {}", sink.explanation);
        }
        if sanitizers.sanitizers_found.is_empty() {
            println!("sanitizers: none");
        } else {
            println!(
                "sanitizers: {} ({})",
                sanitizers.sanitizers_found.join(", "),
                if sanitizers.sufficient {
                    "sufficient"
                } else {
                    "insufficient"
                }
            );
        }
    }

    Ok(())
}
