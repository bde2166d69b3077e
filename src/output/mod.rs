use anyhow::Result;
use console::style;
use std::fmt::Write;

use crate::batch::BatchSummary;
use crate::cli::OutputFormat;
use crate::locator::{Descriptor, SearchPlan};
use crate::utils::{format_duration, preview};

/// Render a batch summary
pub fn format_summary(summary: &BatchSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Text => Ok(format_summary_text(summary)),
    }
}

fn format_summary_text(summary: &BatchSummary) -> String {
    let elapsed = (summary.finished_at - summary.started_at).num_milliseconds() as f64 / 1000.0;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Processed {} of {} rows in {}",
        summary.processed,
        summary.total,
        format_duration(elapsed)
    );
    let _ = writeln!(out, "  {} {}", style("succeeded:").green(), summary.succeeded);
    let _ = writeln!(out, "  {} {}", style("failed:").red(), summary.failed);
    let _ = writeln!(out, "  {} {}", style("skipped:").yellow(), summary.skipped);

    for (kind, count) in &summary.failures_by_kind {
        let _ = writeln!(out, "    {:<26} {}", kind.to_string(), count);
    }
    for failure in &summary.failures {
        let _ = writeln!(
            out,
            "  row {}: {} -> {}",
            failure.row,
            failure.url,
            preview(&failure.cell, 80)
        );
    }

    out
}

/// Print a batch summary to stdout
pub fn print_summary(summary: &BatchSummary, format: OutputFormat) -> Result<()> {
    println!("{}", format_summary(summary, format)?);
    Ok(())
}

fn write_descriptor(out: &mut String, indent: &str, descriptor: &Descriptor) {
    let _ = writeln!(
        out,
        "{}{} [{}, {} ms]\n{}  {}",
        indent,
        style(&descriptor.name).bold(),
        descriptor.condition,
        descriptor.timeout_ms,
        indent,
        descriptor.query
    );
}

/// Render the search plan
pub fn format_plan(plan: &SearchPlan, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(plan)?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Reveal control:");
    for (i, strategy) in plan.reveal.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, strategy.name);
        if let Some(opener) = &strategy.opener {
            let _ = writeln!(out, "     opens first:");
            write_descriptor(&mut out, "       ", opener);
        }
        for descriptor in strategy.targets.iter() {
            write_descriptor(&mut out, "     ", descriptor);
        }
    }

    let _ = writeln!(out, "Transcript container:");
    for descriptor in plan.container.iter() {
        write_descriptor(&mut out, "  ", descriptor);
    }

    let _ = writeln!(out, "Transcript segments:");
    for descriptor in plan.segments.iter() {
        write_descriptor(&mut out, "  ", descriptor);
    }

    Ok(out)
}
