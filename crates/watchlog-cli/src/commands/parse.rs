use super::{read_input, RunContext};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use std::collections::BTreeSet;
use std::path::PathBuf;
use watchlog_config::Settings;
use watchlog_core::{ImportOrchestrator, SkipReason, SkippedLine, UnknownMonth};

pub fn run_parse(ctx: &RunContext, input: Option<PathBuf>, output: &Output) -> Result<()> {
    let config = ctx.load_config()?;
    // Parsing needs no secrets
    let settings = Settings {
        database_url: None,
        tmdb_api_key: None,
        config,
    };
    let orchestrator = ImportOrchestrator::new(settings).map_err(|e| eyre!("{}", e))?;

    let text = read_input(input.as_deref())?;
    let report = orchestrator.parse(&text);

    if !output.is_human() {
        output.json(&serde_json::to_value(&report)?);
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Month").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Viewer").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for entry in &report.entries {
        table.add_row(vec![
            Cell::new(entry.year),
            Cell::new(entry.month),
            Cell::new(&entry.viewer),
            Cell::new(&entry.title),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);

    print_parse_warnings(output, &report.skipped, &report.unknown_months, &report.unknown_viewers);
    output.success(format!(
        "Parsed {} movies under {} year header(s)",
        report.entries.len(),
        report.year_headers
    ));
    Ok(())
}

/// Human-readable list of everything the parser let through with a default or dropped.
pub fn print_parse_warnings(
    output: &Output,
    skipped: &[SkippedLine],
    unknown_months: &[UnknownMonth],
    unknown_viewers: &BTreeSet<String>,
) {
    for line in skipped {
        let reason = match line.reason {
            SkipReason::Unmatched => "not a movie line",
            SkipReason::NoYearHeader => "before any year header",
            SkipReason::InvalidDate => "no valid date",
        };
        output.warn(format!("Skipped line {} ({}): {}", line.line_number, reason, line.line));
    }
    for month in unknown_months {
        output.warn(format!(
            "Unknown month '{}' on line {}, recorded as January",
            month.month, month.line_number
        ));
    }
    if !unknown_viewers.is_empty() {
        let names: Vec<&str> = unknown_viewers.iter().map(String::as_str).collect();
        output.warn(format!("Viewers not in the known list: {}", names.join(", ")));
    }
}
