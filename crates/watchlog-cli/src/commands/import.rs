use super::import_ui::ImportUI;
use super::parse::print_parse_warnings;
use super::{read_input, RunContext};
use crate::output::Output;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use std::path::PathBuf;
use watchlog_config::IdStrategy;
use watchlog_core::{ImportOptions, ImportOrchestrator, ImportSummary, PgMovieStore};
use watchlog_models::MovieRow;

pub struct ImportArgs {
    pub input: Option<PathBuf>,
    pub dry_run: bool,
    pub skip_lookup: bool,
    pub id_strategy: Option<IdStrategy>,
}

pub async fn run_import(ctx: &RunContext, args: ImportArgs, output: &Output) -> Result<()> {
    tracing::debug!("Import command started");

    let mut settings = ctx.load_settings()?;
    if let Some(strategy) = args.id_strategy {
        settings.config.import.id_strategy = strategy;
    }

    let text = read_input(args.input.as_deref())?;

    let orchestrator = ImportOrchestrator::new(settings)
        .map_err(|e| eyre!("{}", e))?
        .with_options(ImportOptions {
            dry_run: args.dry_run,
            skip_lookup: args.skip_lookup,
        });

    // Connect before any lookup so a bad URL fails the run immediately
    let mut store = if args.dry_run {
        None
    } else {
        let store = orchestrator
            .connect_store()
            .await
            .map_err(|e| eyre!("Failed to connect to the database: {:#}", e))?;
        Some(store)
    };

    let lookup = orchestrator
        .build_lookup()
        .map_err(|e| eyre!("Failed to create TMDB client: {:#}", e))?;

    let ui = ImportUI::new(output.is_quiet());
    let result = orchestrator.run::<PgMovieStore>(&text, lookup, store.as_mut(), &ui).await;

    if let Some(store) = store {
        store.close().await;
    }
    let summary = result.wrap_err("Import failed")?;

    match output.format() {
        crate::output::OutputFormat::Human => print_summary(&summary, output),
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            output.json(&serde_json::to_value(&summary)?);
        }
    }

    Ok(())
}

fn print_summary(summary: &ImportSummary, output: &Output) {
    if output.is_quiet() {
        // Row failures are errors and stay visible
        if let Some(insert) = &summary.insert {
            for failure in &insert.failures {
                output.error(format!("{} ({}): {}", failure.title, failure.id, failure.error));
            }
        }
        return;
    }

    print_parse_warnings(output, &summary.skipped_lines, &summary.unknown_months, &summary.unknown_viewers);

    match &summary.lookup {
        Some(lookup) => output.info(format!(
            "TMDB lookups: {} matched, {} without results, {} failed",
            lookup.succeeded, lookup.missing, lookup.failed
        )),
        None => output.info("TMDB lookups skipped, release years recorded as 0"),
    }

    let Some(insert) = &summary.insert else {
        if !summary.dry_run_rows.is_empty() {
            println!("{}", rows_table(&summary.dry_run_rows));
        }
        output.success(format!(
            "Dry run: {} of {} parsed movies prepared, nothing written, in {:?}",
            summary.dry_run_rows.len(),
            summary.parsed,
            summary.duration()
        ));
        return;
    };

    for failure in &insert.failures {
        output.error(format!("{} ({}): {}", failure.title, failure.id, failure.error));
    }
    if insert.counts.already_present > 0 {
        output.info(format!("{} rows were already present", insert.counts.already_present));
    }
    let message = format!(
        "Import completed: {} of {} movies inserted in {:?}",
        summary.inserted(),
        summary.parsed,
        summary.duration()
    );
    if summary.failed_inserts() > 0 {
        output.warn(format!("{} ({} failed)", message, summary.failed_inserts()));
    } else {
        output.success(message);
    }
}

fn rows_table(rows: &[MovieRow]) -> Table {
    let mut table = Table::new();
    table.set_header(
        ["Id", "Title", "Person", "Watched", "TMDB", "Released"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(comfy_table::Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.id),
            Cell::new(&row.title),
            Cell::new(&row.person),
            Cell::new(row.watched_at),
            Cell::new(row.tmdb_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(row.release_year),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}
