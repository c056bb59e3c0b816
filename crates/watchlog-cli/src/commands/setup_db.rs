use super::RunContext;
use crate::output::Output;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde_json::json;
use watchlog_core::PgMovieStore;

pub async fn run_setup_db(ctx: &RunContext, output: &Output) -> Result<()> {
    let settings = ctx.load_settings()?;
    let url = settings.database_url()?;
    let table = &settings.config.database.table;

    // The id conflict clause only matters for inserts
    let store = PgMovieStore::connect(url, table, false)
        .await
        .wrap_err("Failed to connect to the database")?;
    let result = store.ensure_schema().await;
    store.close().await;
    result.wrap_err_with(|| format!("Failed to create table '{}'", table))?;

    match output.format() {
        crate::output::OutputFormat::Human => output.success(format!("Table '{}' is ready", table)),
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            output.json(&json!({
                "success": true,
                "table": table,
            }));
        }
    }
    Ok(())
}
