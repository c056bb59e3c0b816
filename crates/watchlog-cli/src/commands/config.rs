use super::RunContext;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use watchlog_core::redact_postgres_url;

pub fn show_config(ctx: &RunContext, full: bool, output: &Output) -> Result<()> {
    let config_file = ctx.config_file_path();
    let env_path = ctx.env_file_path();
    let env_found = env_path.exists();
    let settings = ctx.load_settings()?;

    let database_url = settings.database_url.as_deref().map(|url| {
        if full {
            url.to_string()
        } else {
            redact_postgres_url(url)
        }
    });
    let api_key = settings
        .tmdb_api_key
        .as_deref()
        .map(|key| if full { key.to_string() } else { mask_string(key) });

    match output.format() {
        crate::output::OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let mut files = Table::new();
            files.set_header(vec![
                Cell::new("Files").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
            ]);
            files.add_row(vec![
                Cell::new("Config File"),
                Cell::new(config_file.display().to_string()),
                Cell::new(found_marker(config_file.exists())),
            ]);
            files.add_row(vec![
                Cell::new("Env File"),
                Cell::new(env_path.display().to_string()),
                Cell::new(found_marker(env_found)),
            ]);
            print_table(files);

            let mut secrets = Table::new();
            secrets.set_header(vec![
                Cell::new("Connection").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
            ]);
            secrets.add_row(vec![Cell::new("POSTGRES_URL"), Cell::new(or_not_set(database_url.as_deref()))]);
            secrets.add_row(vec![Cell::new("TMDB_API_KEY"), Cell::new(or_not_set(api_key.as_deref()))]);
            print_table(secrets);

            let config = &settings.config;
            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Import Settings").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("TMDB Base URL"), Cell::new(&config.tmdb.base_url)]);
            table.add_row(vec![Cell::new("TMDB Language"), Cell::new(&config.tmdb.language)]);
            table.add_row(vec![
                Cell::new("Request Delay"),
                Cell::new(format!("{} ms", config.tmdb.request_delay_ms)),
            ]);
            table.add_row(vec![Cell::new("Month Names"), Cell::new(&config.import.month_locale)]);
            table.add_row(vec![Cell::new("Known Viewers"), Cell::new(config.import.known_viewers.join(", "))]);
            table.add_row(vec![Cell::new("Row Ids"), Cell::new(config.import.id_strategy.as_str())]);
            table.add_row(vec![Cell::new("Source Label"), Cell::new(&config.import.source)]);
            table.add_row(vec![Cell::new("Table"), Cell::new(&config.database.table)]);
            print_table(table);
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "env_file": env_path.display().to_string(),
                "env_file_found": env_found,
                "postgres_url": database_url,
                "tmdb_api_key": api_key,
                "config": serde_json::to_value(&settings.config)?,
            }));
        }
    }

    Ok(())
}

fn print_table(mut table: Table) {
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
    println!();
}

fn found_marker(found: bool) -> String {
    if found {
        "✓".green().to_string()
    } else {
        "not found".bright_black().to_string()
    }
}

fn or_not_set(value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_else(|| "<not set>".to_string())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("0123456789abcdef"), "01***ef");
    }

    #[test]
    fn test_or_not_set() {
        assert_eq!(or_not_set(None), "<not set>");
        assert_eq!(or_not_set(Some("x")), "x");
    }
}
