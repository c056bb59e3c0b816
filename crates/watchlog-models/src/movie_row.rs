use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::entry::EnrichedEntry;

/// Source label written for rows created by the log importer.
pub const IMPORT_SOURCE: &str = "import";

/// A row of the `movies` table, exactly as it is inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRow {
    pub id: String,
    pub title: String,
    pub person: String,
    pub year: i32,
    pub month: i32,
    pub watched_at: NaiveDate,
    pub tmdb_id: Option<i64>,
    pub release_year: i32,
    pub source: String,
}

impl MovieRow {
    pub fn from_entry(id: String, enriched: &EnrichedEntry, source: &str) -> Self {
        Self {
            id,
            title: enriched.entry.title.clone(),
            person: enriched.entry.viewer.clone(),
            year: enriched.entry.year,
            month: enriched.entry.month as i32,
            watched_at: enriched.entry.watch_date,
            tmdb_id: enriched.tmdb_id,
            release_year: enriched.release_year,
            source: source.to_string(),
        }
    }
}
