use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One watched-movie event as parsed from the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchEntry {
    pub title: String,
    pub viewer: String,
    pub year: i32,
    pub month: u32, // 1-12
    /// First day of the watch month.
    pub watch_date: NaiveDate,
}

impl WatchEntry {
    /// `None` when year and month do not name a calendar month.
    pub fn new(title: impl Into<String>, viewer: impl Into<String>, year: i32, month: u32) -> Option<Self> {
        let watch_date = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self {
            title: title.into(),
            viewer: viewer.into(),
            year,
            month,
            watch_date,
        })
    }
}

/// A parsed entry with the lookup results attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichedEntry {
    #[serde(flatten)]
    pub entry: WatchEntry,
    pub tmdb_id: Option<i64>,
    pub release_year: i32, // 0 when unknown
}

impl EnrichedEntry {
    pub fn new(entry: WatchEntry, tmdb_id: Option<i64>, release_year: i32) -> Self {
        Self {
            entry,
            tmdb_id,
            release_year,
        }
    }

    /// Entry that skipped the lookup or whose lookup failed.
    pub fn unmatched(entry: WatchEntry) -> Self {
        Self::new(entry, None, 0)
    }
}
