use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};
use watchlog_models::{EnrichedEntry, MovieRow};
use crate::error::StoreError;
use crate::progress::{ProgressSink, ProgressTracker, Stage, StageCounts};
use crate::row_id::RowIdGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted,
    /// Row id existed already; only possible with content-derived ids.
    AlreadyPresent,
}

/// Destination for imported rows. Each insert is its own transaction.
#[async_trait]
pub trait MovieStore: Send {
    async fn insert(&mut self, row: &MovieRow) -> Result<InsertOutcome, StoreError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertFailure {
    pub id: String,
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistReport {
    pub counts: StageCounts,
    pub failures: Vec<InsertFailure>,
}

pub struct Persister {
    ids: RowIdGenerator,
    source: String,
}

impl Persister {
    pub fn new(ids: RowIdGenerator, source: impl Into<String>) -> Self {
        Self {
            ids,
            source: source.into(),
        }
    }

    pub fn row_for(&self, entry: &EnrichedEntry) -> MovieRow {
        MovieRow::from_entry(self.ids.next_id(entry), entry, &self.source)
    }

    /// Rows as they would be inserted, for dry runs.
    pub fn rows(&self, entries: &[EnrichedEntry]) -> Vec<MovieRow> {
        entries.iter().map(|e| self.row_for(e)).collect()
    }

    /// Insert every entry; a failed row is logged and the loop moves on.
    pub async fn persist_all<S: MovieStore + ?Sized>(
        &self,
        store: &mut S,
        entries: &[EnrichedEntry],
        progress: &dyn ProgressSink,
    ) -> PersistReport {
        let total = entries.len();
        let mut tracker = ProgressTracker::new(Stage::Insert, total, 50);
        let mut failures = Vec::new();
        progress.stage_started(Stage::Insert, total);
        info!("Inserting {} rows into database", total);

        for (idx, entry) in entries.iter().enumerate() {
            let current = idx + 1;
            let row = self.row_for(entry);

            match store.insert(&row).await {
                Ok(InsertOutcome::Inserted) => {
                    debug!("Inserted {} ({})", row.title, row.id);
                    tracker.record_succeeded();
                }
                Ok(InsertOutcome::AlreadyPresent) => {
                    debug!("Already present: {} ({})", row.title, row.id);
                    tracker.record_already_present();
                }
                Err(e) => {
                    warn!("Failed to insert {}: {}", row.title, e);
                    tracker.record_failed_with_error(error_category(&e));
                    failures.push(InsertFailure {
                        id: row.id.clone(),
                        title: row.title.clone(),
                        error: e.to_string(),
                    });
                }
            }

            tracker.log_progress(current);
            progress.item_done(Stage::Insert, current, &row.title);
        }

        progress.stage_finished(Stage::Insert);
        PersistReport {
            counts: tracker.finish(),
            failures,
        }
    }
}

fn error_category(e: &StoreError) -> &'static str {
    match e {
        StoreError::Connect(_) => "connection",
        StoreError::Schema(_) => "schema",
        StoreError::Transaction(_) => "transaction",
        StoreError::Insert(_) => "insert",
        StoreError::Other(_) => "other",
    }
}
