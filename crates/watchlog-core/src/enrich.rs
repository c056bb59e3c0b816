use std::time::Duration;
use tracing::{debug, warn};
use watchlog_models::{EnrichedEntry, WatchEntry};
use watchlog_sources::MovieLookup;
use crate::progress::{ProgressSink, ProgressTracker, Stage, StageCounts};

/// Outcome of a single lookup, before it is folded into the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Matched,
    NoResults,
    Failed,
}

/// Attaches TMDB id and release year to parsed entries, one request at a time.
pub struct Enricher {
    lookup: Box<dyn MovieLookup>,
    request_delay: Duration,
}

impl Enricher {
    pub fn new(lookup: Box<dyn MovieLookup>, request_delay: Duration) -> Self {
        Self { lookup, request_delay }
    }

    /// Never fails: lookup errors are logged and the entry keeps a null id and release year 0.
    pub async fn enrich(&self, entry: WatchEntry) -> (EnrichedEntry, LookupOutcome) {
        let (tmdb_id, release_year, outcome) = match self.lookup.search_movie(&entry.title).await {
            Ok(Some(found)) => {
                debug!(
                    "{} match for '{}': id {} ({})",
                    self.lookup.provider_name(), entry.title, found.tmdb_id, found.release_year
                );
                (Some(found.tmdb_id), found.release_year, LookupOutcome::Matched)
            }
            Ok(None) => {
                debug!("No {} results for '{}'", self.lookup.provider_name(), entry.title);
                (None, 0, LookupOutcome::NoResults)
            }
            Err(e) => {
                warn!("Error searching {} for '{}': {}", self.lookup.provider_name(), entry.title, e);
                (None, 0, LookupOutcome::Failed)
            }
        };

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        (EnrichedEntry::new(entry, tmdb_id, release_year), outcome)
    }

    pub async fn enrich_all(
        &self,
        entries: Vec<WatchEntry>,
        progress: &dyn ProgressSink,
    ) -> (Vec<EnrichedEntry>, StageCounts) {
        let total = entries.len();
        let mut tracker = ProgressTracker::new(Stage::Lookup, total, 25);
        let mut enriched = Vec::with_capacity(total);
        progress.stage_started(Stage::Lookup, total);

        for (idx, entry) in entries.into_iter().enumerate() {
            let current = idx + 1;
            debug!("[{}/{}] Looking up: {}", current, total, entry.title);
            let title = entry.title.clone();

            let (result, outcome) = self.enrich(entry).await;
            match outcome {
                LookupOutcome::Matched => tracker.record_succeeded(),
                LookupOutcome::NoResults => tracker.record_missing(),
                LookupOutcome::Failed => tracker.record_failed_with_error("lookup"),
            }
            enriched.push(result);

            tracker.log_progress(current);
            progress.item_done(Stage::Lookup, current, &title);
        }

        progress.stage_finished(Stage::Lookup);
        (enriched, tracker.finish())
    }
}

/// Used when lookups are switched off: every entry gets a null id and release year 0.
pub fn without_lookup(entries: Vec<WatchEntry>) -> Vec<EnrichedEntry> {
    entries.into_iter().map(EnrichedEntry::unmatched).collect()
}
