use serde::Serialize;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use watchlog_config::Settings;
use watchlog_models::MovieRow;
use watchlog_sources::{MovieLookup, TmdbClient};
use crate::enrich::{self, Enricher};
use crate::error::{ParseError, StoreError};
use crate::months::MonthTable;
use crate::parser::{parse_log, ParseReport, ParserOptions, SkippedLine, UnknownMonth};
use crate::persist::{MovieStore, PersistReport, Persister};
use crate::pg_store::PgMovieStore;
use crate::progress::{ProgressSink, StageCounts};
use crate::row_id::RowIdGenerator;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ImportOptions {
    /// Parse and enrich, but return the rows instead of writing them.
    pub dry_run: bool,
    pub skip_lookup: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub parsed: usize,
    pub skipped_lines: Vec<SkippedLine>,
    pub unknown_months: Vec<UnknownMonth>,
    pub unknown_viewers: BTreeSet<String>,
    pub lookup: Option<StageCounts>,
    pub insert: Option<PersistReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dry_run_rows: Vec<MovieRow>,
    pub duration_seconds: f64,
}

impl ImportSummary {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds)
    }

    pub fn inserted(&self) -> usize {
        self.insert.as_ref().map(|r| r.counts.succeeded).unwrap_or(0)
    }

    pub fn failed_inserts(&self) -> usize {
        self.insert.as_ref().map(|r| r.counts.failed).unwrap_or(0)
    }
}

/// Runs parse → lookup → insert strictly in order, one item at a time.
pub struct ImportOrchestrator {
    settings: Settings,
    options: ImportOptions,
    months: MonthTable,
    parser_options: ParserOptions,
    persister: Persister,
}

impl ImportOrchestrator {
    pub fn new(settings: Settings) -> Result<Self, ParseError> {
        let months = MonthTable::for_locale(&settings.config.import.month_locale)?;
        let parser_options = ParserOptions {
            known_viewers: settings.config.import.known_viewers.clone(),
        };
        let persister = Persister::new(
            RowIdGenerator::new(settings.config.import.id_strategy),
            settings.config.import.source.clone(),
        );

        Ok(Self {
            settings,
            options: ImportOptions::default(),
            months,
            parser_options,
            persister,
        })
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse(&self, text: &str) -> ParseReport {
        parse_log(text, &self.months, &self.parser_options)
    }

    /// Lookup client from the settings. `None` when lookups are off or no API key is configured.
    pub fn build_lookup(&self) -> anyhow::Result<Option<Box<dyn MovieLookup>>> {
        if self.options.skip_lookup {
            info!("Lookups disabled, release years will be 0");
            return Ok(None);
        }
        match self.settings.tmdb_api_key() {
            Ok(key) => {
                let client = TmdbClient::new(key.to_string(), &self.settings.config.tmdb)?;
                Ok(Some(Box::new(client)))
            }
            Err(e) => {
                warn!("{}; continuing without lookups", e);
                Ok(None)
            }
        }
    }

    /// Connection failure here is the one fatal error of a run.
    pub async fn connect_store(&self) -> anyhow::Result<PgMovieStore> {
        let url = self.settings.database_url()?;
        let skip_existing = self.settings.config.import.id_strategy == watchlog_config::IdStrategy::Content;
        let store = PgMovieStore::connect(url, &self.settings.config.database.table, skip_existing).await?;
        Ok(store)
    }

    /// Full run. `store` is ignored in dry-run mode and required otherwise.
    #[instrument(skip_all, fields(dry_run = self.options.dry_run))]
    pub async fn run<S: MovieStore + ?Sized>(
        &self,
        text: &str,
        lookup: Option<Box<dyn MovieLookup>>,
        store: Option<&mut S>,
        progress: &dyn ProgressSink,
    ) -> Result<ImportSummary, StoreError> {
        let start = Instant::now();

        let report = self.parse(text);
        info!("Found {} movies", report.entries.len());
        if report.has_warnings() {
            warn!(
                "Parse warnings: {} skipped line(s), {} unknown month(s), {} unknown viewer(s)",
                report.skipped.len(),
                report.unknown_months.len(),
                report.unknown_viewers.len()
            );
        }
        let ParseReport { entries, skipped, unknown_months, unknown_viewers, .. } = report;
        let parsed = entries.len();

        let (enriched, lookup_counts) = match lookup {
            Some(lookup) => {
                let delay = Duration::from_millis(self.settings.config.tmdb.request_delay_ms);
                let enricher = Enricher::new(lookup, delay);
                let (enriched, counts) = enricher.enrich_all(entries, progress).await;
                (enriched, Some(counts))
            }
            None => (enrich::without_lookup(entries), None),
        };

        let mut summary = ImportSummary {
            parsed,
            skipped_lines: skipped,
            unknown_months,
            unknown_viewers,
            lookup: lookup_counts,
            insert: None,
            dry_run_rows: Vec::new(),
            duration_seconds: 0.0,
        };

        if self.options.dry_run {
            summary.dry_run_rows = self.persister.rows(&enriched);
            info!("Dry run: {} rows prepared, nothing written", summary.dry_run_rows.len());
        } else {
            let store = store.ok_or_else(|| StoreError::Other("no database store for a write run".to_string()))?;
            summary.insert = Some(self.persister.persist_all(store, &enriched, progress).await);
        }

        summary.duration_seconds = start.elapsed().as_secs_f64();
        info!("Finished in {:.1}s", summary.duration_seconds);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::InsertOutcome;
    use crate::progress::NoProgress;
    use async_trait::async_trait;
    use watchlog_config::{Config, IdStrategy};
    use watchlog_sources::{LookupError, MovieMatch};

    struct TitleLengthLookup;

    #[async_trait]
    impl MovieLookup for TitleLengthLookup {
        fn provider_name(&self) -> &str {
            "fake"
        }

        async fn search_movie(&self, title: &str) -> Result<Option<MovieMatch>, LookupError> {
            if title.contains("Fail") {
                return Err(LookupError::InvalidReleaseDate("??".to_string()));
            }
            Ok(Some(MovieMatch {
                tmdb_id: title.len() as i64,
                release_year: 2000,
                title: None,
            }))
        }
    }

    #[derive(Default)]
    struct VecStore {
        rows: Vec<MovieRow>,
    }

    #[async_trait]
    impl MovieStore for VecStore {
        async fn insert(&mut self, row: &MovieRow) -> Result<InsertOutcome, StoreError> {
            if row.title == "Reject Me" {
                return Err(StoreError::Other("rejected".to_string()));
            }
            self.rows.push(row.clone());
            Ok(InsertOutcome::Inserted)
        }
    }

    fn settings() -> Settings {
        let mut config = Config::default();
        config.tmdb.request_delay_ms = 0;
        config.import.id_strategy = IdStrategy::Content;
        Settings {
            database_url: None,
            tmdb_api_key: None,
            config,
        }
    }

    const LOG: &str = "2021\n\nSeven (Mikkis) - Helmikuu\nFail Movie (Aino) - Maaliskuu\nnot an entry\n2022\nReject Me (Tomi) - Smarch\nKlaus (Mikkis) - Joulukuu\n";

    #[tokio::test]
    async fn test_full_run() {
        let orchestrator = ImportOrchestrator::new(settings()).unwrap();
        let mut store = VecStore::default();

        let summary = orchestrator
            .run(LOG, Some(Box::new(TitleLengthLookup)), Some(&mut store), &NoProgress)
            .await
            .unwrap();

        assert_eq!(summary.parsed, 4);
        assert_eq!(summary.skipped_lines.len(), 1);
        assert_eq!(summary.unknown_months.len(), 1);
        let lookup = summary.lookup.as_ref().unwrap();
        assert_eq!(lookup.succeeded, 3);
        assert_eq!(lookup.failed, 1);
        assert_eq!(summary.inserted(), 3);
        assert_eq!(summary.failed_inserts(), 1);

        let klaus = store.rows.iter().find(|r| r.title == "Klaus").unwrap();
        assert_eq!(klaus.id, "import-2022-12-klaus");
        assert_eq!(klaus.tmdb_id, Some(5));
        let failed_lookup = store.rows.iter().find(|r| r.title == "Fail Movie").unwrap();
        assert_eq!(failed_lookup.tmdb_id, None);
        assert_eq!(failed_lookup.release_year, 0);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let orchestrator = ImportOrchestrator::new(settings()).unwrap().with_options(ImportOptions {
            dry_run: true,
            skip_lookup: true,
        });

        let summary = orchestrator
            .run::<VecStore>(LOG, None, None, &NoProgress)
            .await
            .unwrap();

        assert!(summary.insert.is_none());
        assert!(summary.lookup.is_none());
        assert_eq!(summary.dry_run_rows.len(), 4);
        assert!(summary.dry_run_rows.iter().all(|r| r.tmdb_id.is_none() && r.release_year == 0));
        assert_eq!(summary.dry_run_rows[0].watched_at.to_string(), "2021-02-01");
    }

    #[tokio::test]
    async fn test_write_run_requires_store() {
        let orchestrator = ImportOrchestrator::new(settings()).unwrap();
        let result = orchestrator.run::<VecStore>(LOG, None, None, &NoProgress).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_api_key_disables_lookup() {
        let orchestrator = ImportOrchestrator::new(settings()).unwrap();
        assert!(orchestrator.build_lookup().unwrap().is_none());

        let mut with_key = settings();
        with_key.tmdb_api_key = Some("key".to_string());
        let orchestrator = ImportOrchestrator::new(with_key).unwrap();
        assert!(orchestrator.build_lookup().unwrap().is_some());
    }

    #[test]
    fn test_unsupported_locale_rejected() {
        let mut s = settings();
        s.config.import.month_locale = "de".to_string();
        assert!(ImportOrchestrator::new(s).is_err());
    }
}
