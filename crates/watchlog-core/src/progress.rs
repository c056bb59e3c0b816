use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Lookup,
    Insert,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lookup => write!(f, "Lookup"),
            Stage::Insert => write!(f, "Insert"),
        }
    }
}

/// Receives per-item progress; the CLI drives a progress bar from it.
pub trait ProgressSink: Send + Sync {
    fn stage_started(&self, _stage: Stage, _total: usize) {}
    fn item_done(&self, _stage: Stage, _current: usize, _label: &str) {}
    fn stage_finished(&self, _stage: Stage) {}
}

/// Sink that ignores everything.
pub struct NoProgress;

impl ProgressSink for NoProgress {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub total: usize,
    pub succeeded: usize,
    pub already_present: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Counts outcomes for one stage and logs periodic progress plus a final summary.
pub struct ProgressTracker {
    stage: Stage,
    counts: StageCounts,
    start_time: Instant,
    progress_interval: usize,
    last_progress_log: usize,
    error_counts: HashMap<String, usize>,
}

impl ProgressTracker {
    pub fn new(stage: Stage, total: usize, progress_interval: usize) -> Self {
        if total > 0 {
            info!("{}: {} items to process", stage, total);
        }
        Self {
            stage,
            counts: StageCounts { total, ..StageCounts::default() },
            start_time: Instant::now(),
            progress_interval: progress_interval.max(1),
            last_progress_log: 0,
            error_counts: HashMap::new(),
        }
    }

    pub fn record_succeeded(&mut self) {
        self.counts.succeeded += 1;
    }

    pub fn record_already_present(&mut self) {
        self.counts.already_present += 1;
    }

    /// Stage ran but produced nothing, e.g. a search without results.
    pub fn record_missing(&mut self) {
        self.counts.missing += 1;
    }

    pub fn record_failed_with_error(&mut self, error_category: &str) {
        self.counts.failed += 1;
        *self.error_counts.entry(error_category.to_string()).or_insert(0) += 1;
    }

    /// `current` is 1-based.
    pub fn log_progress(&mut self, current: usize) {
        if current - self.last_progress_log >= self.progress_interval || current == self.counts.total {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 { current as f64 / elapsed } else { 0.0 };
            info!(
                "{} progress: {}/{} ({:.1} items/sec) | OK: {} | Present: {} | Missing: {} | Failed: {}",
                self.stage, current, self.counts.total, rate,
                self.counts.succeeded, self.counts.already_present, self.counts.missing, self.counts.failed
            );
            self.last_progress_log = current;
        }
    }

    pub fn finish(self) -> StageCounts {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let c = &self.counts;
        if c.failed > 0 {
            warn!(
                "{} completed: {} total in {:.1}s | OK: {} | Present: {} | Missing: {} | Failed: {}",
                self.stage, c.total, elapsed, c.succeeded, c.already_present, c.missing, c.failed
            );

            let mut error_entries: Vec<_> = self.error_counts.iter().collect();
            error_entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let error_summary: Vec<String> = error_entries
                .iter()
                .map(|(category, count)| format!("{}: {}", category, count))
                .collect();
            info!("{} error breakdown: {}", self.stage, error_summary.join(", "));
        } else {
            info!(
                "{} completed: {} total in {:.1}s | OK: {} | Present: {} | Missing: {}",
                self.stage, c.total, elapsed, c.succeeded, c.already_present, c.missing
            );
        }
        self.counts
    }
}
