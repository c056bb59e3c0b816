use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;
use watchlog_config::IdStrategy;
use watchlog_models::EnrichedEntry;

const ID_PREFIX: &str = "import";
const RANDOM_SUFFIX_LEN: usize = 5;

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"))
}

/// Produces the primary key for each inserted row.
#[derive(Debug, Clone, Copy)]
pub struct RowIdGenerator {
    strategy: IdStrategy,
}

impl RowIdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy }
    }

    pub fn next_id(&self, entry: &EnrichedEntry) -> String {
        match self.strategy {
            IdStrategy::Timestamped => timestamped_id(Utc::now()),
            IdStrategy::Content => content_id(entry),
        }
    }
}

/// `import-<unix-seconds>-<5 hex chars>`
pub fn timestamped_id(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", ID_PREFIX, now.timestamp(), &random[..RANDOM_SUFFIX_LEN])
}

/// `import-<year>-<month>-<slug>`; the same log line always maps to the same id.
pub fn content_id(entry: &EnrichedEntry) -> String {
    format!(
        "{}-{}-{}-{}",
        ID_PREFIX,
        entry.entry.year,
        entry.entry.month,
        slugify(&entry.entry.title)
    )
}

/// Lowercase, then collapse every run outside `[a-z0-9]` into a single `-`.
pub fn slugify(title: &str) -> String {
    slug_re().replace_all(&title.to_lowercase(), "-").into_owned()
}
