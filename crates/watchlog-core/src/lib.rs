pub mod enrich;
pub mod error;
pub mod months;
pub mod parser;
pub mod persist;
pub mod pg_store;
pub mod pipeline;
pub mod progress;
pub mod row_id;

pub use enrich::{Enricher, LookupOutcome};
pub use error::{ParseError, StoreError};
pub use months::MonthTable;
pub use parser::{clean_title, parse_log, ParseReport, ParserOptions, SkipReason, SkippedLine, UnknownMonth, BUNDLED_LOG};
pub use persist::{InsertFailure, InsertOutcome, MovieStore, PersistReport, Persister};
pub use pg_store::{redact_postgres_url, PgMovieStore};
pub use pipeline::{ImportOptions, ImportOrchestrator, ImportSummary};
pub use progress::{NoProgress, ProgressSink, Stage, StageCounts};
pub use row_id::RowIdGenerator;
