pub mod entry;
pub mod movie_row;

pub use entry::{EnrichedEntry, WatchEntry};
pub use movie_row::{MovieRow, IMPORT_SOURCE};
