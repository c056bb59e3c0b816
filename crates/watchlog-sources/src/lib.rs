pub mod error;
pub mod tmdb;
pub mod traits;

pub use error::LookupError;
pub use tmdb::TmdbClient;
pub use traits::{MovieLookup, MovieMatch};
