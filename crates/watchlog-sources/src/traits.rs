use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::LookupError;

/// Best match for a title search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieMatch {
    pub tmdb_id: i64,
    pub release_year: i32, // 0 when the service has no release date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[async_trait]
pub trait MovieLookup: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Search by free-text title. `Ok(None)` means the search ran but found nothing.
    async fn search_movie(&self, title: &str) -> Result<Option<MovieMatch>, LookupError>;
}
