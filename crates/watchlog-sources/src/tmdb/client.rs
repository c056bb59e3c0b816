use async_trait::async_trait;
use reqwest::{Client, Request};
use std::time::Duration;
use watchlog_config::TmdbConfig;
use crate::error::LookupError;
use crate::tmdb::api;
use crate::traits::{MovieLookup, MovieMatch};

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(api_key: String, config: &TmdbConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("watchlog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            language: config.language.clone(),
        })
    }

    fn search_request(&self, title: &str) -> Result<Request, LookupError> {
        api::search_request(&self.client, &self.base_url, &self.api_key, title, &self.language)
    }
}

#[async_trait]
impl MovieLookup for TmdbClient {
    fn provider_name(&self) -> &str {
        "tmdb"
    }

    async fn search_movie(&self, title: &str) -> Result<Option<MovieMatch>, LookupError> {
        let request = self.search_request(title)?;
        let response = api::search_movie(&self.client, request, title).await?;
        api::first_match(response)
    }
}
