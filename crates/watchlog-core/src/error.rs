use crate::months::SUPPORTED_LOCALES;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported month locale '{0}' (supported: {})", SUPPORTED_LOCALES.join(", "))]
    UnsupportedLocale(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("could not prepare schema: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("transaction failed: {0}")]
    Transaction(#[source] sqlx::Error),

    #[error("insert rejected: {0}")]
    Insert(#[source] sqlx::Error),

    #[error("{0}")]
    Other(String),
}
