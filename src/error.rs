use thiserror::Error;

use crate::extractor::NoContentFound;
use crate::fetcher::FetchError;

/// Every way a single extraction can end without a result.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The page could not be fetched: transport failure or non-2xx status.
    #[error(transparent)]
    Fetch(FetchError),

    #[error("no content found")]
    NoContentFound,

    #[error("extraction cancelled")]
    Cancelled,
}

impl ExtractionError {
    /// HTTP status when the page answered with a non-2xx response.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Fetch(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Fetch(err) if err.is_network())
    }
}

impl From<FetchError> for ExtractionError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::Fetch(other),
        }
    }
}

impl From<NoContentFound> for ExtractionError {
    fn from(_: NoContentFound) -> Self {
        Self::NoContentFound
    }
}
