use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::{
    config::Config,
    error::ExtractionError,
    extractor::{self, CascadeConfig, ExtractionResult, SelectorReport},
    fetcher::{FetchError, Fetcher, PageSource, RawDocument, parse_url},
};

/// Stage of a single extraction, recorded in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Normalizing,
    Done,
    Failed,
}

/// Fetches a URL and turns it into an [`ExtractionResult`].
///
/// Cheap to clone and safe to share: the page source and cascade are
/// read-only, and every call owns its document.
#[derive(Clone)]
pub struct Extractor {
    source: Arc<dyn PageSource>,
    cascade: Arc<CascadeConfig>,
}

impl Extractor {
    pub fn new(source: Arc<dyn PageSource>, cascade: CascadeConfig) -> Self {
        Self {
            source,
            cascade: Arc::new(cascade),
        }
    }

    /// Production wiring: browser-like fetcher and default cascade.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(config.fetch())?;
        Ok(Self::new(Arc::new(fetcher), CascadeConfig::default()))
    }

    pub fn cascade(&self) -> &CascadeConfig {
        &self.cascade
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractionResult, ExtractionError> {
        self.extract_cancellable(url, &CancellationToken::new())
            .await
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn extract_cancellable(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ExtractionResult, ExtractionError> {
        let raw = self.fetch(url, cancel).await?;

        let result = self.process(&raw);
        match &result {
            Ok(extracted) => info!(
                stage = ?Stage::Done,
                selector = %extracted.selector,
                word_count = extracted.word_count,
                "extraction complete"
            ),
            Err(err) => info!(stage = ?Stage::Failed, error = %err, "extraction failed"),
        }
        result
    }

    /// Report how every configured selector fares on `url`.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn diagnose(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SelectorReport>, ExtractionError> {
        let raw = self.fetch(url, cancel).await?;
        Ok(extractor::diagnose(&raw, &self.cascade))
    }

    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<RawDocument, ExtractionError> {
        if cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }
        let url = parse_url(url)?;

        debug!(stage = ?Stage::Fetching);
        let raw = self.source.fetch(&url, cancel).await?;

        // A token that fired while the body was in flight still wins.
        if cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }
        Ok(raw)
    }

    // Synchronous: the parsed tree must not live across an await point.
    fn process(&self, raw: &RawDocument) -> Result<ExtractionResult, ExtractionError> {
        debug!(stage = ?Stage::Normalizing, bytes = raw.html.len());
        Ok(extractor::extract(raw, &self.cascade)?)
    }
}
