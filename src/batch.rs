use std::panic;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use crate::{error::ExtractionError, extractor::ExtractionResult, pipeline::Extractor};

/// Outcome for one URL of a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub url: String,
    pub result: Result<ExtractionResult, ExtractionError>,
}

/// Extract many URLs with at most `concurrency` in flight.
///
/// Results come back in input order. Once `cancel` fires, extractions still
/// waiting for a permit or mid-fetch finish as [`ExtractionError::Cancelled`].
/// Nothing is retried. A panic inside an extraction is re-raised on the
/// caller's task.
pub async fn extract_batch(
    extractor: &Extractor,
    urls: Vec<String>,
    concurrency: usize,
    cancel: CancellationToken,
) -> Vec<BatchItem> {
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    info!(urls = urls.len(), concurrency, "starting batch extraction");

    let handles: Vec<_> = urls
        .iter()
        .cloned()
        .map(|url| {
            let extractor = extractor.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();
            let span = info_span!("batch_item", url = %url);

            tokio::spawn(
                async move {
                    let permit = tokio::select! {
                        _ = cancel.cancelled() => return Err(ExtractionError::Cancelled),
                        permit = semaphore.acquire_owned() => permit,
                    };
                    // Hold the permit until the extraction completes
                    let _permit = permit.map_err(|_| ExtractionError::Cancelled)?;
                    extractor.extract_cancellable(&url, &cancel).await
                }
                .instrument(span),
            )
        })
        .collect();

    let mut items = Vec::with_capacity(handles.len());
    for (url, handle) in urls.into_iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                error!(%url, "extraction task panicked");
                panic::resume_unwind(join_error.into_panic());
            }
            Err(join_error) => {
                warn!(%url, error = %join_error, "extraction task cancelled");
                Err(ExtractionError::Cancelled)
            }
        };
        items.push(BatchItem { url, result });
    }

    let succeeded = items.iter().filter(|item| item.result.is_ok()).count();
    info!(succeeded, failed = items.len() - succeeded, "batch extraction finished");
    items
}
