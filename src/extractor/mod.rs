pub mod cascade;
pub mod language;
pub mod metadata;
pub mod model;
pub mod normalizer;
pub mod quality;
pub mod rules;
pub mod scorer;

#[cfg(test)]
mod tests;

pub use cascade::{NoContentFound, SelectorReport, select_best_candidate};
pub use model::{ContentCandidate, ExtractionResult, Metadata, Quality, QualityFlag};
pub use normalizer::NormalizedDocument;
pub use rules::{CascadeConfig, SelectorRule};

use tracing::warn;

use crate::fetcher::types::RawDocument;

/// Run the DOM half of the pipeline on an already-fetched page.
///
/// Synchronous on purpose: the parsed tree is not `Send`, so it must never be
/// held across an `.await`.
pub fn extract(
    raw: &RawDocument,
    config: &CascadeConfig,
) -> Result<ExtractionResult, NoContentFound> {
    // 1. Parse and strip noise
    let document = normalize(raw, config);

    // 2. First qualifying region wins
    let candidate = select_best_candidate(&document, config)?;

    // 3. Metadata from the whole document
    let metadata = metadata::extract_metadata(&document);

    Ok(assemble(raw, candidate, metadata, config))
}

/// Per-selector report for cascade tuning; does not pick a winner.
pub fn diagnose(raw: &RawDocument, config: &CascadeConfig) -> Vec<SelectorReport> {
    cascade::diagnose(&normalize(raw, config), config)
}

fn normalize(raw: &RawDocument, config: &CascadeConfig) -> NormalizedDocument {
    NormalizedDocument::parse(&raw.html, raw.url_final.clone(), config.compiled_noise())
}

fn assemble(
    raw: &RawDocument,
    candidate: ContentCandidate,
    metadata: Metadata,
    config: &CascadeConfig,
) -> ExtractionResult {
    let word_count = model::word_count(&candidate.text);
    let quality = quality::assess(&candidate.text, word_count, config.low_word_count);
    if quality.low_confidence {
        warn!(
            url = %raw.url_final,
            word_count,
            flags = ?quality.flags,
            "extracted content is low confidence"
        );
    }

    ExtractionResult {
        url: raw.url_final.clone(),
        title: metadata.title,
        author: metadata.author,
        publish_date: metadata.publish_date,
        language: language::detect_language(&candidate.text),
        word_count,
        selector: candidate.rule.selector,
        rank: candidate.rule.rank,
        content: candidate.text,
        site_name: metadata.site_name,
        description: metadata.description,
        canonical_url: metadata.canonical_url,
        quality,
        fetched_at: raw.fetched_at,
    }
}
