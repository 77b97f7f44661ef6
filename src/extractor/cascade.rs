use scraper::Selector;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::extractor::{
    model::ContentCandidate,
    normalizer::NormalizedDocument,
    rules::{CascadeConfig, SelectorRule},
    scorer,
};

const PREVIEW_CHARS: usize = 200;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no selector produced qualifying content")]
pub struct NoContentFound;

/// Outcome of evaluating one rule against a document.
#[derive(Debug)]
pub enum RuleOutcome {
    /// The selector failed to parse; treated like a miss.
    Invalid,
    NoMatch,
    Scored(ContentCandidate),
}

/// Evaluate a single rule: first matching element, scored.
pub fn evaluate(
    document: &NormalizedDocument,
    rule: &SelectorRule,
    selector: Option<&Selector>,
    config: &CascadeConfig,
) -> RuleOutcome {
    let Some(selector) = selector else {
        debug!(selector = %rule.selector, "content selector did not parse");
        return RuleOutcome::Invalid;
    };

    match document.select(selector).next() {
        Some(region) => RuleOutcome::Scored(scorer::score(region, rule, config)),
        None => RuleOutcome::NoMatch,
    }
}

/// Walk the cascade in rank order and return the first candidate whose text
/// is longer than `config.qualify_chars`.
///
/// A rule that matches but does not qualify never stops the walk; a later,
/// more generic rule can still win.
pub fn select_best_candidate(
    document: &NormalizedDocument,
    config: &CascadeConfig,
) -> Result<ContentCandidate, NoContentFound> {
    for (rule, selector) in config.compiled_rules() {
        let candidate = match evaluate(document, rule, selector, config) {
            RuleOutcome::Scored(candidate) => candidate,
            RuleOutcome::NoMatch | RuleOutcome::Invalid => continue,
        };

        let qualifies = candidate.char_length > config.qualify_chars;
        debug!(
            selector = %rule.selector,
            rank = rule.rank,
            char_length = candidate.char_length,
            word_count = candidate.word_count,
            qualifies,
            strong = candidate.char_length > config.strong_chars,
            "scored candidate"
        );

        if qualifies {
            info!(
                selector = %rule.selector,
                rank = rule.rank,
                word_count = candidate.word_count,
                "selected content region"
            );
            return Ok(candidate);
        }
    }

    Err(NoContentFound)
}

/// Per-rule report used to tune the cascade offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorReport {
    pub rank: u32,
    pub selector: String,
    pub matched: bool,
    pub char_length: usize,
    pub word_count: usize,
    pub qualifies: bool,
    pub strong: bool,
    pub preview: String,
}

/// Evaluate every rule without committing to a choice.
pub fn diagnose(document: &NormalizedDocument, config: &CascadeConfig) -> Vec<SelectorReport> {
    config
        .compiled_rules()
        .map(|(rule, selector)| match evaluate(document, rule, selector, config) {
            RuleOutcome::Scored(candidate) => SelectorReport {
                rank: rule.rank,
                selector: rule.selector.clone(),
                matched: true,
                char_length: candidate.char_length,
                word_count: candidate.word_count,
                qualifies: candidate.char_length > config.qualify_chars,
                strong: candidate.char_length > config.strong_chars,
                preview: candidate.text.chars().take(PREVIEW_CHARS).collect(),
            },
            RuleOutcome::NoMatch | RuleOutcome::Invalid => SelectorReport {
                rank: rule.rank,
                selector: rule.selector.clone(),
                matched: false,
                char_length: 0,
                word_count: 0,
                qualifies: false,
                strong: false,
                preview: String::new(),
            },
        })
        .collect()
}
