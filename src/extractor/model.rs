use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::extractor::rules::SelectorRule;

/// Text recovered from one matched region by the scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCandidate {
    pub rule: SelectorRule,
    pub text: String,
    pub char_length: usize,
    pub word_count: usize,
}

impl ContentCandidate {
    pub fn new(rule: SelectorRule, text: String) -> Self {
        Self {
            char_length: text.chars().count(),
            word_count: word_count(&text),
            rule,
            text,
        }
    }
}

/// Metadata recovered from the whole document, independent of the content region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    pub site_name: Option<String>,
    pub description: Option<String>,
    pub canonical_url: Option<Url>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    /// Fewer words than downstream consumers usually need.
    LowWordCount,
    /// Text dominated by cookie banners, sign-up prompts and similar chrome.
    BoilerplateHeavy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    pub low_confidence: bool,
    pub flags: Vec<QualityFlag>,
}

/// The only value handed back to callers. Immutable once assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub url: Url,
    pub title: String,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    pub content: String,
    pub word_count: usize,
    pub selector: String,
    pub rank: u32,
    pub site_name: Option<String>,
    pub description: Option<String>,
    pub canonical_url: Option<Url>,
    pub language: Option<String>,
    pub quality: Quality,
    pub fetched_at: DateTime<Utc>,
}

impl ExtractionResult {
    pub fn is_low_confidence(&self) -> bool {
        self.quality.low_confidence
    }
}

/// Whitespace-delimited tokens, empty tokens excluded.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
