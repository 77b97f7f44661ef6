use crate::extractor::model::{Quality, QualityFlag};

const MAX_BOILERPLATE_RATIO: f64 = 0.3;

const BOILERPLATE_KEYWORDS: &[&str] = &[
    "cookie",
    "privacy",
    "terms",
    "policy",
    "gdpr",
    "consent",
    "accept",
    "decline",
    "preferences",
    "tracking",
    "advertisement",
    "subscribe",
    "newsletter",
    "login",
    "sign up",
    "register",
    "password",
    "access denied",
    "please wait",
    "enable javascript",
    "click here",
    "read more",
];

/// Grade extracted content. Never rejects: a flagged result is still
/// returned, and the caller decides whether it is good enough.
pub fn assess(content: &str, word_count: usize, low_word_count: usize) -> Quality {
    let mut flags = Vec::new();

    if word_count < low_word_count {
        flags.push(QualityFlag::LowWordCount);
    }
    if boilerplate_ratio(content, word_count) > MAX_BOILERPLATE_RATIO {
        flags.push(QualityFlag::BoilerplateHeavy);
    }

    Quality {
        low_confidence: !flags.is_empty(),
        flags,
    }
}

/// Keyword hits per word.
pub fn boilerplate_ratio(content: &str, word_count: usize) -> f64 {
    if word_count == 0 {
        return 0.0;
    }

    let lowered = content.to_lowercase();
    let hits: usize = BOILERPLATE_KEYWORDS
        .iter()
        .map(|keyword| lowered.matches(keyword).count())
        .sum();

    hits as f64 / word_count as f64
}
