use scraper::Selector;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One entry of the selector cascade. Lower rank is tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorRule {
    pub selector: String,
    pub rank: u32,
}

impl SelectorRule {
    pub fn new(selector: impl Into<String>, rank: u32) -> Self {
        Self {
            selector: selector.into(),
            rank,
        }
    }
}

/// Site-family containers first, generic landmarks last. `.content` matches
/// plenty of unrelated chrome, so it only gets a chance once everything more
/// specific has failed to qualify.
const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    // documentation platforms
    ".theme-doc-markdown",
    ".markdown-body",
    ".rst-content",
    ".docs-content",
    ".documentation",
    ".doc-content",
    // article bodies
    "[itemprop='articleBody']",
    ".article-body",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".story-body",
    // generic
    "article",
    "[role='main']",
    "main",
    "#content",
    ".content",
];

const DEFAULT_NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "template",
    "iframe",
    "svg",
    "nav",
    "header",
    "footer",
    "aside",
    // WebForms and many CMS templates wrap the whole body in a <form>
    "form[role='search']",
    "form.search-form",
    "[role='search']",
    "[role='navigation']",
    "[role='banner']",
    "[role='contentinfo']",
    // advertising
    ".ad",
    ".ads",
    ".advert",
    ".advertisement",
    "[class*='advert']",
    "[id*='advert']",
    "[class^='ad-']",
    "[class*=' ad-']",
    ".sponsored",
    // social sharing
    ".share",
    ".sharing",
    ".social",
    "[class*='share-']",
    "[class*='social-']",
    // banners
    ".cookie-banner",
    ".newsletter",
];

/// Immutable configuration for one extraction: the ordered cascade, the noise
/// denylist and the thresholds the scorer and assembler apply.
///
/// Selectors are parsed once, here; entries that fail to parse are logged and
/// skipped at extraction time. Built once and shared read-only across
/// concurrent extractions.
#[derive(Debug, Clone)]
pub struct CascadeConfig {
    rules: Vec<SelectorRule>,
    compiled_rules: Vec<Option<Selector>>,
    noise_selectors: Vec<String>,
    compiled_noise: Vec<Selector>,
    /// A candidate qualifies when its text is longer than this many characters.
    pub qualify_chars: usize,
    /// Reported as "strong" in diagnostics; does not affect selection.
    pub strong_chars: usize,
    /// Fragments this short or shorter are dropped before joining.
    pub min_fragment_chars: usize,
    /// Results with fewer words are flagged low-confidence.
    pub low_word_count: usize,
}

impl CascadeConfig {
    fn build(rules: Vec<SelectorRule>, noise_selectors: Vec<String>) -> Self {
        let compiled_rules = rules
            .iter()
            .map(|rule| compile(&rule.selector, "content"))
            .collect();
        let compiled_noise = noise_selectors
            .iter()
            .filter_map(|raw| compile(raw, "noise"))
            .collect();

        Self {
            rules,
            compiled_rules,
            noise_selectors,
            compiled_noise,
            qualify_chars: 50,
            strong_chars: 100,
            min_fragment_chars: 10,
            low_word_count: 50,
        }
    }

    /// Build a cascade from selectors in priority order; ranks start at 1.
    pub fn with_selectors<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules = selectors
            .into_iter()
            .zip(1u32..)
            .map(|(selector, rank)| SelectorRule::new(selector, rank))
            .collect();
        Self::build(rules, default_noise_selectors())
    }

    pub fn with_noise_selectors<I, S>(self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let noise_selectors = selectors.into_iter().map(Into::into).collect();
        Self {
            qualify_chars: self.qualify_chars,
            strong_chars: self.strong_chars,
            min_fragment_chars: self.min_fragment_chars,
            low_word_count: self.low_word_count,
            ..Self::build(self.rules, noise_selectors)
        }
    }

    /// Rules in rank order.
    pub fn rules(&self) -> &[SelectorRule] {
        &self.rules
    }

    /// Rules in rank order paired with their parsed selector, `None` when the
    /// selector did not parse.
    pub fn compiled_rules(&self) -> impl Iterator<Item = (&SelectorRule, Option<&Selector>)> {
        self.rules
            .iter()
            .zip(self.compiled_rules.iter().map(Option::as_ref))
    }

    pub fn noise_selectors(&self) -> &[String] {
        &self.noise_selectors
    }

    /// The denylist entries that parsed.
    pub fn compiled_noise(&self) -> &[Selector] {
        &self.compiled_noise
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        let rules = DEFAULT_CONTENT_SELECTORS
            .iter()
            .zip(1u32..)
            .map(|(selector, rank)| SelectorRule::new(*selector, rank))
            .collect();
        Self::build(rules, default_noise_selectors())
    }
}

fn default_noise_selectors() -> Vec<String> {
    DEFAULT_NOISE_SELECTORS
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn compile(raw: &str, kind: &'static str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = %raw, kind, error = ?e, "skipping unparseable selector");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_all_parse() {
        let config = CascadeConfig::default();
        for rule in config.rules() {
            assert!(Selector::parse(&rule.selector).is_ok(), "{}", rule.selector);
        }
        for selector in config.noise_selectors() {
            assert!(Selector::parse(selector).is_ok(), "{selector}");
        }
    }

    #[test]
    fn test_default_ranks_are_sequential_and_generic_last() {
        let config = CascadeConfig::default();
        let ranks: Vec<u32> = config.rules().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=ranks.len() as u32).collect::<Vec<_>>());

        let position = |sel: &str| config.rules().iter().position(|r| r.selector == sel);
        assert!(position(".markdown-body") < position("article"));
        assert!(position("article") < position("main"));
        assert_eq!(position(".content"), Some(config.rules().len() - 1));
    }

    #[test]
    fn test_with_selectors_assigns_ranks() {
        let config = CascadeConfig::with_selectors(["#a", "#b"]);
        assert_eq!(
            config.rules(),
            &[SelectorRule::new("#a", 1), SelectorRule::new("#b", 2)]
        );
        assert_eq!(config.qualify_chars, 50);
        assert!(!config.noise_selectors().is_empty());
    }

    #[test]
    fn test_selectors_are_compiled_once_at_construction() {
        let config = CascadeConfig::with_selectors(["[[broken", "article"])
            .with_noise_selectors(["script", "((nope"]);

        let compiled: Vec<_> = config
            .compiled_rules()
            .map(|(rule, selector)| (rule.rank, selector.is_some()))
            .collect();
        assert_eq!(compiled, vec![(1, false), (2, true)]);
        assert_eq!(config.noise_selectors().len(), 2);
        assert_eq!(config.compiled_noise().len(), 1);
    }

    #[test]
    fn test_noise_override_keeps_thresholds() {
        let mut config = CascadeConfig::default();
        config.qualify_chars = 10;
        let config = config.with_noise_selectors(["script"]);
        assert_eq!(config.qualify_chars, 10);
        assert_eq!(config.rules().len(), DEFAULT_CONTENT_SELECTORS.len());
    }
}
