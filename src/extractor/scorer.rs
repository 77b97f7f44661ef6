use scraper::{ElementRef, Node};

use crate::extractor::{
    model::{ContentCandidate, collapse_whitespace},
    rules::{CascadeConfig, SelectorRule},
};

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const SCORABLE: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "div"];

// Non-scorable elements whose boundaries separate words.
const BREAKING: &[&str] = &[
    "br", "section", "blockquote", "pre", "table", "tr", "td", "th", "ul", "ol", "dl", "dt", "dd",
    "figure", "figcaption",
];

fn is_scorable(element: &ElementRef<'_>) -> bool {
    SCORABLE.contains(&element.value().name())
}

/// Score one matched region.
///
/// Every scorable descendant (`p`, `h1`-`h6`, `li`, `div`) yields one fragment
/// made of its own text; text inside a nested scorable element belongs to
/// that element's fragment instead, so wrappers never duplicate their
/// children. Fragments are emitted in document order, whitespace-collapsed,
/// and dropped when `min_fragment_chars` characters or shorter.
pub fn score(region: ElementRef<'_>, rule: &SelectorRule, config: &CascadeConfig) -> ContentCandidate {
    let text = collect_fragments(region)
        .iter()
        .map(|fragment| collapse_whitespace(fragment))
        .filter(|fragment| fragment.chars().count() > config.min_fragment_chars)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR);

    ContentCandidate::new(rule.clone(), text)
}

/// Pending work for the tree walk. Nesting depth is attacker-controlled, so
/// the walk keeps its own stack instead of recursing.
enum Step<'a> {
    /// Outside any scorable element; loose text here is not collected.
    Visit(ElementRef<'a>),
    /// Scorable element reached in document order; opens a new fragment.
    Open(ElementRef<'a>),
    /// Append everything under the element to the fragment at this index.
    Gather(ElementRef<'a>, usize),
    Text(&'a str, usize),
    Break(usize),
}

fn collect_fragments(region: ElementRef<'_>) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();
    let mut stack = vec![Step::Visit(region)];

    // Children are pushed in reverse so they pop in document order.
    while let Some(step) = stack.pop() {
        match step {
            Step::Visit(element) => {
                for child in element.children().rev().filter_map(ElementRef::wrap) {
                    if is_scorable(&child) {
                        stack.push(Step::Open(child));
                    } else {
                        stack.push(Step::Visit(child));
                    }
                }
            }
            Step::Open(element) => {
                fragments.push(String::new());
                stack.push(Step::Gather(element, fragments.len() - 1));
            }
            Step::Gather(element, index) => {
                for child in element.children().rev() {
                    match child.value() {
                        Node::Text(text) => stack.push(Step::Text(&**text, index)),
                        Node::Element(_) => {
                            let Some(child) = ElementRef::wrap(child) else {
                                continue;
                            };
                            if is_scorable(&child) {
                                stack.push(Step::Open(child));
                            } else if BREAKING.contains(&child.value().name()) {
                                stack.push(Step::Break(index));
                                stack.push(Step::Gather(child, index));
                                stack.push(Step::Break(index));
                            } else {
                                stack.push(Step::Gather(child, index));
                            }
                        }
                        _ => {}
                    }
                }
            }
            Step::Text(text, index) => fragments[index].push_str(text),
            Step::Break(index) => fragments[index].push(' '),
        }
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn score_first(html: &str, selector: &str) -> ContentCandidate {
        let document = Html::parse_document(html);
        let parsed = Selector::parse(selector).unwrap();
        let region = document.select(&parsed).next().unwrap();
        score(region, &SelectorRule::new(selector, 1), &CascadeConfig::default())
    }

    #[test]
    fn test_joins_paragraphs_in_document_order() {
        let candidate = score_first(
            "<article><h2>A heading here</h2><p>First paragraph text.</p><ul><li>A list item entry</li></ul></article>",
            "article",
        );
        assert_eq!(
            candidate.text,
            "A heading here\n\nFirst paragraph text.\n\nA list item entry"
        );
    }

    #[test]
    fn test_drops_fragments_of_ten_chars_or_fewer() {
        let candidate = score_first(
            "<article><p>Share</p><p>0123456789</p><p>01234567890</p><li>  Menu  </li></article>",
            "article",
        );
        assert_eq!(candidate.text, "01234567890");
    }

    #[test]
    fn test_wrapper_divs_do_not_duplicate_text() {
        let candidate = score_first(
            "<main><div><div><p>Nested paragraph one.</p></div><p>Nested paragraph two.</p></div></main>",
            "main",
        );
        assert_eq!(
            candidate.text,
            "Nested paragraph one.\n\nNested paragraph two."
        );
    }

    #[test]
    fn test_div_own_text_precedes_nested_blocks() {
        let candidate = score_first(
            "<main><div>Introductory words <p>The inner paragraph.</p> and a closing remark</div></main>",
            "main",
        );
        assert_eq!(
            candidate.text,
            "Introductory words and a closing remark\n\nThe inner paragraph."
        );
    }

    #[test]
    fn test_inline_markup_stays_in_fragment() {
        let candidate = score_first(
            "<article><p>Some <em>emphasised</em> and <a href='/x'>linked</a> words.<br>Next line.</p></article>",
            "article",
        );
        assert_eq!(candidate.text, "Some emphasised and linked words. Next line.");
    }

    #[test]
    fn test_loose_region_text_is_ignored() {
        let candidate = score_first(
            "<main>This text sits directly inside main without any block element.</main>",
            "main",
        );
        assert!(candidate.text.is_empty());
        assert_eq!(candidate.char_length, 0);
        assert_eq!(candidate.word_count, 0);
    }

    #[test]
    fn test_counts_match_joined_text() {
        let candidate = score_first(
            "<article><p>one two three four five</p><p>six seven eight nine ten</p></article>",
            "article",
        );
        assert_eq!(candidate.word_count, 10);
        assert_eq!(candidate.char_length, candidate.text.chars().count());
    }

    #[test]
    fn test_deep_nesting_does_not_exhaust_the_stack() {
        let depth = 20_000;
        let html = format!(
            "<article>{}<p>The paragraph buried at the bottom of the nesting.</p>{}</article>",
            "<div>".repeat(depth),
            "</div>".repeat(depth)
        );
        let candidate = score_first(&html, "article");
        assert_eq!(candidate.text, "The paragraph buried at the bottom of the nesting.");
    }
}
