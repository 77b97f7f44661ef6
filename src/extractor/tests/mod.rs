use std::fs;
use url::Url;

use crate::extractor::{CascadeConfig, NoContentFound, QualityFlag, diagnose, extract, model};
use crate::fetcher::types::RawDocument;

fn fixture(name: &str, url: &str) -> RawDocument {
    let html = fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture");
    RawDocument::from_html(Url::parse(url).unwrap(), html)
}

fn inline(html: &str) -> RawDocument {
    RawDocument::from_html(Url::parse("https://example.com/post").unwrap(), html)
}

#[test]
fn test_extract_article() {
    let raw = fixture("article.html", "https://example.com/2024/05/06/sample-article?ref=home");
    let result = extract(&raw, &CascadeConfig::default()).unwrap();

    assert_eq!(result.selector, "article");
    assert_eq!(result.title, "Sample Article Headline - News Site");
    assert_eq!(result.author.as_deref(), Some("Jane Doe"));
    assert_eq!(result.publish_date.as_deref(), Some("2024-05-06T08:30:00Z"));
    assert_eq!(result.site_name.as_deref(), Some("News Site"));
    assert_eq!(
        result.canonical_url.as_ref().map(Url::as_str),
        Some("https://example.com/2024/05/06/sample-article")
    );

    assert!(result.content.contains("first paragraph of the sample article"));
    assert!(result.content.contains("second paragraph adds detail"));
    assert!(result.content.contains("third paragraph wraps up"));

    for chrome in [
        "World news section",
        "Advertisement",
        "Tweet this story",
        "Another story you might enjoy",
        "Copyright",
        "analytics",
        "font-family",
    ] {
        assert!(!result.content.contains(chrome), "{chrome} leaked into content");
    }

    assert_eq!(result.word_count, model::word_count(&result.content));
    assert_eq!(result.language.as_deref(), Some("en"));
}

#[test]
fn test_extract_docs_page_prefers_platform_container() {
    let raw = fixture("docs.html", "https://docs.example.com/config");
    let result = extract(&raw, &CascadeConfig::default()).unwrap();

    assert_eq!(result.selector, ".theme-doc-markdown");
    assert_eq!(result.rank, 1);
    assert!(result.content.starts_with("Configuring the Widget\n\n"));
    assert!(result.content.contains("Keys are case sensitive"));
    assert!(!result.content.contains("hosted version"));
    assert!(!result.content.contains("Getting started"));
    assert_eq!(result.site_name.as_deref(), Some("Widget Docs"));
    assert_eq!(result.publish_date.as_deref(), Some("2023-11-02"));
    assert_eq!(result.author, None);
}

#[test]
fn test_empty_page_is_no_content_found() {
    let raw = fixture("empty.html", "https://example.com/empty");
    assert_eq!(extract(&raw, &CascadeConfig::default()).unwrap_err(), NoContentFound);
}

#[test]
fn test_app_shell_is_no_content_found() {
    let raw = fixture("chrome_only.html", "https://example.com/app");
    assert!(extract(&raw, &CascadeConfig::default()).is_err());
}

#[test]
fn test_nav_script_and_three_paragraphs() {
    let paragraphs = [
        "The first paragraph is comfortably longer than forty characters.",
        "The second paragraph also clears the forty character mark easily.",
        "Finally the third paragraph rounds out the article body nicely.",
    ];
    let raw = inline(&format!(
        "<html><body><nav><a href='/'>Home</a> <a href='/about'>About this website</a></nav>\
         <script>var secret = 'inline script text';</script>\
         <article><p>{}</p><p>{}</p><p>{}</p></article></body></html>",
        paragraphs[0], paragraphs[1], paragraphs[2]
    ));

    let result = extract(&raw, &CascadeConfig::default()).unwrap();

    assert_eq!(result.selector, "article");
    assert_eq!(result.content, paragraphs.join("\n\n"));
    assert!(!result.content.contains("About this website"));
    assert!(!result.content.contains("secret"));
}

#[test]
fn test_author_independent_of_winning_rule() {
    let body = "Body text that is long enough to qualify as the main content region here.";
    for region in [
        format!("<article><p>{body}</p></article>"),
        format!("<main><p>{body}</p></main>"),
        format!("<div class='content'><p>{body}</p></div>"),
    ] {
        let raw = inline(&format!(
            r#"<html><head><meta name="author" content="Jane Doe"></head><body>{region}</body></html>"#
        ));
        let result = extract(&raw, &CascadeConfig::default()).unwrap();
        assert_eq!(result.author.as_deref(), Some("Jane Doe"), "region {region}");
    }
}

#[test]
fn test_byline_outside_region_is_found() {
    let raw = inline(
        "<html><body><div class='meta'><span>By Sam Carter</span></div>\
         <article><p>The article body sits here, separated from the byline that precedes it.</p></article></body></html>",
    );
    let result = extract(&raw, &CascadeConfig::default()).unwrap();
    assert_eq!(result.author.as_deref(), Some("Sam Carter"));
}

#[test]
fn test_short_content_is_low_confidence_but_returned() {
    let raw = inline(
        "<html><body><article><p>Just over fifty characters of text in this paragraph.</p></article></body></html>",
    );
    let result = extract(&raw, &CascadeConfig::default()).unwrap();

    assert!(result.is_low_confidence());
    assert!(result.quality.flags.contains(&QualityFlag::LowWordCount));
    assert!(result.word_count < 50);
}

#[test]
fn test_long_content_is_not_low_confidence() {
    let paragraph = "Readers appreciate a well reasoned explanation of how the system works. ".repeat(8);
    let raw = inline(&format!("<html><body><article><p>{paragraph}</p></article></body></html>"));
    let result = extract(&raw, &CascadeConfig::default()).unwrap();

    assert!(!result.is_low_confidence());
    assert!(result.word_count >= 50);
}

#[test]
fn test_word_count_is_stable_across_runs() {
    let raw = fixture("article.html", "https://example.com/a");
    let config = CascadeConfig::default();
    let first = extract(&raw, &config).unwrap();
    let second = extract(&raw, &config).unwrap();
    assert_eq!(first.word_count, second.word_count);
    assert_eq!(first.content, second.content);
}

#[test]
fn test_short_fragments_never_stand_alone() {
    let raw = fixture("article.html", "https://example.com/a");
    let result = extract(&raw, &CascadeConfig::default()).unwrap();
    for segment in result.content.split("\n\n") {
        assert!(segment.trim().chars().count() > 10, "segment {segment:?} too short");
    }
}

#[test]
fn test_injected_rules_replace_defaults() {
    let raw = inline(
        "<html><body><article><p>Article text that would normally win the cascade easily.</p></article>\
         <section id='custom'><p>Custom region text selected by an injected rule list.</p></section></body></html>",
    );
    let config = CascadeConfig::with_selectors(["#custom"]);
    let result = extract(&raw, &config).unwrap();
    assert_eq!(result.selector, "#custom");
    assert!(result.content.starts_with("Custom region text"));
}

#[test]
fn test_malformed_html() {
    let raw = inline(
        "<html><head><title>Broken</title><body><main><p>Unclosed tags keep going and going<div>More content that never closes properly",
    );
    let result = extract(&raw, &CascadeConfig::default()).unwrap();
    assert_eq!(result.title, "Broken");
    assert!(result.content.contains("Unclosed tags"));
    assert!(result.content.contains("More content"));
}

#[test]
fn test_form_wrapped_page_keeps_its_article() {
    let raw = inline(
        "<html><body><form id='aspnetForm' method='post' action='./story.aspx'>\
         <article><p>The whole page sits inside one server form, as WebForms sites do.</p></article>\
         </form></body></html>",
    );
    let result = extract(&raw, &CascadeConfig::default()).unwrap();

    assert_eq!(result.selector, "article");
    assert!(result.content.contains("inside one server form"));
}

#[test]
fn test_deeply_nested_page_is_extracted() {
    let depth = 20_000;
    let raw = inline(&format!(
        "<html><body><article>{}<p>A paragraph at the bottom of twenty thousand nested divs.</p>{}</article></body></html>",
        "<div>".repeat(depth),
        "</div>".repeat(depth)
    ));
    let result = extract(&raw, &CascadeConfig::default()).unwrap();

    assert_eq!(result.selector, "article");
    assert_eq!(
        result.content,
        "A paragraph at the bottom of twenty thousand nested divs."
    );
}

#[test]
fn test_diagnose_lists_every_rule() {
    let raw = fixture("article.html", "https://example.com/a");
    let config = CascadeConfig::default();
    let reports = diagnose(&raw, &config);

    assert_eq!(reports.len(), config.rules().len());
    let article = reports.iter().find(|r| r.selector == "article").unwrap();
    assert!(article.matched);
    assert!(article.qualifies);
    assert!(article.strong);
    assert!(article.preview.starts_with("Sample Article Headline"));
    assert!(reports.iter().filter(|r| r.selector == ".markdown-body").all(|r| !r.matched));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(
            html in ".*",
            url in "https://[a-z]+\\.com/[a-z]*"
        ) {
            let raw = RawDocument::from_html(Url::parse(&url).unwrap(), html);
            let _ = extract(&raw, &CascadeConfig::default());
        }

        #[test]
        fn test_word_count_matches_content(
            words in proptest::collection::vec("[a-z]{1,12}", 0..200),
        ) {
            let html = format!("<article><p>{}</p></article>", words.join(" "));
            if let Ok(result) = extract(&inline(&html), &CascadeConfig::default()) {
                prop_assert_eq!(result.word_count, model::word_count(&result.content));
                prop_assert!(result.content.chars().count() > 50);
            }
        }
    }
}
