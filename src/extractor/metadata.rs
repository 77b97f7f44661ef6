//! Title, byline and publish-date recovery.
//!
//! Every lookup scans the whole normalized document. Bylines and dates often
//! sit outside the content region, so nothing here depends on which selector
//! won the cascade.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

use crate::extractor::{
    model::{Metadata, collapse_whitespace},
    normalizer::NormalizedDocument,
};

// Each list is in priority order.
static AUTHOR_META: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "meta[name='author']",
        "meta[property='article:author']",
        "meta[name='byl']",
        "meta[name='parsely-author']",
        "meta[name='sailthru.author']",
    ])
});
static AUTHOR_ELEMENTS: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["[itemprop='author']", "[rel='author']", ".author", ".byline"]));
static DATE_META: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "meta[property='article:published_time']",
        "meta[itemprop='datePublished']",
        "meta[name='date']",
        "meta[name='pubdate']",
        "meta[name='publish-date']",
        "meta[name='parsely-pub-date']",
    ])
});

/// Longest text accepted as a byline; anything longer is prose, not a name.
const MAX_BYLINE_CHARS: usize = 100;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:title']").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static OG_SITE_NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:site_name']").unwrap());
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='description'], meta[property='og:description']").unwrap()
});
static CANONICAL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link[rel='canonical'][href]").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());
static BYLINE_CANDIDATES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, span, div, address, a").unwrap());

static BY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:by)\s+(\p{Lu}[\p{L}'.\-]*(?:\s+\p{Lu}[\p{L}'.\-]*){0,3})").unwrap()
});
static BY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i:by)[:\s]+").unwrap());
static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d{4}-\d{2}-\d{2})((?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+\-]\d{2}:?\d{2})?)?)",
    )
    .unwrap()
});

fn selectors(raw: &[&str]) -> Vec<Selector> {
    raw.iter().map(|s| Selector::parse(s).unwrap()).collect()
}

pub fn extract_metadata(document: &NormalizedDocument) -> Metadata {
    let raw_title = first_text(document, &TITLE);

    Metadata {
        title: extract_title(document, raw_title.as_deref()),
        author: extract_author(document),
        publish_date: extract_publish_date(document),
        site_name: extract_site_name(document, raw_title.as_deref()),
        description: first_attr(document, &DESCRIPTION, "content"),
        canonical_url: extract_canonical(document),
    }
}

fn extract_title(document: &NormalizedDocument, raw_title: Option<&str>) -> String {
    raw_title
        .map(str::to_string)
        .or_else(|| first_attr(document, &OG_TITLE, "content"))
        .or_else(|| first_text(document, &H1))
        .unwrap_or_default()
}

fn extract_author(document: &NormalizedDocument) -> Option<String> {
    for selector in AUTHOR_META.iter() {
        let found = document
            .select(selector)
            .filter_map(|meta| meta.value().attr("content"))
            .filter(|content| !looks_like_url(content))
            .find_map(clean_byline);
        if found.is_some() {
            return found;
        }
    }

    for selector in AUTHOR_ELEMENTS.iter() {
        let found = document.select(selector).find_map(|element| {
            let text = element
                .value()
                .attr("content")
                .map(str::to_string)
                .unwrap_or_else(|| element_text(element));
            clean_byline(&text)
        });
        if found.is_some() {
            return found;
        }
    }

    document.select(&BYLINE_CANDIDATES).find_map(|element| {
        let text = element_text(element);
        if text.chars().count() > MAX_BYLINE_CHARS {
            return None;
        }
        BY_PATTERN
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|name| name.as_str().to_string())
    })
}

fn clean_byline(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let name = BY_PREFIX.replace(&collapsed, "").trim().to_string();
    let length = name.chars().count();
    (length >= 2 && length <= MAX_BYLINE_CHARS).then_some(name)
}

fn looks_like_url(value: &str) -> bool {
    let value = value.trim_start();
    value.starts_with("http://") || value.starts_with("https://") || value.starts_with('/')
}

fn extract_publish_date(document: &NormalizedDocument) -> Option<String> {
    for selector in DATE_META.iter() {
        if let Some(date) = first_attr(document, selector, "content") {
            return Some(date);
        }
    }

    if let Some(date) = first_attr(document, &TIME, "datetime") {
        return Some(date);
    }

    let text = document.root().text().collect::<String>();
    ISO_DATE.captures_iter(&text).find_map(|caps| {
        let day = caps.get(1)?.as_str();
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
        let time = caps.get(2).map_or("", |m| m.as_str());
        Some(format!("{day}{time}"))
    })
}

fn extract_site_name(document: &NormalizedDocument, raw_title: Option<&str>) -> Option<String> {
    if let Some(name) = first_attr(document, &OG_SITE_NAME, "content") {
        return Some(name);
    }

    // "Article Title - Site Name" or "Article Title | Site Name"
    let title = raw_title?;
    let pos = title.rfind(" | ").or_else(|| title.rfind(" - "))?;
    let name = title[pos + 3..].trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn extract_canonical(document: &NormalizedDocument) -> Option<Url> {
    let href = document
        .select(&CANONICAL)
        .next()?
        .value()
        .attr("href")?
        .trim();
    document.base_url().join(href).ok()
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn first_text(document: &NormalizedDocument, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn first_attr(document: &NormalizedDocument, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attr))
        .map(collapse_whitespace)
        .find(|value| !value.is_empty())
}
