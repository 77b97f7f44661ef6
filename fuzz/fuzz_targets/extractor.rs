#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use quarry::extractor::{CascadeConfig, diagnose, extract};
use quarry::fetcher::RawDocument;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data).to_string();
    let raw = RawDocument::from_html(Url::parse("https://example.com").unwrap(), html);
    let config = CascadeConfig::default();

    // Neither path may panic, whatever the markup looks like
    if let Ok(result) = extract(&raw, &config) {
        assert_eq!(result.word_count, result.content.split_whitespace().count());
    }
    let _ = diagnose(&raw, &config);
});
