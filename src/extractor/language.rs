use whatlang::{Lang, detect};

const MIN_CONFIDENCE: f64 = 0.25;
const MIN_TEXT_CHARS: usize = 50;
/// Detection reads at most this much of the content; more adds nothing.
const SAMPLE_CHARS: usize = 2000;

/// ISO 639-1 codes for the languages that have one and that we see often.
/// Everything else falls back to whatlang's ISO 639-3 code.
const ISO_639_1: &[(Lang, &str)] = &[
    (Lang::Eng, "en"),
    (Lang::Rus, "ru"),
    (Lang::Cmn, "zh"),
    (Lang::Spa, "es"),
    (Lang::Fra, "fr"),
    (Lang::Deu, "de"),
    (Lang::Jpn, "ja"),
    (Lang::Kor, "ko"),
    (Lang::Por, "pt"),
    (Lang::Ita, "it"),
    (Lang::Nld, "nl"),
    (Lang::Pol, "pl"),
    (Lang::Tur, "tr"),
    (Lang::Swe, "sv"),
    (Lang::Dan, "da"),
    (Lang::Fin, "fi"),
    (Lang::Heb, "he"),
    (Lang::Ara, "ar"),
    (Lang::Hin, "hi"),
    (Lang::Tha, "th"),
    (Lang::Vie, "vi"),
    (Lang::Ukr, "uk"),
];

pub fn detect_language(content: &str) -> Option<String> {
    let sample: String = content.chars().take(SAMPLE_CHARS).collect();
    if sample.trim().chars().count() < MIN_TEXT_CHARS {
        return None;
    }

    let info = detect(&sample)?;
    if info.confidence() < MIN_CONFIDENCE {
        return None;
    }

    let lang = info.lang();
    let code = ISO_639_1
        .iter()
        .find(|(known, _)| *known == lang)
        .map_or_else(|| lang.code(), |(_, code)| *code);
    Some(code.to_string())
}
