//! Vocabulary candidate extraction
//!
//! Heuristic scan of Swedish text for words worth studying: long words,
//! words with å/ä/ö, and words carrying common derivational suffixes,
//! minus a stop list of high-frequency function words. Pure text
//! processing; adding candidates to the database happens in the tool
//! layer.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// High-frequency Swedish words that are never interesting candidates.
const COMMON_WORDS: &[&str] = &[
    "att", "och", "det", "är", "som", "för", "på", "med", "av", "till", "från", "har", "den",
    "de", "om", "var", "eller", "när", "efter", "över", "andra", "mycket", "bara", "skulle",
    "första", "utan", "mellan", "under", "ser", "honom", "kommer", "man", "också", "nu", "kan",
    "göra", "får", "ska", "här", "något", "alla", "igen", "mer", "varje", "sedan", "våra",
    "vara", "samt", "vid", "sådan", "dock", "men", "så", "både", "denna", "dessa", "vilka",
    "vilket",
];

/// Derivational suffixes that usually mark content words.
const SUFFIXES: &[&str] = &["tion", "ning", "het", "dom", "skap", "else"];

const MIN_LONG_WORD: usize = 7;

fn word_regex() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| Regex::new(r"[A-Za-zÅÄÖåäö]+").expect("word pattern is valid"))
}

/// Candidate words from the text, lowercased, deduplicated, and sorted.
pub fn extract_candidates(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    for m in word_regex().find_iter(text) {
        let word = m.as_str().to_lowercase();
        if is_challenging(&word) {
            seen.insert(word);
        }
    }
    seen.into_iter().collect()
}

fn is_challenging(word: &str) -> bool {
    if COMMON_WORDS.contains(&word) {
        return false;
    }
    word.chars().count() >= MIN_LONG_WORD
        || word.chars().any(|c| matches!(c, 'å' | 'ä' | 'ö'))
        || SUFFIXES.iter().any(|suffix| word.ends_with(suffix))
}
