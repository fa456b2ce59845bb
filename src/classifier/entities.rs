//! Entity extraction for classified prompts
//!
//! Pulls three kinds of tokens out of a prompt: year-like numbers,
//! capitalized words that look like place or proper names, and generic
//! location nouns. Results are deduplicated keeping the first occurrence.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(1[0-9]{3}|20[0-2][0-9])\b").unwrap());

static LOCATION_INDICATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(city|town|state|country|region|area|zone)\b").unwrap());

/// Capitalized words that never count as entities
pub const STOPWORDS: &[&str] = &["The", "And", "Or", "But", "From", "To", "Of", "In", "On", "At"];

/// Extract entities from a prompt.
///
/// Years in 1000..=2029 come first, then capitalized words longer than two
/// characters, then location nouns (case preserved as written).
pub fn extract_entities(prompt: &str) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();

    entities.extend(YEAR_RE.find_iter(prompt).map(|m| m.as_str().to_string()));

    for raw in prompt.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if word.chars().count() <= 2 {
            continue;
        }
        let starts_upper = word.chars().next().is_some_and(|c| c.is_uppercase());
        if starts_upper && !STOPWORDS.contains(&word) {
            entities.push(word.to_string());
        }
    }

    entities.extend(
        LOCATION_INDICATOR_RE
            .find_iter(prompt)
            .map(|m| m.as_str().to_string()),
    );

    let mut seen = HashSet::new();
    entities.retain(|e| seen.insert(e.clone()));
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_years_in_range() {
        let entities = extract_entities("between 999 and 1066 or 2024 but not 2030");
        assert_eq!(entities, vec!["1066", "2024"]);
    }

    #[test]
    fn skips_stopwords_and_short_words() {
        let entities = extract_entities("The Road From Rome To Ur");
        assert_eq!(entities, vec!["Road", "Rome"]);
    }

    #[test]
    fn trims_punctuation_around_names() {
        let entities = extract_entities("Drive to Paris, then (Lyon).");
        assert_eq!(entities, vec!["Drive", "Paris", "Lyon"]);
    }

    #[test]
    fn location_indicators_are_case_insensitive() {
        let entities = extract_entities("largest city in each Region");
        assert_eq!(entities, vec!["Region", "city"]);
    }

    #[test]
    fn deduplicates_preserving_first_occurrence() {
        let entities = extract_entities("Berlin 1945 Berlin 1945 city city");
        assert_eq!(entities, vec!["1945", "Berlin", "city"]);
    }

    #[test]
    fn empty_prompt_has_no_entities() {
        assert!(extract_entities("").is_empty());
        assert!(extract_entities("   ").is_empty());
    }
}
