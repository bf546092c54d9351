//! Utility functions for the analytics engine

use chrono::{Datelike, Utc};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Letters with no canonical decomposition that still carry a stroke or slash
fn fold_undecomposable(c: char) -> char {
    match c {
        'ł' => 'l',
        'ø' => 'o',
        'đ' => 'd',
        'ı' => 'i',
        other => other,
    }
}

/// Lookup key for fuzzy team name matching.
///
/// The name is decomposed (NFD) and its combining marks dropped, then case,
/// spaces, apostrophes (straight and curly) and hyphens are ignored, so
/// "San José State" and "san jose state" resolve to the same key.
pub fn normalize_team_name(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(fold_undecomposable)
        .filter(|c| !matches!(c, ' ' | '\'' | '\u{2018}' | '\u{2019}' | 'ʻ' | '-'))
        .collect()
}

/// Arithmetic mean, zero for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Wins over all decided and tied games, zero when nothing was played
pub fn win_percentage(wins: u32, losses: u32, ties: u32) -> f64 {
    let total = wins + losses + ties;
    if total == 0 {
        return 0.0;
    }
    wins as f64 / total as f64
}

/// Current calendar year, used as the default end of an analysis window
pub fn current_season() -> i32 {
    Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ignores_case_spaces_and_punctuation() {
        assert_eq!(normalize_team_name("Texas A&M"), "texasa&m");
        assert_eq!(normalize_team_name("Miami (OH)"), "miami(oh)");
        assert_eq!(normalize_team_name("Hawai'i"), "hawaii");
        assert_eq!(normalize_team_name("Hawaiʻi"), "hawaii");
        assert_eq!(
            normalize_team_name("Gardner-Webb"),
            normalize_team_name("gardner webb")
        );
    }

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(
            normalize_team_name("San José State"),
            normalize_team_name("san jose state")
        );
        // decomposed form: 'e' followed by a combining acute accent
        assert_eq!(normalize_team_name("Jose\u{0301}"), "jose");
        assert_eq!(normalize_team_name("Timișoara"), "timisoara");
        assert_eq!(normalize_team_name("Constanța"), "constanta");
        assert_eq!(normalize_team_name("Pŭlo"), "pulo");
        assert_eq!(normalize_team_name("Łódź"), "lodz");
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_win_percentage() {
        assert_eq!(win_percentage(0, 0, 0), 0.0);
        assert_eq!(win_percentage(3, 1, 0), 0.75);
    }
}
