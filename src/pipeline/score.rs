//! Score extraction: find the `Match Score: NN%` line in a model response.
//!
//! The match-score prompt asks the model to put the score on the first line,
//! but models drift, so the whole response is scanned and the leftmost match
//! wins. No range check happens here; see [`crate::chart::ScorePolicy`].
//!
//! Only ASCII digits count. `Match Score: ٨٥%` (Arabic-Indic digits) is
//! treated as no score rather than 85.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

// ASCII digits only: `\d` would also accept other Unicode digit scripts,
// which `u32::from_str` rejects.
static RE_MATCH_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Match Score:\s*([0-9]+)%").unwrap());

/// A percentage parsed from the model's text. Not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchScore(u32);

impl MatchScore {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_in_range(self) -> bool {
        self.0 <= 100
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Extract the first `Match Score: <digits>%` value from `response_text`.
///
/// Returns `None` when no such pattern appears anywhere in the text, or when
/// the digit run does not fit in a `u32`.
pub fn extract_score(response_text: &str) -> Option<MatchScore> {
    let caps = RE_MATCH_SCORE.captures(response_text)?;
    let digits = &caps[1];
    match digits.parse::<u32>() {
        Ok(v) => Some(MatchScore(v)),
        Err(e) => {
            warn!("Discarding unparseable match score '{}': {}", digits, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_score() {
        assert_eq!(
            extract_score("Match Score: 85%\nexplanation..."),
            Some(MatchScore(85))
        );
    }

    #[test]
    fn no_score() {
        assert_eq!(extract_score("No score here"), None);
        assert_eq!(extract_score(""), None);
    }

    #[test]
    fn leftmost_match_wins() {
        assert_eq!(
            extract_score("foo Match Score: 7% bar Match Score: 99%"),
            Some(MatchScore(7))
        );
    }

    #[test]
    fn no_space_after_colon() {
        assert_eq!(extract_score("Match Score:100%"), Some(MatchScore(100)));
    }

    #[test]
    fn score_found_past_first_line() {
        let text = "Here is my evaluation.\n\n**Match Score: 64%**\nStrengths: ...";
        assert_eq!(extract_score(text), Some(MatchScore(64)));
    }

    #[test]
    fn leading_zeros_are_base_ten() {
        assert_eq!(extract_score("Match Score: 007%"), Some(MatchScore(7)));
        assert_eq!(extract_score("Match Score: 080%"), Some(MatchScore(80)));
    }

    #[test]
    fn out_of_range_is_not_clamped() {
        assert_eq!(extract_score("Match Score: 150%"), Some(MatchScore(150)));
    }

    #[test]
    fn malformed_percentages_do_not_match() {
        assert_eq!(extract_score("Match Score: 85 %"), None);
        assert_eq!(extract_score("Match Score: 85.5%"), None);
        assert_eq!(extract_score("match score: 85%"), None);
        assert_eq!(extract_score("Match Score: %"), None);
    }

    #[test]
    fn whitespace_may_span_lines() {
        assert_eq!(extract_score("Match Score:\n  42%"), Some(MatchScore(42)));
    }

    #[test]
    fn overflowing_digits_are_absent() {
        assert_eq!(extract_score("Match Score: 99999999999999999999%"), None);
    }

    #[test]
    fn non_ascii_digits_do_not_match() {
        assert_eq!(extract_score("Match Score: ٨٥%"), None);
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "Match Score: 72%\nStrong backend skills...";
        assert_eq!(extract_score(text), extract_score(text));
    }

    #[test]
    fn display_appends_percent() {
        assert_eq!(MatchScore::new(85).to_string(), "85%");
        assert!(MatchScore::new(100).is_in_range());
        assert!(!MatchScore::new(101).is_in_range());
    }
}
