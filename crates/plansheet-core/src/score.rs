//! Lexical relevance scoring.
//!
//! A text-match scorer: a bonus for the whole query
//! appearing verbatim, a smaller bonus for every query token found, and a
//! positional bonus that decays with the offset of the verbatim match.
//!
//! ```text
//! score = 10·[query ⊂ text] + 2·|{tokens ⊂ text}| + max(0, 5 − offset/10)
//! ```
//!
//! Matching is case-insensitive. The query is split on runs of whitespace
//! and every piece counts, including the empty pieces left by leading or
//! trailing whitespace (an empty piece is contained in any text). A
//! repeated token adds its bonus once per repetition.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

/// Bonus when the whole query occurs in the text.
pub const EXACT_MATCH_BONUS: f64 = 10.0;
/// Bonus per query token found in the text.
pub const TOKEN_MATCH_BONUS: f64 = 2.0;
/// Maximum positional bonus (match at offset 0).
pub const POSITION_BONUS: f64 = 5.0;
/// Characters of offset that cost one point of positional bonus.
pub const POSITION_DECAY: f64 = 10.0;

/// Score `text` against `query`. Absent or empty text scores `0`.
pub fn score_text(text: Option<&str>, query: &str) -> f64 {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return 0.0,
    };

    let haystack = text.to_lowercase();
    let needle = query.to_lowercase();
    let mut score = 0.0;

    let exact = haystack.find(&needle);
    if exact.is_some() {
        score += EXACT_MATCH_BONUS;
    }

    for token in tokens(&needle) {
        if haystack.contains(token) {
            score += TOKEN_MATCH_BONUS;
        }
    }

    if let Some(byte_offset) = exact {
        let offset = haystack[..byte_offset].chars().count() as f64;
        score += (POSITION_BONUS - offset / POSITION_DECAY).max(0.0);
    }

    score
}

/// Query pieces between whitespace runs. `" roof "` yields `["", "roof", ""]`
/// and `""` yields `[""]`.
pub fn tokens(query: &str) -> impl Iterator<Item = &str> {
    WHITESPACE.split(query)
}

/// Sum of [`score_text`] over several fields of one record.
pub fn score_fields<'a, I>(fields: I, query: &str) -> f64
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    fields.into_iter().map(|f| score_text(f, query)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_or_absent_text() {
        assert_eq!(score_text(Some(""), "anything"), 0.0);
        assert_eq!(score_text(None, "anything"), 0.0);
    }

    #[test]
    fn test_exact_match_at_start() {
        // 10 exact + 2 token + 5 position
        let s = score_text(Some("Lighting layout"), "lighting");
        assert!(approx(s, 17.0), "got {}", s);
    }

    #[test]
    fn test_contains_full_query() {
        let s = score_text(Some("Electrical Lighting Plan"), "lighting");
        assert!(s >= 10.0);
        // offset 11 → 5 - 1.1
        assert!(approx(s, 10.0 + 2.0 + 3.9), "got {}", s);
    }

    #[test]
    fn test_earlier_match_scores_higher() {
        let early = score_text(Some("Lighting Electrical Plan"), "lighting");
        let late = score_text(Some("Electrical Lighting Plan"), "lighting");
        assert!(early > late);
    }

    #[test]
    fn test_position_bonus_floors_at_zero() {
        let text = format!("{}lighting", "x".repeat(80));
        let s = score_text(Some(&text), "lighting");
        assert!(approx(s, 12.0), "got {}", s);
    }

    #[test]
    fn test_position_bonus_not_rounded() {
        let s = score_text(Some("abc lighting"), "lighting");
        assert!(approx(s, 10.0 + 2.0 + 4.6), "got {}", s);
    }

    #[test]
    fn test_tokens_without_full_match() {
        // Both tokens present, phrase not contiguous: no exact or position bonus.
        let s = score_text(Some("roof drainage and level details"), "roof details");
        assert!(approx(s, 4.0), "got {}", s);
    }

    #[test]
    fn test_multi_token_floor() {
        let query = "floor plan level";
        let s = score_text(Some("Architectural floor plan level 2"), query);
        let n = query.split_whitespace().count() as f64;
        assert!(s >= 10.0 + 2.0 * n);
    }

    #[test]
    fn test_repeated_tokens_count_each_time() {
        let s = score_text(Some("zzz roof"), "roof roof");
        assert!(approx(s, 4.0), "got {}", s);
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(
            score_text(Some("FIRE ALARM RISER"), "fire alarm"),
            score_text(Some("fire alarm riser"), "FIRE ALARM")
        );
    }

    #[test]
    fn test_offset_counts_characters() {
        // "éé " is five bytes but three characters.
        let s = score_text(Some("éé plan"), "plan");
        assert!(approx(s, 10.0 + 2.0 + 5.0 - 0.3), "got {}", s);
    }

    #[test]
    fn test_tokens_keep_edge_pieces() {
        assert_eq!(tokens("roof ").collect::<Vec<_>>(), vec!["roof", ""]);
        assert_eq!(tokens("  roof\tplan").collect::<Vec<_>>(), vec!["", "roof", "plan"]);
        assert_eq!(tokens("").collect::<Vec<_>>(), vec![""]);
    }

    #[test]
    fn test_edge_whitespace_adds_token_bonus() {
        // 10 exact + 2 "roof" + 2 "" + 5 position
        let trailing = score_text(Some("roof plan"), "roof ");
        assert!(approx(trailing, 19.0), "got {}", trailing);

        // " roof" matches at offset 4: 10 + 2 + 2 + 4.6
        let leading = score_text(Some("flat roof plan"), " roof");
        assert!(approx(leading, 18.6), "got {}", leading);

        // Leading space that is not in the text: only the two tokens count.
        let unmatched = score_text(Some("roof plan"), " roof");
        assert!(approx(unmatched, 4.0), "got {}", unmatched);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        // 10 exact + 2 for the single empty token + 5 position
        let s = score_text(Some("roof plan"), "");
        assert!(approx(s, 17.0), "got {}", s);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(score_text(Some("Mechanical piping"), "roof"), 0.0);
    }

    #[test]
    fn test_score_fields_sums() {
        let total = score_fields([Some("Roof plan"), None, Some("roof")], "roof");
        let expected = score_text(Some("Roof plan"), "roof") + score_text(Some("roof"), "roof");
        assert!(approx(total, expected));
    }
}
