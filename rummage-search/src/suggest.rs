//! Suggestion ranker
//!
//! One scoring rule shared by bang, performer, and free-text suggestions:
//! exact prefix beats whole-word prefix beats substring; anything else is
//! excluded. Within the exact-prefix tier shorter candidates rank higher.
//! Ties keep original table order (stable sort).

use rummage_common::types::source::SourceDescriptor;
use serde::Serialize;

/// Minimum input length for performer/term suggestions
pub const MIN_TERM_INPUT: usize = 2;
/// Minimum input length for bang suggestions (the `!` already signals intent)
pub const MIN_BANG_INPUT: usize = 1;

/// Default free-text suggestion terms, merged with admin-supplied custom
/// terms at load.
pub const DEFAULT_TERMS: &[&str] = &[
    "amateur", "anal", "asian", "bbw", "bdsm", "big ass", "big tits", "blonde",
    "blowjob", "brunette", "casting", "compilation", "creampie", "cuckold",
    "czech", "deepthroat", "ebony", "feet", "gangbang", "german", "hairy",
    "hardcore", "homemade", "interracial", "japanese", "latina", "lesbian",
    "massage", "mature", "milf", "office", "orgasm", "outdoor", "pov",
    "public", "redhead", "rough", "squirt", "stepmom", "stepsister",
    "swingers", "teen", "threesome", "vintage", "yoga",
];

/// Match tier, highest first. Internal to the scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    None,
    Contains,
    WordPrefix,
    ExactPrefix,
}

/// One ranked suggestion candidate.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub value: String,
    /// Canonical short alias (bang suggestions only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Relevance score, internal only
    #[serde(skip)]
    pub score: u32,
}

fn tier(input: &str, candidate: &str) -> Tier {
    if candidate.starts_with(input) {
        return Tier::ExactPrefix;
    }
    if candidate
        .split_whitespace()
        .any(|word| word.starts_with(input))
    {
        return Tier::WordPrefix;
    }
    if candidate.contains(input) {
        return Tier::Contains;
    }
    Tier::None
}

/// Score one candidate against lowercase input. Zero means excluded.
///
/// Exact-prefix scores 3000 minus candidate length, so within that tier
/// shorter candidates win; the lower tiers are flat bands and rely on the
/// stable sort for table-order tie-breaking.
fn score(input: &str, candidate: &str) -> u32 {
    match tier(input, candidate) {
        Tier::ExactPrefix => 3000u32.saturating_sub(candidate.len() as u32),
        Tier::WordPrefix => 2000,
        Tier::Contains => 1000,
        Tier::None => 0,
    }
}

/// Rank free-text candidates (performers, terms) against the input.
///
/// Input below [`MIN_TERM_INPUT`] characters yields an empty list.
pub fn rank_terms<'a>(
    input: &str,
    candidates: impl Iterator<Item = &'a str>,
    limit: usize,
) -> Vec<Suggestion> {
    let input = input.trim().to_lowercase();
    if input.len() < MIN_TERM_INPUT {
        return Vec::new();
    }
    rank(&input, candidates.map(|c| (c.to_string(), None)), limit)
}

/// Rank bang suggestions against the input (leading `!` stripped by the
/// caller). Each source appears at most once; its best-scoring alias decides
/// the rank and its canonical shortest alias is exposed as the short code.
/// An empty input yields an empty list, never the whole table.
pub fn rank_bangs<'a>(
    input: &str,
    descriptors: impl Iterator<Item = &'a SourceDescriptor>,
    limit: usize,
) -> Vec<Suggestion> {
    let input = input.trim().trim_start_matches('!').to_lowercase();
    if input.len() < MIN_BANG_INPUT {
        return Vec::new();
    }

    let mut scored: Vec<Suggestion> = descriptors
        .filter_map(|d| {
            let name_score = score(&input, &d.name.to_lowercase());
            let alias_score = d
                .aliases
                .iter()
                .map(|a| score(&input, &a.to_lowercase()))
                .max()
                .unwrap_or(0);
            let best = name_score.max(alias_score);
            if best == 0 {
                return None;
            }
            Some(Suggestion {
                value: d.name.clone(),
                short: Some(d.canonical_alias().to_string()),
                score: best,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

fn rank(
    input: &str,
    candidates: impl Iterator<Item = (String, Option<String>)>,
    limit: usize,
) -> Vec<Suggestion> {
    let mut scored: Vec<Suggestion> = candidates
        .filter_map(|(value, short)| {
            let s = score(input, &value.to_lowercase());
            if s == 0 {
                return None;
            }
            Some(Suggestion {
                value,
                short,
                score: s,
            })
        })
        .collect();

    // Stable: equal scores keep original table order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use rummage_common::types::source::{Capabilities, ExtractionMethod};

    fn descriptor(name: &str, aliases: &[&str]) -> SourceDescriptor {
        SourceDescriptor {
            name: name.into(),
            display_name: name.into(),
            base_url: String::new(),
            tier: 1,
            capabilities: Capabilities::default(),
            method: ExtractionMethod::Api,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_exact_prefix_shorter_wins() {
        let candidates = ["porntube", "pornhub"];
        let ranked = rank_terms("po", candidates.iter().copied(), 10);
        assert_eq!(ranked[0].value, "pornhub");
        assert_eq!(ranked[1].value, "porntube");
    }

    #[test]
    fn test_tier_ordering() {
        // "big ass" word-prefixes on "as", "casting" merely contains it
        let candidates = ["casting", "big ass", "asian"];
        let ranked = rank_terms("as", candidates.iter().copied(), 10);
        assert_eq!(ranked[0].value, "asian"); // exact prefix
        assert_eq!(ranked[1].value, "big ass"); // word prefix
        assert_eq!(ranked[2].value, "casting"); // contains
    }

    #[test]
    fn test_non_matches_excluded() {
        let ranked = rank_terms("zz", ["milf", "teen"].iter().copied(), 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_short_input_yields_empty() {
        let ranked = rank_terms("a", DEFAULT_TERMS.iter().copied(), 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_limit_truncates() {
        let ranked = rank_terms("st", DEFAULT_TERMS.iter().copied(), 1);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_stable_tie_break_keeps_table_order() {
        let candidates = ["teen anal", "teen pov"];
        let ranked = rank_terms("teen", candidates.iter().copied(), 10);
        assert_eq!(ranked[0].value, "teen anal");
        assert_eq!(ranked[1].value, "teen pov");
    }

    #[test]
    fn test_bang_empty_input_never_lists_all() {
        let descriptors = vec![descriptor("pornhub", &["pornhub", "ph"])];
        assert!(rank_bangs("", descriptors.iter(), 10).is_empty());
        assert!(rank_bangs("!", descriptors.iter(), 10).is_empty());
    }

    #[test]
    fn test_bang_single_char_matches() {
        let descriptors = vec![
            descriptor("pornhub", &["pornhub", "ph"]),
            descriptor("xvideos", &["xvideos", "xv"]),
        ];
        let ranked = rank_bangs("p", descriptors.iter(), 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].value, "pornhub");
        assert_eq!(ranked[0].short.as_deref(), Some("ph"));
    }

    #[test]
    fn test_bang_shorter_source_ranks_first() {
        let descriptors = vec![
            descriptor("porntube", &["porntube", "pt"]),
            descriptor("pornhub", &["pornhub", "ph"]),
        ];
        let ranked = rank_bangs("po", descriptors.iter(), 10);
        assert_eq!(ranked[0].value, "pornhub");
    }
}
