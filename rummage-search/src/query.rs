//! Query router: the bang mini-language parser
//!
//! Directive tokens:
//! - `!bang` routes to one source (union when repeated, dedup at first use)
//! - `@name` filters by performer
//! - `-word` excludes a term
//! - `"phrase"` requires an exact phrase (matched quote pairs only)
//!
//! Everything else is a plain query word. Classification is case-insensitive
//! and order-independent. A `!token` that misses the bang table stays in the
//! cleaned query verbatim and is recorded as the invalid-bang marker.

use rummage_common::types::query::ParsedQuery;
use rummage_common::types::source::SourceDescriptor;
use std::collections::HashMap;

/// One bang alias and the source it routes to.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BangEntry {
    /// Alias without the `!` prefix, lowercase
    pub alias: String,
    pub source: String,
    pub source_display: String,
}

/// Immutable alias table, built once from the source registry at
/// startup/reload. Safe for unsynchronized concurrent reads.
#[derive(Debug, Clone, Default)]
pub struct BangTable {
    map: HashMap<String, String>,
    entries: Vec<BangEntry>,
}

impl BangTable {
    pub fn from_descriptors<'a>(descriptors: impl Iterator<Item = &'a SourceDescriptor>) -> Self {
        let mut table = BangTable::default();
        for descriptor in descriptors {
            for alias in &descriptor.aliases {
                table.insert(alias, &descriptor.name, &descriptor.display_name);
            }
        }
        table
    }

    fn insert(&mut self, alias: &str, source: &str, source_display: &str) {
        let alias = alias.to_lowercase();
        if self.map.contains_key(&alias) {
            return;
        }
        self.map.insert(alias.clone(), source.to_string());
        self.entries.push(BangEntry {
            alias,
            source: source.to_string(),
            source_display: source_display.to_string(),
        });
    }

    /// Look up a lowercase alias; returns the mapped source name.
    pub fn lookup(&self, alias: &str) -> Option<&str> {
        self.map.get(alias).map(String::as_str)
    }

    /// All entries in table order, for the listing endpoint.
    pub fn entries(&self) -> &[BangEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse one raw query against the bang table.
///
/// The algorithm is strictly ordered: quoted phrases come out first, then
/// the remainder is tokenized on whitespace and classified per token.
pub fn parse(raw: &str, bangs: &BangTable) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();

    // Pass 1: extract matched "quoted phrases"; an unmatched trailing quote
    // stays in the working text as a literal.
    let mut working = String::with_capacity(raw.len());
    let mut rest = raw;
    loop {
        let Some(open) = rest.find('"') else {
            working.push_str(rest);
            break;
        };
        let Some(close_offset) = rest[open + 1..].find('"') else {
            working.push_str(rest);
            break;
        };
        let close = open + 1 + close_offset;
        working.push_str(&rest[..open]);
        working.push(' ');
        let phrase = rest[open + 1..close].trim();
        if !phrase.is_empty() {
            parsed.phrases.push(phrase.to_string());
        }
        rest = &rest[close + 1..];
    }

    // Pass 2: classify whitespace tokens.
    let mut words: Vec<&str> = Vec::new();
    for token in working.split_whitespace() {
        if let Some(name) = token.strip_prefix('!') {
            if !name.is_empty() {
                let key = name.to_lowercase();
                if let Some(source) = bangs.lookup(&key) {
                    if !parsed.targets.iter().any(|t| t == source) {
                        parsed.targets.push(source.to_string());
                    }
                    parsed.has_bang = true;
                } else {
                    // Unknown bang: keep the literal token and remember it
                    words.push(token);
                    parsed.invalid_bang = Some(token.to_string());
                }
                continue;
            }
        }
        if let Some(name) = token.strip_prefix('@') {
            if !name.is_empty() {
                let performer = name.to_lowercase();
                if !parsed.performers.contains(&performer) {
                    parsed.performers.push(performer);
                }
                continue;
            }
        }
        if let Some(word) = token.strip_prefix('-') {
            if !word.is_empty() {
                parsed.exclusions.push(word.to_lowercase());
                continue;
            }
        }
        words.push(token);
    }

    parsed.cleaned = words.join(" ");
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rummage_common::types::source::{Capabilities, ExtractionMethod};

    fn descriptor(name: &str, aliases: &[&str]) -> SourceDescriptor {
        SourceDescriptor {
            name: name.into(),
            display_name: name.into(),
            base_url: format!("https://{}.example", name),
            tier: 1,
            capabilities: Capabilities::default(),
            method: ExtractionMethod::Api,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn table() -> BangTable {
        let descriptors = vec![
            descriptor("pornhub", &["pornhub", "ph", "phub"]),
            descriptor("redtube", &["redtube", "rt"]),
            descriptor("xvideos", &["xvideos", "xv"]),
        ];
        BangTable::from_descriptors(descriptors.iter())
    }

    #[test]
    fn test_plain_query_passes_through() {
        let parsed = parse("big cats playing", &table());
        assert_eq!(parsed.cleaned, "big cats playing");
        assert!(parsed.targets.is_empty());
        assert!(!parsed.has_bang);
        assert!(parsed.invalid_bang.is_none());
    }

    #[test]
    fn test_multiple_bangs_union_in_order() {
        let parsed = parse("!ph !rt cats", &table());
        assert_eq!(parsed.targets, vec!["pornhub", "redtube"]);
        assert_eq!(parsed.cleaned, "cats");
        assert!(parsed.has_bang);
    }

    #[test]
    fn test_duplicate_bangs_collapse() {
        let parsed = parse("!ph !ph cats", &table());
        assert_eq!(parsed.targets, vec!["pornhub"]);
        assert_eq!(parsed.cleaned, "cats");
    }

    #[test]
    fn test_alias_and_case_insensitive() {
        let parsed = parse("!PHUB cats", &table());
        assert_eq!(parsed.targets, vec!["pornhub"]);
    }

    #[test]
    fn test_invalid_bang_kept_verbatim() {
        let parsed = parse("!bogus test", &table());
        assert_eq!(parsed.invalid_bang.as_deref(), Some("!bogus"));
        assert_eq!(parsed.cleaned, "!bogus test");
        assert!(!parsed.has_bang);
        assert!(parsed.targets.is_empty());
    }

    #[test]
    fn test_full_directive_mix() {
        let parsed = parse("\"big cat\" -dog @jane query", &table());
        assert_eq!(parsed.phrases, vec!["big cat"]);
        assert_eq!(parsed.exclusions, vec!["dog"]);
        assert_eq!(parsed.performers, vec!["jane"]);
        assert_eq!(parsed.cleaned, "query");
    }

    #[test]
    fn test_unmatched_quote_stays_literal() {
        let parsed = parse("cats \"dogs", &table());
        assert!(parsed.phrases.is_empty());
        assert_eq!(parsed.cleaned, "cats \"dogs");
    }

    #[test]
    fn test_bare_sigils_are_plain_words() {
        let parsed = parse("! @ - cats", &table());
        assert_eq!(parsed.cleaned, "! @ - cats");
        assert!(parsed.targets.is_empty());
        assert!(parsed.performers.is_empty());
        assert!(parsed.exclusions.is_empty());
    }

    #[test]
    fn test_cleaned_never_contains_classified_tokens() {
        let parsed = parse("!ph @jane -dog \"exact phrase\" ordinary words", &table());
        assert!(!parsed.cleaned.contains("!ph"));
        assert!(!parsed.cleaned.contains("@jane"));
        assert!(!parsed.cleaned.contains("-dog"));
        assert!(!parsed.cleaned.contains("exact phrase"));
        assert_eq!(parsed.cleaned, "ordinary words");
    }

    #[test]
    fn test_reparse_of_cleaned_is_idempotent() {
        let bangs = table();
        let first = parse("!ph @jane -dog \"big cat\" !bogus cats", &bangs);
        let second = parse(&first.cleaned, &bangs);
        assert!(!second.has_bang);
        assert!(second.targets.is_empty());
        assert!(second.performers.is_empty());
        assert!(second.exclusions.is_empty());
        assert!(second.phrases.is_empty());
        assert_eq!(second.cleaned, first.cleaned);
    }

    #[test]
    fn test_performer_dedup() {
        let parsed = parse("@Jane @jane cats", &table());
        assert_eq!(parsed.performers, vec!["jane"]);
    }
}
