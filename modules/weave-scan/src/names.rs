//! Best-effort person-name extraction from event titles.
//!
//! An ordered set of surface patterns is applied to the full title; every
//! capture is filtered through a stoplist of common words and event nouns,
//! then deduplicated case-insensitively in first-seen order. Output is
//! tagged with the pattern that produced it so the matcher and tests can
//! reason about provenance per name.
//!
//! Zero names is a normal outcome. Malformed input never panics — worst case
//! the patterns simply find nothing.

use regex::Regex;

use weave_common::{NameCandidate, NamePattern};

/// Capitalized words that are never person names in a calendar title.
const STOPLIST: &[&str] = &[
    "the", "a", "an", "my", "our", "his", "her", "their",
    "birthday", "bday", "anniversary", "party", "dinner", "lunch", "brunch",
    "breakfast", "coffee", "drinks", "hangout", "meeting", "call", "chat",
    "night", "day", "eve", "happy", "annual", "weekly", "monthly", "team",
    "christmas", "thanksgiving", "easter", "hanukkah", "new", "year",
];

struct SurfacePattern {
    pattern: NamePattern,
    regex: Regex,
}

fn surface_patterns() -> Vec<SurfacePattern> {
    // One or two capitalized tokens; apostrophes and hyphens allowed inside.
    let pats = [
        (
            NamePattern::With,
            r"\b[Ww]ith\s+([A-Z][A-Za-z'’-]+(?:\s+[A-Z][A-Za-z'’-]+)?)",
        ),
        (NamePattern::And, r"\b[Aa]nd\s+([A-Z][A-Za-z'’-]+)"),
        (NamePattern::Possessive, r"\b([A-Z][A-Za-z-]+)['’]s\s"),
        (NamePattern::LeadingName, r"^([A-Z][A-Za-z'’-]+)\s*[:\-–—]"),
    ];
    pats.iter()
        .map(|(pattern, re)| SurfacePattern {
            pattern: *pattern,
            regex: Regex::new(re).expect("valid name regex"),
        })
        .collect()
}

fn is_stopword(token: &str) -> bool {
    let lower = token.to_lowercase();
    STOPLIST.contains(&lower.as_str())
}

/// A multi-word capture is kept only if every token survives the stoplist;
/// "Sarah Chen" passes, "Sarah Birthday" is trimmed back to "Sarah".
fn clean_capture(raw: &str) -> Option<String> {
    let kept: Vec<&str> = raw
        .split_whitespace()
        .take_while(|tok| !is_stopword(tok))
        .collect();
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(" "))
}

/// Extract candidate person names from an event title, in first-seen order.
pub fn extract_names(title: &str) -> Vec<NameCandidate> {
    let mut out: Vec<NameCandidate> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for sp in surface_patterns() {
        for cap in sp.regex.captures_iter(title) {
            let Some(m) = cap.get(1) else { continue };
            let Some(text) = clean_capture(m.as_str()) else {
                continue;
            };
            let key = text.to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            out.push(NameCandidate {
                text,
                pattern: sp.pattern,
            });
        }
    }
    out
}
