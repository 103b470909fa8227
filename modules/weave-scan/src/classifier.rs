//! Event classification — prioritized strategy chain.
//!
//! Pure functions that decide whether a calendar title (plus its date) looks
//! like a social-interaction candidate. Strategies run in a fixed order and
//! the chain short-circuits on the first hit:
//!
//! 1. Structural regex match against the catalog → confidence 0.9
//! 2. Fallback keyword match across all patterns → confidence 0.6
//! 3. Fixed-date holiday lookup (date-based, not text-based) → confidence 0.8
//!
//! `None` means "not a social-interaction candidate" — callers drop the event
//! from the pipeline. A failed classification is not an error.

use chrono::{Datelike, NaiveDate};

use weave_common::{ClassificationResult, EventType};

use crate::catalog::Catalog;

pub const STRUCTURAL_CONFIDENCE: f64 = 0.9;
pub const KEYWORD_CONFIDENCE: f64 = 0.6;
pub const FIXED_DATE_CONFIDENCE: f64 = 0.8;

type Strategy = fn(&Catalog, &str, NaiveDate) -> Option<ClassificationResult>;

/// Priority order. First non-None result wins.
const STRATEGIES: [Strategy; 3] = [structural, keyword, fixed_date];

pub fn classify(catalog: &Catalog, title: &str, date: NaiveDate) -> Option<ClassificationResult> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(catalog, title, date))
}

fn structural(catalog: &Catalog, title: &str, _date: NaiveDate) -> Option<ClassificationResult> {
    catalog
        .patterns()
        .iter()
        .find(|p| p.structural_match(title))
        .map(|p| ClassificationResult {
            event_type: p.event_type,
            importance: p.importance,
            confidence: STRUCTURAL_CONFIDENCE,
            suggested_category: Some(p.suggested_category.to_string()),
        })
}

fn keyword(catalog: &Catalog, title: &str, _date: NaiveDate) -> Option<ClassificationResult> {
    let lower = title.to_lowercase();
    catalog
        .patterns()
        .iter()
        .find(|p| p.keyword_match(&lower))
        .map(|p| ClassificationResult {
            event_type: p.event_type,
            importance: p.importance,
            confidence: KEYWORD_CONFIDENCE,
            suggested_category: Some(p.suggested_category.to_string()),
        })
}

/// Date-based holiday check. Can fire even when text matching fails — a bare
/// "Dinner at Mom's" on Dec 25 is still a holiday candidate.
fn fixed_date(catalog: &Catalog, _title: &str, date: NaiveDate) -> Option<ClassificationResult> {
    catalog
        .holiday_on(date.month(), date.day())
        .map(|h| ClassificationResult {
            event_type: EventType::Holiday,
            importance: h.importance,
            confidence: FIXED_DATE_CONFIDENCE,
            suggested_category: Some("holiday".to_string()),
        })
}
