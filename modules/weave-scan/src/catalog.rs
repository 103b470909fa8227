//! Static pattern catalog for event classification.
//!
//! Pure data, built once at startup and never mutated: an ordered list of
//! event-type patterns (structural regex matchers first, fuzzy keywords as
//! fallback) plus a small fixed-date holiday table. Catalog order is priority
//! order — the classifier stops at the first pattern that matches.

use regex::Regex;

use weave_common::{EventType, Importance};

pub struct EventPattern {
    pub event_type: EventType,
    pub importance: Importance,
    /// Ordered, higher-confidence first. Any hit counts as a structural match.
    matchers: Vec<Regex>,
    /// Fallback substring terms, checked against the lowercased title.
    keywords: &'static [&'static str],
    pub suggested_category: &'static str,
}

impl EventPattern {
    fn new(
        event_type: EventType,
        importance: Importance,
        matchers: &[&str],
        keywords: &'static [&'static str],
        suggested_category: &'static str,
    ) -> Self {
        let matchers = matchers
            .iter()
            .map(|p| Regex::new(p).expect("valid catalog regex"))
            .collect();
        Self {
            event_type,
            importance,
            matchers,
            keywords,
            suggested_category,
        }
    }

    pub fn structural_match(&self, title: &str) -> bool {
        self.matchers.iter().any(|re| re.is_match(title))
    }

    pub fn keyword_match(&self, title_lower: &str) -> bool {
        self.keywords.iter().any(|kw| title_lower.contains(kw))
    }
}

/// A holiday matched by calendar date, independent of the event title.
pub struct FixedDateHoliday {
    pub month: u32,
    pub day: u32,
    pub name: &'static str,
    pub importance: Importance,
}

pub struct Catalog {
    patterns: Vec<EventPattern>,
    holidays: Vec<FixedDateHoliday>,
}

impl Catalog {
    /// The standard catalog. Order is priority order.
    pub fn standard() -> Self {
        let patterns = vec![
            EventPattern::new(
                EventType::Birthday,
                Importance::Critical,
                &[
                    r"(?i)\b[a-z]+'s\s+birthday\b",
                    r"(?i)\bbirthday\s+(party|dinner|drinks|brunch|lunch)\b",
                    r"(?i)\b(birthday|bday)\b",
                ],
                &["birthday", "bday", "turns "],
                "birthday",
            ),
            EventPattern::new(
                EventType::Anniversary,
                Importance::Critical,
                &[
                    r"(?i)\b[a-z]+'s\s+anniversary\b",
                    r"(?i)\b(wedding\s+)?anniversary\b",
                ],
                &["anniversary"],
                "special_occasion",
            ),
            EventPattern::new(
                EventType::Holiday,
                Importance::High,
                &[
                    r"(?i)\b(christmas|xmas)\b",
                    r"(?i)\bthanksgiving\b",
                    r"(?i)\b(hanukkah|chanukah|diwali|eid|easter|passover)\b",
                    r"(?i)\bnew\s+year'?s?\b",
                ],
                &["christmas", "thanksgiving", "easter", "hanukkah", "diwali"],
                "holiday",
            ),
            EventPattern::new(
                EventType::Meal,
                Importance::High,
                &[
                    r"(?i)\b(dinner|lunch|brunch|breakfast)\s+(with|at|@)\b",
                    r"(?i)\b(coffee|boba|tea)\s+with\b",
                    r"(?i)\b(dinner|lunch|brunch|breakfast)\b",
                ],
                &["dinner", "lunch", "brunch", "breakfast", "coffee", "boba"],
                "meal",
            ),
            EventPattern::new(
                EventType::Social,
                Importance::Medium,
                &[
                    r"(?i)\b(drinks|hangout|hang\s+out)\s+with\b",
                    r"(?i)\b(party|game\s+night|movie\s+night|bbq|barbecue|picnic|housewarming)\b",
                    r"(?i)\b(drinks|hangout)\b",
                ],
                &["party", "drinks", "hangout", "bbq", "picnic", "movie"],
                "social",
            ),
            EventPattern::new(
                EventType::Activity,
                Importance::Medium,
                &[
                    r"(?i)\b(hike|run|ride|climb|swim|walk)\s+with\b",
                    r"(?i)\b(hiking|climbing|yoga|tennis|golf|pickleball|bowling|skiing)\b",
                    r"(?i)\b(gym|workout)\s+with\b",
                ],
                &["hike", "hiking", "climbing", "yoga", "tennis", "golf", "bowling"],
                "activity",
            ),
            EventPattern::new(
                EventType::Meeting,
                Importance::Low,
                &[
                    r"(?i)\b(call|facetime|zoom)\s+with\b",
                    r"(?i)\bcatch(ing)?[\s-]?up\s+(call|with)\b",
                ],
                &["phone call", "video call", "facetime"],
                "call",
            ),
        ];

        let holidays = vec![
            FixedDateHoliday { month: 1, day: 1, name: "New Year's Day", importance: Importance::High },
            FixedDateHoliday { month: 2, day: 14, name: "Valentine's Day", importance: Importance::High },
            FixedDateHoliday { month: 10, day: 31, name: "Halloween", importance: Importance::Medium },
            FixedDateHoliday { month: 12, day: 24, name: "Christmas Eve", importance: Importance::High },
            FixedDateHoliday { month: 12, day: 25, name: "Christmas Day", importance: Importance::Critical },
            FixedDateHoliday { month: 12, day: 31, name: "New Year's Eve", importance: Importance::High },
        ];

        Self { patterns, holidays }
    }

    pub fn patterns(&self) -> &[EventPattern] {
        &self.patterns
    }

    pub fn holiday_on(&self, month: u32, day: u32) -> Option<&FixedDateHoliday> {
        self.holidays.iter().find(|h| h.month == month && h.day == day)
    }
}
