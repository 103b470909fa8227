//! Adaptive suppression from user feedback.
//!
//! The feedback log is append-only; this module never mutates it. The
//! `SuppressionIndex` is a pure fold over the log, so replaying the same
//! records always yields the same suppression decisions — there are no
//! hidden mutable counters.
//!
//! Suppression and ambiguity are independent axes: an event can be both,
//! neither, or either. Ambiguous-but-not-suppressed events are still
//! surfaced, tagged for disambiguation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use weave_common::{
    normalize_title, DismissalReason, EventSignature, FeedbackAction, FeedbackRecord, ScannedEvent,
    SnoozeScope,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub suppress: bool,
    pub reason: Option<String>,
}

impl Verdict {
    fn pass() -> Self {
        Self {
            suppress: false,
            reason: None,
        }
    }

    fn suppress(reason: String) -> Self {
        Self {
            suppress: true,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Default)]
struct DismissalEntry {
    count: u32,
    latest: Option<DateTime<Utc>>,
    reason: Option<DismissalReason>,
}

/// Aggregated view of the feedback log, keyed for O(1)-ish lookups during a
/// scan. Built once per scan from the replayed log.
pub struct SuppressionIndex {
    min_dismissals: u32,
    dismissals: HashMap<EventSignature, DismissalEntry>,
    /// friend id → latest snooze_until seen for that friend.
    friend_snoozes: HashMap<Uuid, DateTime<Utc>>,
    /// normalized title key → latest snooze_until for that pattern.
    pattern_snoozes: HashMap<String, DateTime<Utc>>,
}

impl SuppressionIndex {
    pub fn build(log: &[FeedbackRecord], min_dismissals: u32) -> Self {
        let mut dismissals: HashMap<EventSignature, DismissalEntry> = HashMap::new();
        let mut friend_snoozes: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
        let mut pattern_snoozes: HashMap<String, DateTime<Utc>> = HashMap::new();

        for record in log {
            match record.action {
                FeedbackAction::Dismissed => {
                    let entry = dismissals.entry(record.signature.clone()).or_default();
                    entry.count += 1;
                    // Latest-by-created_at wins, independent of log order.
                    if entry.latest.is_none_or(|t| record.created_at >= t) {
                        entry.latest = Some(record.created_at);
                        entry.reason = record.dismissal_reason;
                    }
                }
                FeedbackAction::Snoozed => {
                    let Some(until) = record.snooze_until else {
                        continue;
                    };
                    match &record.snooze_scope {
                        Some(SnoozeScope::Friend(id)) => {
                            let slot = friend_snoozes.entry(*id).or_insert(until);
                            *slot = (*slot).max(until);
                        }
                        Some(SnoozeScope::TitlePattern(p)) => {
                            let key = normalize_title(p);
                            let slot = pattern_snoozes.entry(key).or_insert(until);
                            *slot = (*slot).max(until);
                        }
                        // Unscoped snoozes have nothing to match against.
                        None => {}
                    }
                }
                FeedbackAction::Accepted => {}
            }
        }

        Self {
            min_dismissals,
            dismissals,
            friend_snoozes,
            pattern_snoozes,
        }
    }

    /// Decide whether to suppress `event` as of `now`. Expired snoozes never
    /// suppress.
    pub fn evaluate(&self, event: &ScannedEvent, now: DateTime<Utc>) -> Verdict {
        let signature = event.signature();
        if let Some(entry) = self.dismissals.get(&signature) {
            if entry.count >= self.min_dismissals {
                let reason = match entry.reason {
                    Some(r) => format!("dismissed {} time(s) before: {r}", entry.count),
                    None => format!("dismissed {} time(s) before", entry.count),
                };
                return Verdict::suppress(reason);
            }
        }

        for friend in &event.matched_friends {
            if let Some(until) = self.friend_snoozes.get(&friend.friend_id) {
                if *until > now {
                    return Verdict::suppress(format!(
                        "snoozed for {} until {}",
                        friend.name, until
                    ));
                }
            }
        }

        let title_key = normalize_title(&event.title);
        for (pattern, until) in &self.pattern_snoozes {
            if *until > now && title_key.contains(pattern.as_str()) {
                return Verdict::suppress(format!("title pattern snoozed until {until}"));
            }
        }

        Verdict::pass()
    }
}

/// True when the event has extracted names but at least one of them resolved
/// to zero or multiple contacts — the UI must ask, never default.
pub fn is_ambiguous(event: &ScannedEvent) -> bool {
    event.needs_disambiguation()
}
