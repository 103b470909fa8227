use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::EventType;

/// Normalize an event title for signature and pattern-snooze comparison:
/// lowercase, digits stripped, whitespace collapsed.
pub fn normalize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_space = true;
    for c in title.chars() {
        if c.is_ascii_digit() {
            continue;
        }
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            for lc in c.to_lowercase() {
                out.push(lc);
            }
            last_space = false;
        }
    }
    out.trim_end().to_string()
}

/// Identity of a candidate event for feedback purposes: classified type plus
/// the sorted attributed-friend set plus the normalized title.
///
/// Derivation is deterministic so that replaying the same feedback log always
/// reproduces the same suppression decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct EventSignature {
    pub event_type: EventType,
    /// Sorted friend ids, hyphen-joined. Empty string when unattributed.
    pub friend_key: String,
    pub title_key: String,
}

impl EventSignature {
    pub fn derive(event_type: EventType, friend_ids: &[Uuid], title: &str) -> Self {
        let mut ids: Vec<String> = friend_ids.iter().map(|id| id.to_string()).collect();
        ids.sort();
        ids.dedup();
        Self {
            event_type,
            friend_key: ids.join("-"),
            title_key: normalize_title(title),
        }
    }
}

impl std::fmt::Display for EventSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.event_type, self.friend_key, self.title_key)
    }
}
