//! Dedup against already-logged interactions.
//!
//! All candidate interactions for the scan range (plus the window buffer on
//! both sides) are prefetched once and indexed in memory; per-event checks
//! run purely over that index. One prefetch per scan, never one query per
//! event — the batch-prefetch property is a design invariant, not an
//! optimization.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use weave_common::{InteractionRecord, InteractionStatus, ScannedEvent};

struct IndexedInteraction {
    date: DateTime<Utc>,
    friend_ids: HashSet<Uuid>,
}

/// In-memory index over completed interactions, sorted by date.
pub struct DedupIndex {
    window: Duration,
    interactions: Vec<IndexedInteraction>,
}

impl DedupIndex {
    /// Build from a prefetched batch. Planned interactions and completed
    /// interactions with no attributed friends are skipped — they can never
    /// satisfy the overlap rule.
    pub fn build(records: &[InteractionRecord], window_hours: i64) -> Self {
        let mut interactions: Vec<IndexedInteraction> = records
            .iter()
            .filter(|r| r.status == InteractionStatus::Completed && !r.friend_ids.is_empty())
            .map(|r| IndexedInteraction {
                date: r.date,
                friend_ids: r.friend_ids.iter().copied().collect(),
            })
            .collect();
        interactions.sort_by_key(|i| i.date);
        Self {
            window: Duration::hours(window_hours),
            interactions,
        }
    }

    /// True iff a completed interaction falls within ±window of the event
    /// start AND its attributed-friend set intersects the event's. Partial
    /// overlap is sufficient — a two-person dinner logged as three friends
    /// still counts. An event with no attributed friends is never considered
    /// already logged.
    pub fn is_already_logged(&self, event: &ScannedEvent) -> bool {
        if event.matched_friends.is_empty() {
            return false;
        }
        let event_friends: HashSet<Uuid> = event.matched_friend_ids().into_iter().collect();
        let lo = event.start - self.window;
        let hi = event.start + self.window;

        let start_idx = self.interactions.partition_point(|i| i.date < lo);
        self.interactions[start_idx..]
            .iter()
            .take_while(|i| i.date <= hi)
            .any(|i| !i.friend_ids.is_disjoint(&event_friends))
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }
}
