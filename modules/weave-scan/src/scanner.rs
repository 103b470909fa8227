//! Scan orchestration.
//!
//! One scan is a single-pass, side-effect-free batch transformation:
//! prefetch everything (contacts via the coalescing cache, interactions for
//! the range plus the dedup buffer, the feedback log), then run
//! classify → extract → resolve → dedup → filter over immutable inputs.
//! A scan that fails partway (e.g. calendar permission revoked mid-run)
//! fails the whole operation — callers never see a partial list.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use weave_common::{
    FeedbackAction, FeedbackRecord, NameCandidate, NamePattern, NameResolution, ScanConfig,
    ScannedEvent, UnresolvedName, WeaveError, WeeklyEventReview,
};

use crate::cache::{Clock, CoalescingCache};
use crate::catalog::Catalog;
use crate::classifier::classify;
use crate::dedup::DedupIndex;
use crate::filter::{is_ambiguous, SuppressionIndex};
use crate::matcher::resolve_names;
use crate::names::extract_names;
use crate::stats::ScanStats;
use crate::traits::{CalendarSource, ContactDirectory, FeedbackStore, InteractionStore};

/// Per-item tally from a batch accept. One persistence failure never rolls
/// back or blocks the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcceptOutcome {
    pub logged: u32,
    pub failed: u32,
}

pub struct EventScanner {
    calendar: Arc<dyn CalendarSource>,
    contacts: Arc<dyn ContactDirectory>,
    interactions: Arc<dyn InteractionStore>,
    feedback: Arc<dyn FeedbackStore>,
    catalog: Catalog,
    config: ScanConfig,
    contact_cache: CoalescingCache<Vec<weave_common::Friend>>,
    feedback_cache: CoalescingCache<Vec<FeedbackRecord>>,
}

impl EventScanner {
    pub fn new(
        calendar: Arc<dyn CalendarSource>,
        contacts: Arc<dyn ContactDirectory>,
        interactions: Arc<dyn InteractionStore>,
        feedback: Arc<dyn FeedbackStore>,
        config: ScanConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            calendar,
            contacts,
            interactions,
            feedback,
            catalog: Catalog::standard(),
            contact_cache: CoalescingCache::new(config.cache_ttl, clock.clone()),
            feedback_cache: CoalescingCache::new(config.cache_ttl, clock),
            config,
        }
    }

    /// Scan the calendar range and return the filtered candidate set.
    ///
    /// `now` is passed explicitly so snooze expiry and the feedback horizon
    /// are deterministic under test.
    pub async fn scan(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<WeeklyEventReview, WeaveError> {
        let directory = {
            let contacts = self.contacts.clone();
            self.contact_cache
                .get_or_fetch(move || async move { contacts.list_contacts().await })
                .await?
        };

        let raw_events = self.calendar.list_events(start, end).await?;

        // Batch prefetch: all candidate interactions for the range plus the
        // dedup buffer on both sides, in one query.
        let buffer = Duration::hours(self.config.dedup_window_hours);
        let prior = self
            .interactions
            .list_completed(start - buffer, end + buffer)
            .await?;
        let dedup = DedupIndex::build(&prior, self.config.dedup_window_hours);

        let feedback_log = {
            let feedback = self.feedback.clone();
            let since = now - Duration::days(self.config.feedback_horizon_days);
            self.feedback_cache
                .get_or_fetch(move || async move { feedback.list_since(since).await })
                .await?
        };
        let suppression = SuppressionIndex::build(&feedback_log, self.config.min_dismissals);

        let mut stats = ScanStats {
            events_scanned: raw_events.len() as u32,
            ..ScanStats::default()
        };
        let mut surfaced: Vec<ScannedEvent> = Vec::new();
        let mut filtered_count = 0u32;
        let mut ambiguous_count = 0u32;

        for raw in &raw_events {
            let Some(classification) = classify(&self.catalog, &raw.title, raw.start.date_naive())
            else {
                // Not an error — just not a social-interaction candidate.
                stats.unclassified += 1;
                continue;
            };
            stats.classified += 1;

            let mut candidates = extract_names(&raw.title);
            stats.names_extracted += candidates.len() as u32;
            let title_names = candidates.len();
            candidates.extend(raw.attendees.iter().map(|a| NameCandidate {
                text: a.clone(),
                pattern: NamePattern::Attendee,
            }));

            let mut matched = Vec::new();
            let mut unresolved = Vec::new();
            for (idx, (candidate, resolution)) in
                resolve_names(&candidates, &directory).into_iter().enumerate()
            {
                match resolution {
                    NameResolution::Unique(m) => matched.push(m),
                    NameResolution::Ambiguous(options) => {
                        unresolved.push(UnresolvedName { candidate, options })
                    }
                    // An unmatched title name needs the user; an unmatched
                    // attendee string (often an email) is just noise.
                    NameResolution::Unmatched if idx < title_names => {
                        unresolved.push(UnresolvedName {
                            candidate,
                            options: vec![],
                        })
                    }
                    NameResolution::Unmatched => {}
                }
            }

            let event = ScannedEvent::from_raw(raw, classification)
                .with_extracted_names(candidates)
                .with_attribution(matched, unresolved);
            if !event.matched_friends.is_empty() {
                stats.events_attributed += 1;
            }

            if dedup.is_already_logged(&event) {
                info!(title = %event.title, "candidate already logged, dropping");
                stats.already_logged += 1;
                filtered_count += 1;
                continue;
            }

            let verdict = suppression.evaluate(&event, now);
            if verdict.suppress {
                info!(
                    title = %event.title,
                    reason = verdict.reason.as_deref().unwrap_or(""),
                    "candidate suppressed by feedback"
                );
                stats.suppressed += 1;
                filtered_count += 1;
                continue;
            }

            if is_ambiguous(&event) {
                ambiguous_count += 1;
                stats.ambiguous += 1;
            }
            surfaced.push(event);
        }

        stats.surfaced = surfaced.len() as u32;
        info!("{stats}");

        Ok(WeeklyEventReview {
            events: surfaced,
            total_scanned: stats.events_scanned,
            filtered_count,
            ambiguous_count,
        })
    }

    /// Persist a batch of accepted candidates. Failures are isolated per
    /// item; the caller gets a tally, not an all-or-nothing result.
    pub async fn accept_events(&self, events: &[ScannedEvent], now: DateTime<Utc>) -> AcceptOutcome {
        let mut outcome = AcceptOutcome::default();
        for event in events {
            match self.interactions.create(&event.to_interaction()).await {
                Ok(id) => {
                    outcome.logged += 1;
                    info!(interaction_id = %id, title = %event.title, "candidate accepted");
                    let record = FeedbackRecord {
                        signature: event.signature(),
                        action: FeedbackAction::Accepted,
                        dismissal_reason: None,
                        snooze_until: None,
                        snooze_scope: None,
                        created_at: now,
                    };
                    // Feedback is best-effort here; losing it costs one
                    // ranking hint, not user data.
                    if let Err(e) = self.feedback.append(&record).await {
                        warn!(error = %e, title = %event.title, "accept feedback not recorded");
                    }
                }
                Err(e) => {
                    outcome.failed += 1;
                    warn!(error = %e, title = %event.title, "failed to persist accepted candidate");
                }
            }
        }
        self.feedback_cache.invalidate().await;
        outcome
    }

    /// Append a dismissal or snooze to the feedback log and drop the cached
    /// log so the next scan sees it.
    pub async fn record_feedback(&self, record: &FeedbackRecord) -> Result<(), WeaveError> {
        self.feedback.append(record).await?;
        self.feedback_cache.invalidate().await;
        Ok(())
    }
}
