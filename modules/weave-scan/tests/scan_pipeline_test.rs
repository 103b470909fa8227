//! End-to-end pipeline tests over in-memory fakes of the external stores.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use weave_common::{
    EventSignature, EventType, FeedbackAction, FeedbackRecord, Friend, InteractionRecord,
    InteractionStatus, NewInteraction, RawEvent, RelationshipTier, ScanConfig, SnoozeScope,
    WeaveError,
};
use weave_scan::scanner::{AcceptOutcome, EventScanner};
use weave_scan::traits::{CalendarSource, ContactDirectory, FeedbackStore, InteractionStore};
use weave_scan::SystemClock;

// --- Fakes ---

struct FakeCalendar {
    events: Vec<RawEvent>,
    deny: bool,
}

#[async_trait]
impl CalendarSource for FakeCalendar {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, WeaveError> {
        if self.deny {
            return Err(WeaveError::PermissionDenied("calendar access".into()));
        }
        Ok(self
            .events
            .iter()
            .filter(|e| e.start >= start && e.start <= end)
            .cloned()
            .collect())
    }
}

struct FakeDirectory {
    contacts: Vec<Friend>,
}

#[async_trait]
impl ContactDirectory for FakeDirectory {
    async fn list_contacts(&self) -> Result<Vec<Friend>, WeaveError> {
        Ok(self.contacts.clone())
    }
}

/// Interaction store that can be told to fail the Nth create call.
struct FakeInteractions {
    completed: Vec<InteractionRecord>,
    created: Mutex<Vec<NewInteraction>>,
    create_calls: AtomicU32,
    fail_on_call: Option<u32>,
}

impl FakeInteractions {
    fn new(completed: Vec<InteractionRecord>) -> Self {
        Self {
            completed,
            created: Mutex::new(Vec::new()),
            create_calls: AtomicU32::new(0),
            fail_on_call: None,
        }
    }
}

#[async_trait]
impl InteractionStore for FakeInteractions {
    async fn list_completed(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<InteractionRecord>, WeaveError> {
        Ok(self
            .completed
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .cloned()
            .collect())
    }

    async fn create(&self, record: &NewInteraction) -> Result<Uuid, WeaveError> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(WeaveError::Persistence("disk full".into()));
        }
        self.created.lock().unwrap().push(record.clone());
        Ok(Uuid::new_v4())
    }
}

#[derive(Default)]
struct FakeFeedback {
    records: Mutex<Vec<FeedbackRecord>>,
}

#[async_trait]
impl FeedbackStore for FakeFeedback {
    async fn append(&self, record: &FeedbackRecord) -> Result<(), WeaveError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<FeedbackRecord>, WeaveError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.created_at >= since)
            .cloned()
            .collect())
    }
}

// --- Fixtures ---

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 12, 9, 0, 0).unwrap()
}

fn event(title: &str, start: DateTime<Utc>) -> RawEvent {
    RawEvent {
        title: title.to_string(),
        start,
        end: start + Duration::hours(2),
        all_day: false,
        location: None,
        attendees: vec![],
    }
}

fn friend(name: &str) -> Friend {
    Friend {
        id: Uuid::new_v4(),
        name: name.to_string(),
        tier: RelationshipTier::Close,
        relationship_score: 60.0,
    }
}

struct Harness {
    scanner: EventScanner,
    interactions: Arc<FakeInteractions>,
    feedback: Arc<FakeFeedback>,
}

fn harness(
    events: Vec<RawEvent>,
    contacts: Vec<Friend>,
    completed: Vec<InteractionRecord>,
) -> Harness {
    harness_with(events, contacts, completed, vec![], false, None)
}

fn harness_with(
    events: Vec<RawEvent>,
    contacts: Vec<Friend>,
    completed: Vec<InteractionRecord>,
    feedback: Vec<FeedbackRecord>,
    deny_calendar: bool,
    fail_create_on: Option<u32>,
) -> Harness {
    let mut interactions = FakeInteractions::new(completed);
    interactions.fail_on_call = fail_create_on;
    let interactions = Arc::new(interactions);
    let feedback_store = Arc::new(FakeFeedback {
        records: Mutex::new(feedback),
    });
    let scanner = EventScanner::new(
        Arc::new(FakeCalendar {
            events,
            deny: deny_calendar,
        }),
        Arc::new(FakeDirectory { contacts }),
        interactions.clone(),
        feedback_store.clone(),
        ScanConfig::default(),
        Arc::new(SystemClock),
    );
    Harness {
        scanner,
        interactions,
        feedback: feedback_store,
    }
}

fn scan_range() -> (DateTime<Utc>, DateTime<Utc>) {
    (now() - Duration::days(7), now() + Duration::days(7))
}

// --- Scan ---

#[tokio::test]
async fn scan_surfaces_classified_attributed_events() {
    init_tracing();
    let sarah = friend("Sarah Chen");
    let h = harness(
        vec![
            event("Dinner with Sarah", now() + Duration::days(1)),
            event("Team Standup", now() + Duration::days(1)),
        ],
        vec![sarah.clone()],
        vec![],
    );
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();

    assert_eq!(review.total_scanned, 2);
    assert_eq!(review.events.len(), 1);
    assert_eq!(review.ambiguous_count, 0);
    let ev = &review.events[0];
    assert_eq!(ev.event_type, EventType::Meal);
    assert_eq!(ev.matched_friends.len(), 1);
    assert_eq!(ev.matched_friends[0].friend_id, sarah.id);
}

#[tokio::test]
async fn permission_denied_fails_the_whole_scan() {
    let h = harness_with(
        vec![event("Dinner with Sarah", now())],
        vec![friend("Sarah Chen")],
        vec![],
        vec![],
        true,
        None,
    );
    let (start, end) = scan_range();
    let err = h.scanner.scan(start, end, now()).await.unwrap_err();
    assert!(matches!(err, WeaveError::PermissionDenied(_)));
}

#[tokio::test]
async fn already_logged_event_is_filtered() {
    let sarah = friend("Sarah Chen");
    let dinner_at = now() + Duration::days(1);
    let logged = InteractionRecord {
        id: Uuid::new_v4(),
        date: dinner_at + Duration::hours(2), // inside ±3h
        status: InteractionStatus::Completed,
        category: Some("meal".to_string()),
        friend_ids: vec![sarah.id],
    };
    let h = harness(
        vec![event("Dinner with Sarah", dinner_at)],
        vec![sarah],
        vec![logged],
    );
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();
    assert!(review.events.is_empty());
    assert_eq!(review.filtered_count, 1);
}

#[tokio::test]
async fn interaction_outside_window_does_not_dedup() {
    let sarah = friend("Sarah Chen");
    let dinner_at = now() + Duration::days(1);
    let logged = InteractionRecord {
        id: Uuid::new_v4(),
        date: dinner_at + Duration::hours(4), // outside ±3h
        status: InteractionStatus::Completed,
        category: Some("meal".to_string()),
        friend_ids: vec![sarah.id],
    };
    let h = harness(
        vec![event("Dinner with Sarah", dinner_at)],
        vec![sarah],
        vec![logged],
    );
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();
    assert_eq!(review.events.len(), 1);
    assert_eq!(review.filtered_count, 0);
}

#[tokio::test]
async fn dismissed_signature_is_suppressed_on_next_scan() {
    let sarah = friend("Sarah Chen");
    let sig = EventSignature::derive(EventType::Meal, &[sarah.id], "Dinner with Sarah");
    let dismissal = FeedbackRecord {
        signature: sig,
        action: FeedbackAction::Dismissed,
        dismissal_reason: None,
        snooze_until: None,
        snooze_scope: None,
        created_at: now() - Duration::days(7),
    };
    let h = harness_with(
        vec![event("Dinner with Sarah", now() + Duration::days(1))],
        vec![sarah],
        vec![],
        vec![dismissal],
        false,
        None,
    );
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();
    assert!(review.events.is_empty());
    assert_eq!(review.filtered_count, 1);
}

#[tokio::test]
async fn expired_snooze_does_not_suppress() {
    let sarah = friend("Sarah Chen");
    let snooze = FeedbackRecord {
        signature: EventSignature::derive(EventType::Meal, &[sarah.id], "Dinner with Sarah"),
        action: FeedbackAction::Snoozed,
        dismissal_reason: None,
        snooze_until: Some(now() - Duration::days(1)),
        snooze_scope: Some(SnoozeScope::Friend(sarah.id)),
        created_at: now() - Duration::days(10),
    };
    let h = harness_with(
        vec![event("Dinner with Sarah", now() + Duration::days(1))],
        vec![sarah],
        vec![],
        vec![snooze],
        false,
        None,
    );
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();
    assert_eq!(review.events.len(), 1);
}

#[tokio::test]
async fn ambiguous_name_is_surfaced_and_tagged() {
    let h = harness(
        vec![event("Lunch with Sarah", now() + Duration::days(1))],
        vec![friend("Sarah Chen"), friend("Sarah Miller")],
        vec![],
    );
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();
    assert_eq!(review.events.len(), 1);
    assert_eq!(review.ambiguous_count, 1);
    let ev = &review.events[0];
    assert!(ev.needs_disambiguation());
    assert_eq!(ev.unresolved_names[0].options.len(), 2);
    assert!(ev.matched_friends.is_empty());
}

#[tokio::test]
async fn attendees_attribute_without_title_names() {
    let maya = friend("Maya Lin");
    let mut raw = event("Holiday brunch", now() + Duration::days(1));
    raw.attendees = vec!["Maya Lin".to_string(), "noreply@example.com".to_string()];
    let h = harness(vec![raw], vec![maya.clone()], vec![]);
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();
    assert_eq!(review.events.len(), 1);
    let ev = &review.events[0];
    assert_eq!(ev.matched_friends.len(), 1);
    assert_eq!(ev.matched_friends[0].friend_id, maya.id);
    // Unmatched attendee strings are noise, not ambiguity.
    assert!(!ev.needs_disambiguation());
}

// --- Batch accept ---

#[tokio::test]
async fn batch_accept_isolates_failures() {
    let sarah = friend("Sarah Chen");
    let h = harness_with(
        vec![
            event("Dinner with Sarah", now() + Duration::days(1)),
            event("Coffee with Sarah", now() + Duration::days(2)),
            event("Brunch with Sarah", now() + Duration::days(3)),
        ],
        vec![sarah],
        vec![],
        vec![],
        false,
        Some(2), // second create fails
    );
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();
    assert_eq!(review.events.len(), 3);

    let outcome = h.scanner.accept_events(&review.events, now()).await;
    assert_eq!(outcome, AcceptOutcome { logged: 2, failed: 1 });

    // 1st and 3rd are durably recorded.
    let created = h.interactions.created.lock().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].date, review.events[0].start);
    assert_eq!(created[1].date, review.events[2].start);
}

#[tokio::test]
async fn accept_appends_accepted_feedback() {
    let sarah = friend("Sarah Chen");
    let h = harness(
        vec![event("Dinner with Sarah", now() + Duration::days(1))],
        vec![sarah],
        vec![],
    );
    let (start, end) = scan_range();
    let review = h.scanner.scan(start, end, now()).await.unwrap();
    let outcome = h.scanner.accept_events(&review.events, now()).await;
    assert_eq!(outcome.logged, 1);

    let records = h.feedback.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, FeedbackAction::Accepted);
}
