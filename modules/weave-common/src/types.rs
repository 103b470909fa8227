use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signature::EventSignature;

// --- Classification Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Birthday,
    Anniversary,
    Holiday,
    Meal,
    Social,
    Activity,
    Meeting,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Birthday => write!(f, "birthday"),
            EventType::Anniversary => write!(f, "anniversary"),
            EventType::Holiday => write!(f, "holiday"),
            EventType::Meal => write!(f, "meal"),
            EventType::Social => write!(f, "social"),
            EventType::Activity => write!(f, "activity"),
            EventType::Meeting => write!(f, "meeting"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Critical,
    High,
    Medium,
    Low,
}

/// Outcome of running a title (plus its calendar date) through the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassificationResult {
    pub event_type: EventType,
    pub importance: Importance,
    /// 0.9 structural match, 0.6 keyword fallback, 0.8 fixed-date holiday.
    pub confidence: f64,
    pub suggested_category: Option<String>,
}

// --- Contacts ---

/// Relationship closeness, innermost first. Weights are strictly decreasing
/// so attention ranking always favors the inner circle at equal scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipTier {
    Inner,
    Close,
    Community,
}

impl RelationshipTier {
    pub fn attention_weight(self) -> f64 {
        match self {
            RelationshipTier::Inner => 3.0,
            RelationshipTier::Close => 2.0,
            RelationshipTier::Community => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Friend {
    pub id: Uuid,
    pub name: String,
    pub tier: RelationshipTier,
    /// Relationship health score, 0-100. Computed elsewhere; consumed here
    /// only as an input to attention ranking.
    pub relationship_score: f64,
}

// --- Calendar Input ---

/// A calendar entry as handed over by the on-device calendar source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    /// Attendee display names, when the calendar exposes them.
    #[serde(default)]
    pub attendees: Vec<String>,
}

// --- Name Extraction & Attribution ---

/// Which surface pattern produced a name candidate. Kept on the candidate so
/// the matcher and tests can reason about provenance per extracted name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NamePattern {
    /// "dinner with Sarah"
    With,
    /// "lunch with Sarah and Tom"
    And,
    /// "Sarah's birthday"
    Possessive,
    /// "Sarah: coffee catchup"
    LeadingName,
    /// Taken from the calendar attendee list, not the title.
    Attendee,
}

impl std::fmt::Display for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamePattern::With => write!(f, "with"),
            NamePattern::And => write!(f, "and"),
            NamePattern::Possessive => write!(f, "possessive"),
            NamePattern::LeadingName => write!(f, "leading_name"),
            NamePattern::Attendee => write!(f, "attendee"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NameCandidate {
    pub text: String,
    pub pattern: NamePattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchedFriend {
    pub friend_id: Uuid,
    pub name: String,
    /// 1.0 full-name equality, 0.75 first-token equality.
    pub match_confidence: f64,
}

/// Verdict for a single extracted name against the contact directory.
/// Ambiguity is a first-class outcome — never resolved by picking arbitrarily.
#[derive(Debug, Clone, PartialEq)]
pub enum NameResolution {
    Unique(MatchedFriend),
    /// More than one contact matched; ids of all candidates, for the UI to ask.
    Ambiguous(Vec<Uuid>),
    Unmatched,
}

/// A name the matcher could not resolve to exactly one contact.
/// Empty `options` means nobody matched; two or more means the user must pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UnresolvedName {
    pub candidate: NameCandidate,
    pub options: Vec<Uuid>,
}

// --- Scanned Events ---

/// A calendar entry classified as a candidate social interaction.
///
/// Built by the classifier and enriched stage by stage. Enrichment is
/// by-value (`with_*` methods return a new event); nothing mutates a
/// `ScannedEvent` in place once a pipeline stage has handed it on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScannedEvent {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub event_type: EventType,
    pub importance: Importance,
    pub confidence: f64,
    pub suggested_category: Option<String>,
    pub extracted_names: Vec<NameCandidate>,
    pub matched_friends: Vec<MatchedFriend>,
    pub unresolved_names: Vec<UnresolvedName>,
}

impl ScannedEvent {
    pub fn from_raw(raw: &RawEvent, classification: ClassificationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: raw.title.clone(),
            start: raw.start,
            end: raw.end,
            all_day: raw.all_day,
            location: raw.location.clone(),
            event_type: classification.event_type,
            importance: classification.importance,
            confidence: classification.confidence,
            suggested_category: classification.suggested_category,
            extracted_names: Vec::new(),
            matched_friends: Vec::new(),
            unresolved_names: Vec::new(),
        }
    }

    pub fn with_extracted_names(mut self, names: Vec<NameCandidate>) -> Self {
        self.extracted_names = names;
        self
    }

    /// Append attribution results. Matched friends are append-only within a
    /// pipeline pass; a friend already attributed is not added twice.
    pub fn with_attribution(
        mut self,
        matched: Vec<MatchedFriend>,
        unresolved: Vec<UnresolvedName>,
    ) -> Self {
        for m in matched {
            if !self.matched_friends.iter().any(|f| f.friend_id == m.friend_id) {
                self.matched_friends.push(m);
            }
        }
        self.unresolved_names.extend(unresolved);
        self
    }

    /// True when at least one extracted name resolved to zero or multiple
    /// contacts — the UI must ask the user to pick, never guess.
    pub fn needs_disambiguation(&self) -> bool {
        !self.extracted_names.is_empty() && !self.unresolved_names.is_empty()
    }

    pub fn matched_friend_ids(&self) -> Vec<Uuid> {
        self.matched_friends.iter().map(|f| f.friend_id).collect()
    }

    pub fn signature(&self) -> EventSignature {
        EventSignature::derive(self.event_type, &self.matched_friend_ids(), &self.title)
    }

    /// The write shape the interaction store expects when the user accepts
    /// this candidate.
    pub fn to_interaction(&self) -> NewInteraction {
        NewInteraction {
            date: self.start,
            category: self
                .suggested_category
                .clone()
                .unwrap_or_else(|| self.event_type.to_string()),
            friend_ids: self.matched_friend_ids(),
            notes: None,
            mood: None,
        }
    }
}

// --- Interaction Store Records ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Completed,
    Planned,
}

/// A previously recorded interaction, consumed read-only for dedup and
/// weekly aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InteractionRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub status: InteractionStatus,
    pub category: Option<String>,
    pub friend_ids: Vec<Uuid>,
}

/// Write shape for `InteractionStore::create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NewInteraction {
    pub date: DateTime<Utc>,
    pub category: String,
    pub friend_ids: Vec<Uuid>,
    pub notes: Option<String>,
    pub mood: Option<String>,
}

// --- Feedback Log ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Accepted,
    Dismissed,
    Snoozed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DismissalReason {
    NotSocial,
    WrongPerson,
    AlreadyLogged,
    NotInterested,
}

impl std::fmt::Display for DismissalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DismissalReason::NotSocial => write!(f, "not a social event"),
            DismissalReason::WrongPerson => write!(f, "wrong person"),
            DismissalReason::AlreadyLogged => write!(f, "already logged"),
            DismissalReason::NotInterested => write!(f, "not interested"),
        }
    }
}

/// What a snooze applies to: one friend, or any event whose normalized title
/// matches the stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SnoozeScope {
    Friend(Uuid),
    TitlePattern(String),
}

/// One entry in the append-only feedback log. Immutable once written; every
/// suppression decision is derived by replaying this log, never by mutating
/// shared counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeedbackRecord {
    pub signature: EventSignature,
    pub action: FeedbackAction,
    pub dismissal_reason: Option<DismissalReason>,
    pub snooze_until: Option<DateTime<Utc>>,
    pub snooze_scope: Option<SnoozeScope>,
    pub created_at: DateTime<Utc>,
}

// --- Review / Summary Output ---

/// A completed weekly review, keyed by the Saturday that closed the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewRecord {
    pub week_ending: NaiveDate,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FriendActivity {
    pub friend_id: Uuid,
    pub name: String,
    pub count: u32,
    pub last_interaction: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Reconnection {
    pub friend_id: Uuid,
    pub name: String,
    /// Exact gap between the in-window contact and the most recent
    /// interaction strictly before the window.
    pub days_since: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttentionEntry {
    pub friend_id: Uuid,
    pub name: String,
    pub tier: RelationshipTier,
    /// `(100 - relationship_score) * tier_weight`
    pub score: f64,
}

/// Rolled-up statistics for one calendar week. Computed, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_weaves: u32,
    pub friends_contacted: u32,
    pub top_activity: Option<String>,
    pub friend_activity: Vec<FriendActivity>,
    pub reconnections: Vec<Reconnection>,
    pub week_streak: u32,
    pub attention_ranking: Vec<AttentionEntry>,
}

/// The filtered candidate set handed to the review surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeeklyEventReview {
    pub events: Vec<ScannedEvent>,
    pub total_scanned: u32,
    pub filtered_count: u32,
    pub ambiguous_count: u32,
}
