//! Weekly roll-up of logged interactions and reviews.
//!
//! Pure functions over immutable inputs; nothing here touches a store. Week
//! boundaries follow a fixed Sunday–Saturday convention with a two-day grace
//! period: on Sunday or Monday the summary still targets the previous
//! completed week, giving users time to reflect after the week closes.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::debug;
use uuid::Uuid;

use weave_common::{
    AttentionEntry, Friend, FriendActivity, InteractionRecord, InteractionStatus, Reconnection,
    ReviewRecord, ScanConfig, WeeklySummary,
};

/// The Sunday–Saturday window the summary targets as of `as_of`.
pub fn week_window(as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_from_sunday = as_of.weekday().num_days_from_sunday() as i64;
    let current_week_start = as_of - Duration::days(days_from_sunday);
    let start = match as_of.weekday() {
        // Grace period: the week just closed, reflect on it.
        Weekday::Sun | Weekday::Mon => current_week_start - Duration::days(7),
        _ => current_week_start,
    };
    (start, start + Duration::days(6))
}

/// Consecutive weeks with a completed review, walking backward from the most
/// recent one. A review within ±tolerance days of each expected Saturday
/// keeps the streak alive; the first gap breaks it. A most-recent review more
/// than one week stale means the streak is already dead: 0.
pub fn week_streak(reviews: &[ReviewRecord], as_of: NaiveDate, tolerance_days: i64) -> u32 {
    let Some(latest) = reviews.iter().map(|r| r.week_ending).max() else {
        return 0;
    };

    // Saturday that closed the most recent completed week.
    let days_from_sunday = as_of.weekday().num_days_from_sunday() as i64;
    let last_closed_saturday = as_of - Duration::days(days_from_sunday + 1);
    if (last_closed_saturday - latest).num_days() > 7 {
        return 0;
    }

    let endings: Vec<NaiveDate> = reviews.iter().map(|r| r.week_ending).collect();
    let mut streak = 0u32;
    let mut expected = latest;
    loop {
        let hit = endings
            .iter()
            .any(|e| (*e - expected).num_days().abs() <= tolerance_days);
        if !hit {
            break;
        }
        streak += 1;
        expected = expected - Duration::days(7);
    }
    streak
}

fn in_window(record: &InteractionRecord, start: NaiveDate, end: NaiveDate) -> bool {
    let d = record.date.date_naive();
    record.status == InteractionStatus::Completed && d >= start && d <= end
}

/// Roll up the week ending at (or just before) `as_of`.
pub fn summarize(
    interactions: &[InteractionRecord],
    reviews: &[ReviewRecord],
    friends: &[Friend],
    as_of: NaiveDate,
    config: &ScanConfig,
) -> WeeklySummary {
    let (start, end) = week_window(as_of);
    let by_id: HashMap<Uuid, &Friend> = friends.iter().map(|f| (f.id, f)).collect();

    let current: Vec<&InteractionRecord> = interactions
        .iter()
        .filter(|r| in_window(r, start, end))
        .collect();

    // --- Per-friend counts, ranked ---
    let mut per_friend: HashMap<Uuid, (u32, chrono::DateTime<chrono::Utc>)> = HashMap::new();
    for record in &current {
        for id in &record.friend_ids {
            // Interactions attributed to contacts no longer in the directory
            // are counted in totals but can't be ranked by name.
            if !by_id.contains_key(id) {
                continue;
            }
            let entry = per_friend.entry(*id).or_insert((0, record.date));
            entry.0 += 1;
            entry.1 = entry.1.max(record.date);
        }
    }
    let mut friend_activity: Vec<FriendActivity> = per_friend
        .iter()
        .map(|(id, (count, last))| FriendActivity {
            friend_id: *id,
            name: by_id[id].name.clone(),
            count: *count,
            last_interaction: *last,
        })
        .collect();
    friend_activity.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(b.last_interaction.cmp(&a.last_interaction))
    });

    // --- Top activity ---
    let mut by_category: HashMap<&str, u32> = HashMap::new();
    for record in &current {
        if let Some(cat) = &record.category {
            *by_category.entry(cat.as_str()).or_default() += 1;
        }
    }
    let top_activity = by_category
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(cat, _)| cat.to_string());

    // --- Reconnections ---
    let mut reconnections: Vec<Reconnection> = Vec::new();
    for (id, _) in &per_friend {
        let first_contact = current
            .iter()
            .filter(|r| r.friend_ids.contains(id))
            .map(|r| r.date.date_naive())
            .min();
        let Some(first_contact) = first_contact else {
            continue;
        };
        let last_prior = interactions
            .iter()
            .filter(|r| {
                r.status == InteractionStatus::Completed
                    && r.friend_ids.contains(id)
                    && r.date.date_naive() < start
            })
            .map(|r| r.date.date_naive())
            .max();
        // First contact ever is a different signal, not a reconnection.
        let Some(last_prior) = last_prior else {
            continue;
        };
        let days_since = (first_contact - last_prior).num_days();
        if days_since >= config.reconnect_gap_days {
            reconnections.push(Reconnection {
                friend_id: *id,
                name: by_id[id].name.clone(),
                days_since,
            });
        }
    }
    reconnections.sort_by(|a, b| b.days_since.cmp(&a.days_since));

    // --- Attention ranking ---
    let mut attention_ranking: Vec<AttentionEntry> = friends
        .iter()
        .filter(|f| f.relationship_score < config.attention_threshold)
        .map(|f| AttentionEntry {
            friend_id: f.id,
            name: f.name.clone(),
            tier: f.tier,
            score: (100.0 - f.relationship_score) * f.tier.attention_weight(),
        })
        .collect();
    attention_ranking.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    let friends_contacted = current
        .iter()
        .flat_map(|r| r.friend_ids.iter())
        .collect::<HashSet<_>>()
        .len() as u32;

    let summary = WeeklySummary {
        week_start: start,
        week_end: end,
        total_weaves: current.len() as u32,
        friends_contacted,
        top_activity,
        friend_activity,
        reconnections,
        week_streak: week_streak(reviews, as_of, config.streak_tolerance_days),
        attention_ranking,
    };
    debug!(
        week_start = %summary.week_start,
        total = summary.total_weaves,
        reconnections = summary.reconnections.len(),
        "weekly summary computed"
    );
    summary
}
