use std::time::Duration;

use typed_builder::TypedBuilder;

/// Tuning knobs for the scan pipeline and weekly aggregation.
///
/// Owned by the caller and passed down; nothing in the pipeline reads
/// ambient/global configuration.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ScanConfig {
    /// Half-width of the dedup window around a candidate's start time.
    #[builder(default = 3)]
    pub dedup_window_hours: i64,

    /// Minimum gap before an in-window contact counts as a reconnection.
    #[builder(default = 14)]
    pub reconnect_gap_days: i64,

    /// How far a review may land from the expected week end and still
    /// continue a streak.
    #[builder(default = 3)]
    pub streak_tolerance_days: i64,

    /// Friends at or above this relationship score are excluded from
    /// attention ranking.
    #[builder(default = 50.0)]
    pub attention_threshold: f64,

    /// Prior dismissals of the same signature needed before suppression.
    #[builder(default = 1)]
    pub min_dismissals: u32,

    /// How far back feedback is replayed when building the suppression index.
    #[builder(default = 180)]
    pub feedback_horizon_days: i64,

    /// TTL for the coalescing read caches in front of the contact directory
    /// and feedback store.
    #[builder(default = Duration::from_secs(30))]
    pub cache_ttl: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
