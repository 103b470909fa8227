pub mod cache;
pub mod catalog;
pub mod classifier;
pub mod dedup;
pub mod filter;
pub mod matcher;
pub mod names;
pub mod scanner;
pub mod stats;
pub mod traits;

pub use cache::{Clock, CoalescingCache, SystemClock};
pub use catalog::Catalog;
pub use classifier::classify;
pub use dedup::DedupIndex;
pub use filter::{is_ambiguous, SuppressionIndex, Verdict};
pub use matcher::resolve_names;
pub use names::extract_names;
pub use scanner::{AcceptOutcome, EventScanner};
pub use stats::ScanStats;
