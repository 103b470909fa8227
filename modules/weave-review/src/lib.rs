pub mod summary;

pub use summary::{summarize, week_streak, week_window};
