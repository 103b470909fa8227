pub mod config;
pub mod error;
pub mod signature;
pub mod types;

pub use config::ScanConfig;
pub use error::WeaveError;
pub use signature::{normalize_title, EventSignature};
pub use types::*;
