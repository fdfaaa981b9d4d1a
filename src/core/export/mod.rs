//! Export orchestration
//!
//! - [`pipeline`] - the streaming export pipeline with two-tier
//!   retry-and-fallback
//! - [`retry`] - the bounded exponential-backoff policy both tiers use
//! - [`summary`] - the outcome reported on success

pub mod pipeline;
pub mod retry;
pub mod summary;

pub use pipeline::ExportPipeline;
pub use retry::RetryPolicy;
pub use summary::{ExportOutcome, ExportTier};
