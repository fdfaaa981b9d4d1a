//! Core business logic for Tablecast.
//!
//! # Modules
//!
//! - [`export`] - the streaming export pipeline, retry policy, and
//!   outcome reporting
//! - [`serialize`] - record serializers (XML, CSV)
//!
//! # Export Workflow
//!
//! 1. Fetch the column schema once from table metadata
//! 2. Resolve the destination handle (fatal on failure)
//! 3. Streaming tier: open an incremental writer, stream header +
//!    records + footer, retrying whole attempts with backoff
//! 4. Fallback tier: on exhaustion or a streaming capability gap, build
//!    the full document in memory and upload it with its own retry cycle
//! 5. Report the destination URI and record count

pub mod export;
pub mod serialize;
