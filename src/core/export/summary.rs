//! Export outcome reporting

use std::time::Duration;

/// Which tier ultimately committed the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTier {
    /// Rows were streamed incrementally to the destination
    Streaming,
    /// The whole document was built in memory and uploaded in one shot
    Buffered,
}

impl std::fmt::Display for ExportTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportTier::Streaming => write!(f, "streaming"),
            ExportTier::Buffered => write!(f, "buffered"),
        }
    }
}

/// Result of a successful export run
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Destination URI the document was committed to
    pub destination_uri: String,

    /// Number of records in the committed document
    pub records_written: usize,

    /// Tier that committed the document
    pub tier: ExportTier,

    /// Attempts spent in the tier that succeeded
    pub attempts: u32,

    /// Wall-clock duration of the whole run
    pub duration: Duration,
}

impl ExportOutcome {
    /// Log the outcome with structured fields
    pub fn log(&self) {
        tracing::info!(
            destination = %self.destination_uri,
            records = self.records_written,
            tier = %self.tier,
            attempts = self.attempts,
            duration_secs = format!("{:.2}", self.duration.as_secs_f64()),
            "Export completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_display() {
        assert_eq!(ExportTier::Streaming.to_string(), "streaming");
        assert_eq!(ExportTier::Buffered.to_string(), "buffered");
    }
}
