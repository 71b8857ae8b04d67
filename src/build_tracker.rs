//! Per-session ledger of dispatched rounds.
//!
//! Each round records a digest of the persisted source before and after it
//! ran, so whether a round changed the saved program can be read straight off
//! the ledger.

use sha2::{Digest, Sha256};

use crate::contexts::BuildOutcome;

/// What kind of round was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundKind {
    /// Template verification on start-up or `reload!`.
    Bootstrap,
    Include,
    Static,
    Statement,
    /// A blank line re-displaying the previous statement.
    Repeat,
}

/// One dispatched round.
#[derive(Debug, Clone)]
pub struct RoundRecord {
    pub kind: RoundKind,
    pub ephemeral: bool,
    pub outcome: BuildOutcome,
    /// Digest of the persisted source before the round (empty if absent)
    pub source_before: String,
    /// Digest of the persisted source after the round (empty if absent)
    pub source_after: String,
    /// Timestamp of the round
    pub timestamp: String,
}

impl RoundRecord {
    pub fn changed_source(&self) -> bool {
        self.source_before != self.source_after
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildTracker {
    rounds: Vec<RoundRecord>,
}

impl BuildTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished round
    pub fn record(
        &mut self,
        kind: RoundKind,
        ephemeral: bool,
        outcome: BuildOutcome,
        source_before: String,
        source_after: String,
    ) -> &RoundRecord {
        self.rounds.push(RoundRecord {
            kind,
            ephemeral,
            outcome,
            source_before,
            source_after,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        &self.rounds[self.rounds.len() - 1]
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn last(&self) -> Option<&RoundRecord> {
        self.rounds.last()
    }

    /// Hex SHA-256 digest of `content`.
    pub fn hash_bytes(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    /// Get a summary of the session's rounds
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push("Session Summary:".to_string());

        let succeeded = self.rounds.iter().filter(|r| r.outcome.is_success()).count();
        let kept = self.rounds.iter().filter(|r| r.changed_source()).count();

        lines.push(format!("  Rounds:    {}", self.rounds.len()));
        lines.push(format!("  Succeeded: {}", succeeded));
        lines.push(format!("  Failed:    {}", self.rounds.len() - succeeded));
        lines.push(format!("  Kept:      {}", kept));

        for record in &self.rounds {
            let state = if record.changed_source() {
                "kept"
            } else if record.outcome.is_success() {
                "unchanged"
            } else {
                "rolled back"
            };
            lines.push(format!(
                "  {} {:?}{} -> {}",
                record.timestamp,
                record.kind,
                if record.ephemeral { " (ephemeral)" } else { "" },
                state
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bytes() {
        let hash1 = BuildTracker::hash_bytes(b"hello world");
        assert_eq!(hash1, BuildTracker::hash_bytes(b"hello world"));
        assert_ne!(hash1, BuildTracker::hash_bytes(b"different"));
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_record_and_summary() {
        let mut tracker = BuildTracker::new();
        let a = BuildTracker::hash_bytes(b"a");
        let b = BuildTracker::hash_bytes(b"b");

        tracker.record(
            RoundKind::Statement,
            false,
            BuildOutcome::Success { exit_code: Some(0) },
            a.clone(),
            b,
        );
        tracker.record(RoundKind::Statement, false, BuildOutcome::CompileFailed, a.clone(), a);

        assert!(tracker.rounds()[0].changed_source());
        assert!(!tracker.last().unwrap().changed_source());

        let summary = tracker.summary();
        assert!(summary.contains("Rounds:    2"));
        assert!(summary.contains("Kept:      1"));
        assert!(summary.contains("rolled back"));
    }
}
