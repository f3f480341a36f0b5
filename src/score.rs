//! Final-score submission entries
//!
//! The leaderboard itself is external; this module only builds the
//! submission payload at game over. No local ranking or persistence.

use serde::{Deserialize, Serialize};

/// Usernames longer than this are truncated before submission
pub const MAX_USERNAME_LEN: usize = 20;
/// Substituted for an empty or whitespace-only username
pub const DEFAULT_USERNAME: &str = "anonymous";

/// One leaderboard submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub username: String,
    /// Total particles absorbed over the run
    pub score: u64,
    /// Run seed, so a submitted score is reproducible
    pub seed: u64,
}

impl ScoreEntry {
    /// Build an entry with a sanitized username: trimmed, truncated, and
    /// defaulted when empty.
    pub fn new(username: &str, score: u64, seed: u64) -> Self {
        let trimmed = username.trim();
        let username = if trimmed.is_empty() {
            DEFAULT_USERNAME.to_string()
        } else {
            trimmed.chars().take(MAX_USERNAME_LEN).collect()
        };
        Self {
            username,
            score,
            seed,
        }
    }

    /// Serialize the submission payload
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_sanitized() {
        let e = ScoreEntry::new("  drift_master  ", 120, 7);
        assert_eq!(e.username, "drift_master");

        let long = "x".repeat(40);
        let e = ScoreEntry::new(&long, 0, 7);
        assert_eq!(e.username.len(), MAX_USERNAME_LEN);
    }

    #[test]
    fn test_empty_username_defaults() {
        assert_eq!(ScoreEntry::new("", 5, 1).username, DEFAULT_USERNAME);
        assert_eq!(ScoreEntry::new("   ", 5, 1).username, DEFAULT_USERNAME);
    }

    #[test]
    fn test_payload_round_trips() {
        let e = ScoreEntry::new("drift", 987, 42);
        let json = e.to_json().unwrap();
        let back: ScoreEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
