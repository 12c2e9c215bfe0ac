//! High score leaderboard
//!
//! Kept in memory for the lifetime of the process; tracks the top 10 runs.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score
    pub score: u32,
    /// Kana destroyed
    pub kills: u32,
    /// Highest difficulty tier reached (0-based)
    pub tier: usize,
    /// Run length in seconds
    pub duration_secs: f32,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Ties keep the earlier run ahead
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u32) -> HighScoreEntry {
        HighScoreEntry {
            score,
            kills: score / 10,
            tier: 0,
            duration_secs: 30.0,
        }
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut hs = HighScores::new();
        assert!(!hs.qualifies(0));
        assert_eq!(hs.add_score(run(0)), None);
        assert!(hs.is_empty());
    }

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut hs = HighScores::new();
        assert_eq!(hs.add_score(run(100)), Some(1));
        assert_eq!(hs.add_score(run(300)), Some(1));
        assert_eq!(hs.add_score(run(200)), Some(2));
        assert_eq!(hs.add_score(run(200)), Some(3));
        assert_eq!(hs.top_score(), Some(300));
        let scores: Vec<_> = hs.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 200, 100]);
    }

    #[test]
    fn test_full_board_trims() {
        let mut hs = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u32 {
            hs.add_score(run(i * 10));
        }
        assert!(!hs.qualifies(10));
        assert_eq!(hs.potential_rank(15), Some(MAX_HIGH_SCORES));
        assert_eq!(hs.add_score(run(15)), Some(MAX_HIGH_SCORES));
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(hs.entries.last().map(|e| e.score), Some(15));
    }
}
