// Running score and the per-process high-score board.

use serde::Serialize;

use super::config::HIGH_SCORE_CAPACITY;

/// Finished-session scores, highest first, capped at a fixed length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighScoreBoard {
    entries: Vec<u32>,
    #[serde(skip)]
    capacity: usize,
}

impl HighScoreBoard {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, score: u32) {
        self.entries.push(score);
        self.entries.sort_unstable_by(|a, b| b.cmp(a));
        self.entries.truncate(self.capacity);
    }
}

impl Default for HighScoreBoard {
    fn default() -> Self {
        Self::new(HIGH_SCORE_CAPACITY)
    }
}

/// Owns the running score of the current session and the board of past ones.
#[derive(Debug, Clone, Default)]
pub struct ScoreLedger {
    running: u32,
    board: HighScoreBoard,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running_score(&self) -> u32 {
        self.running
    }

    pub fn high_scores(&self) -> &HighScoreBoard {
        &self.board
    }

    pub fn add_points(&mut self, points: u32) {
        self.running += points;
    }

    /// Record the running score on the board. The caller guarantees one call
    /// per finished session; every call inserts an entry.
    pub fn finalize_session(&mut self) {
        self.board.insert(self.running);
    }

    /// Zero the running score. The board is kept.
    pub fn reset(&mut self) {
        self.running = 0;
    }
}
