//! Score bar: ordered pass/fail record against the reference melody
//!
//! Entries extend only while the run is flawless so far. The first failure
//! freezes the bar until `reset()`.

use serde::{Deserialize, Serialize};

use super::grid::BellIndex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBar {
    entries: Vec<Option<bool>>,
    bar_index: usize,
}

impl ScoreBar {
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![None; size],
            bar_index: 0,
        }
    }

    /// One slot per expected bell in the answer
    pub fn for_answer(answer: &[Option<BellIndex>]) -> Self {
        Self::new(answer.iter().flatten().count())
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn bar_index(&self) -> usize {
        self.bar_index
    }

    pub fn entries(&self) -> &[Option<bool>] {
        &self.entries
    }

    /// True once the previous entry (if any) is a pass
    fn accepting(&self) -> bool {
        if self.bar_index >= self.entries.len() {
            return false;
        }
        self.bar_index == 0 || self.entries[self.bar_index - 1] == Some(true)
    }

    /// True once a failure has been recorded
    pub fn is_frozen(&self) -> bool {
        self.bar_index > 0 && self.entries[self.bar_index - 1] == Some(false)
    }

    /// Record the next result; returns whether it was written
    pub fn mark_score(&mut self, result: bool) -> bool {
        if !self.accepting() {
            return false;
        }
        self.entries[self.bar_index] = Some(result);
        self.bar_index += 1;
        true
    }

    pub fn is_full_score(&self) -> bool {
        !self.entries.is_empty()
            && self.bar_index == self.entries.len()
            && self.entries[self.bar_index - 1] == Some(true)
    }

    /// Clear the bar; a perfect run is kept
    pub fn reset(&mut self) {
        if self.is_full_score() {
            return;
        }
        self.entries.iter_mut().for_each(|e| *e = None);
        self.bar_index = 0;
    }
}
