//! Attempt and score tracking
//!
//! Each session carries a tracker that counts answers against the
//! attempt budget and remembers the pre-bonus score when a bonus run
//! replaces the scoreboard.

use serde::{Deserialize, Serialize};

/// Running score and attempt budget for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptTracker {
    score: u32,
    attempts_played: u32,
    max_attempts: u32,
    pre_bonus_score: Option<u32>,
}

impl AttemptTracker {
    /// Creates a tracker with a fresh scoreboard
    pub fn new(max_attempts: u32) -> Self {
        Self {
            score: 0,
            attempts_played: 0,
            max_attempts,
            pre_bonus_score: None,
        }
    }

    /// Creates a tracker resuming previously persisted progress
    pub fn resume(score: u32, attempts_played: u32, max_attempts: u32) -> Self {
        Self {
            score,
            attempts_played,
            max_attempts,
            pre_bonus_score: None,
        }
    }

    /// Counts one answer against the budget, scoring it when correct
    pub fn record_answer(&mut self, correct: bool) {
        self.attempts_played += 1;
        if correct {
            self.score += 1;
        }
    }

    /// Whether the attempt budget has been used up
    pub fn budget_spent(&self) -> bool {
        self.attempts_played >= self.max_attempts
    }

    /// Wipes the scoreboard for a bonus run, keeping the old score aside
    pub fn reset_for_bonus(&mut self) {
        self.pre_bonus_score = Some(self.score);
        self.score = 0;
        self.attempts_played = 0;
    }

    /// Best score across the original run and any bonus run
    pub fn resolved_score(&self) -> u32 {
        self.pre_bonus_score
            .map_or(self.score, |previous| previous.max(self.score))
    }

    /// Whether a bonus run has replaced the original scoreboard
    pub fn bonus_used(&self) -> bool {
        self.pre_bonus_score.is_some()
    }

    /// Correct answers so far in the current run
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Answers submitted so far in the current run
    pub fn attempts_played(&self) -> u32 {
        self.attempts_played
    }

    /// Attempt budget for the current run
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_starts_empty() {
        let tracker = AttemptTracker::new(20);

        assert_eq!(tracker.score(), 0);
        assert_eq!(tracker.attempts_played(), 0);
        assert_eq!(tracker.max_attempts(), 20);
        assert!(!tracker.budget_spent());
        assert!(!tracker.bonus_used());
    }

    #[test]
    fn test_record_answer_scores_only_correct_ones() {
        let mut tracker = AttemptTracker::new(20);

        tracker.record_answer(true);
        tracker.record_answer(false);
        tracker.record_answer(true);

        assert_eq!(tracker.score(), 2);
        assert_eq!(tracker.attempts_played(), 3);
    }

    #[test]
    fn test_budget_spent_at_the_limit() {
        let mut tracker = AttemptTracker::new(2);

        tracker.record_answer(false);
        assert!(!tracker.budget_spent());

        tracker.record_answer(false);
        assert!(tracker.budget_spent());
    }

    #[test]
    fn test_resume_picks_up_persisted_progress() {
        let tracker = AttemptTracker::resume(5, 12, 20);

        assert_eq!(tracker.score(), 5);
        assert_eq!(tracker.attempts_played(), 12);
        assert!(!tracker.budget_spent());
        assert_eq!(tracker.resolved_score(), 5);
    }

    #[test]
    fn test_bonus_reset_wipes_the_scoreboard() {
        let mut tracker = AttemptTracker::resume(5, 20, 20);

        tracker.reset_for_bonus();

        assert_eq!(tracker.score(), 0);
        assert_eq!(tracker.attempts_played(), 0);
        assert!(tracker.bonus_used());
        assert!(!tracker.budget_spent());
    }

    #[test]
    fn test_resolved_score_keeps_the_better_run() {
        let mut tracker = AttemptTracker::resume(5, 20, 20);
        tracker.reset_for_bonus();
        tracker.record_answer(true);
        tracker.record_answer(true);
        tracker.record_answer(true);

        // Bonus run scored 3 against the original 5.
        assert_eq!(tracker.resolved_score(), 5);

        for _ in 0..4 {
            tracker.record_answer(true);
        }

        // Bonus run now beats the original.
        assert_eq!(tracker.resolved_score(), 7);
    }
}
