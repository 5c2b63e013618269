//! End-of-game resolution
//!
//! When a session runs out of attempts or out of candidates, the tracker
//! is folded into a final outcome that the view layer reports and the
//! roster backend records.

use serde::{Deserialize, Serialize};

use super::progress::AttemptTracker;

/// Why the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Conclusion {
    /// The attempt budget was used up
    BudgetSpent,
    /// Every candidate had already been featured
    PoolExhausted,
}

/// Resolved result of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Why the game ended
    pub conclusion: Conclusion,
    /// Best score across the original run and any bonus run
    pub final_score: u32,
    /// Whether the score clears the finals bar for the player's company
    pub qualifies_for_finals: bool,
}

impl Outcome {
    /// Folds a finished tracker into an outcome
    ///
    /// `finals_bar` is the qualifying score for the player's company, or
    /// `None` when no finals path exists for this session.
    pub fn resolve(
        tracker: &AttemptTracker,
        finals_bar: Option<u32>,
        conclusion: Conclusion,
    ) -> Self {
        let final_score = tracker.resolved_score();
        Self {
            conclusion,
            final_score,
            qualifies_for_finals: finals_bar.is_some_and(|bar| final_score >= bar),
        }
    }
}
