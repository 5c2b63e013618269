//! Configuration constants for the quiz game system
//!
//! This module contains the numeric limits and policy values used
//! throughout the game system, from the shape of a round to the
//! per-company attempt budgets and finals thresholds.

/// Round shape and pacing constants
pub mod round {
    /// Number of name candidates presented in every round
    pub const OPTION_COUNT: usize = 4;
    /// Decoys drawn from unused candidates sharing the photo owner's gender
    pub const SAME_GENDER_DECOYS: usize = 1;
    /// Decoys drawn from the full roster with the opposite gender
    pub const OPPOSITE_GENDER_DECOYS: usize = 2;
    /// Default time in milliseconds a resolved round stays on screen
    pub const DEFAULT_ADVANCE_DELAY: u64 = 1500;
    /// Minimum allowed advance delay in seconds
    pub const MIN_ADVANCE_DELAY: u64 = 0;
    /// Maximum allowed advance delay in seconds
    pub const MAX_ADVANCE_DELAY: u64 = 60;
}

/// Candidate pool eligibility thresholds
pub mod pool {
    /// Minimum eligible candidates required for a game to start
    pub const MIN_ELIGIBLE: usize = 4;
    /// Minimum eligible candidates of each gender under balanced selection
    pub const MIN_PER_GENDER: usize = 2;
}

/// Attempt budget constants
pub mod attempts {
    /// Attempt budget for companies without a dedicated policy
    pub const DEFAULT_MAX: u32 = 20;
}

/// Built-in company policy values
pub mod companies {
    /// Name of the company playing with the default-sized budget
    pub const SIMETRIA: &str = "Simetria";
    /// Attempt budget for Simetria participants
    pub const SIMETRIA_MAX_ATTEMPTS: u32 = 20;
    /// Score a Simetria participant needs to qualify for the finals
    pub const SIMETRIA_FINALS_BAR: u32 = 20;
    /// Name of the company playing with a reduced budget
    pub const GC: &str = "GC";
    /// Attempt budget for GC participants
    pub const GC_MAX_ATTEMPTS: u32 = 7;
    /// Score a GC participant needs to qualify for the finals
    pub const GC_FINALS_BAR: u32 = 7;
}
