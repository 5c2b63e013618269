//! Roster backend abstraction
//!
//! This module defines the trait through which the game engine reads
//! participant records and writes progress back. The abstraction keeps
//! the engine free of I/O; hosts implement it over whatever store they
//! use and pass it into the engine per call.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use super::participant::{Id, Participant};

/// The eligibility context a session is played in
///
/// A session either draws candidates from a single company or, after
/// qualification, from the cross-company finals roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Regular session restricted to one company's roster
    Company(String),
    /// Finals session drawing from the qualified roster
    Finals,
}

/// A roster query the engine asks the backend to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeQuery {
    /// All participants belonging to the named company
    Company(String),
    /// All participants explicitly marked as finalists
    Finalists,
    /// All participants of a company whose score reached a threshold
    QualifyingScore {
        /// Company to filter by
        company: String,
        /// Inclusive minimum score
        min_score: u32,
    },
}

/// A partial write against a participant's progress fields
///
/// Only the fields that are `Some` are touched; everything else keeps
/// its stored value. Field names match the backend's wire format.
#[skip_serializing_none]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    /// New score, if it changed
    pub score: Option<u32>,
    /// New attempt count, if it changed
    #[serde(rename = "tentativasJogadas")]
    pub attempts_played: Option<u32>,
    /// New bonus flag, if it changed
    #[serde(rename = "possuiBonus")]
    pub has_bonus: Option<bool>,
    /// New finals score, if it changed
    #[serde(rename = "scoreFinal")]
    pub final_score: Option<u32>,
}

impl ProgressUpdate {
    /// Update written after every resolved answer
    pub fn progress(score: u32, attempts_played: u32) -> Self {
        Self {
            score: Some(score),
            attempts_played: Some(attempts_played),
            ..Self::default()
        }
    }

    /// Update that clears progress and consumes the bonus flag
    pub fn bonus_reset() -> Self {
        Self {
            score: Some(0),
            attempts_played: Some(0),
            has_bonus: Some(false),
            ..Self::default()
        }
    }

    /// Update writing the score resolved at the end of a game
    pub fn resolved_score(score: u32) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    /// Update writing the dedicated finals score field
    pub fn final_score(score: u32) -> Self {
        Self {
            final_score: Some(score),
            ..Self::default()
        }
    }
}

/// Error reported by a roster backend
///
/// The engine never interprets the payload; it only decides whether the
/// failed call was a lookup (retryable by the caller) or a progress
/// write (logged and tolerated).
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
#[error("roster backend request failed: {0}")]
pub struct BackendError(pub String);

/// Trait for reading and updating participant records
///
/// Implementations might sit on a REST client, a database handle, or an
/// in-memory table in tests. All calls are synchronous from the engine's
/// point of view; hosts that talk to remote stores resolve the futures
/// before handing results back.
pub trait RosterRepository {
    /// Runs a roster query and returns the matching records
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend cannot serve the query.
    fn find_by_scope(&self, query: &ScopeQuery) -> Result<Vec<Participant>, BackendError>;

    /// Looks up a single participant by national ID number
    ///
    /// The engine normalizes the number to digits before calling, so
    /// implementations compare against the stored digits directly.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the backend cannot serve the lookup.
    fn find_by_identity(&self, national_id: &str) -> Result<Option<Participant>, BackendError>;

    /// Applies a partial progress write to one participant record
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the write did not reach the store.
    fn update(&mut self, id: Id, update: ProgressUpdate) -> Result<(), BackendError>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_progress_update_skips_untouched_fields() {
        let update = ProgressUpdate::progress(4, 6);
        let value = serde_json::to_value(update).unwrap();

        assert_eq!(value["score"], 4);
        assert_eq!(value["tentativasJogadas"], 6);
        assert!(value.get("possuiBonus").is_none());
        assert!(value.get("scoreFinal").is_none());
    }

    #[test]
    fn test_bonus_reset_touches_all_progress_fields() {
        let update = ProgressUpdate::bonus_reset();

        assert_eq!(update.score, Some(0));
        assert_eq!(update.attempts_played, Some(0));
        assert_eq!(update.has_bonus, Some(false));
        assert_eq!(update.final_score, None);
    }

    #[test]
    fn test_final_score_touches_only_finals_field() {
        let update = ProgressUpdate::final_score(11);
        let value = serde_json::to_value(update).unwrap();

        assert_eq!(value["scoreFinal"], 11);
        assert!(value.get("score").is_none());
        assert!(value.get("tentativasJogadas").is_none());
    }

    #[test]
    fn test_backend_error_display() {
        let error = BackendError("connection refused".to_string());
        assert_eq!(
            error.to_string(),
            "roster backend request failed: connection refused"
        );
    }
}
