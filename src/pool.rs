//! Candidate pool assembly
//!
//! This module merges the roster lists a session draws its rounds from
//! into a single de-duplicated pool of eligible candidates. The pool is
//! built once per login (and rebuilt when entering the finals) and stays
//! stable for the lifetime of the session.

use std::collections::{HashMap, hash_map::Entry};

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    participant::{Gender, Id, Participant},
    round::SelectionPolicy,
};

/// Why a candidate pool could not be assembled
///
/// Reported to the participant at login; the game does not start.
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientPool {
    /// Fewer eligible candidates than a round needs
    #[error("pool holds {found} eligible candidates, needs at least {needed}")]
    TooFew {
        /// Candidates required
        needed: usize,
        /// Candidates found
        found: usize,
    },
    /// Not enough candidates of one gender for balanced selection
    #[error("pool holds {found} {gender} candidates, needs at least {needed}")]
    GenderImbalance {
        /// Gender that fell short
        gender: Gender,
        /// Candidates of that gender required
        needed: usize,
        /// Candidates of that gender found
        found: usize,
    },
}

/// The set of candidates a session's rounds are drawn from
///
/// Members are eligible (photo and gender present), unique by ID, and
/// never include the authenticated participant themself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePool {
    members: Vec<Participant>,
}

impl CandidatePool {
    /// Merges roster lists into a validated candidate pool
    ///
    /// Records appearing in more than one list are de-duplicated by ID
    /// with the last occurrence winning, so fresher query results may
    /// overwrite stale ones. Ineligible records and the authenticated
    /// participant's own record are dropped after the merge.
    ///
    /// # Arguments
    ///
    /// * `sources` - Roster query results, in the order they were fetched
    /// * `player` - ID of the authenticated participant to exclude
    /// * `policy` - Selection policy the pool must be able to satisfy
    ///
    /// # Errors
    ///
    /// Returns [`InsufficientPool`] if fewer eligible candidates remain
    /// than a round needs, or if balanced selection is requested and
    /// either gender falls below its minimum.
    pub fn assemble(
        sources: Vec<Vec<Participant>>,
        player: Id,
        policy: SelectionPolicy,
    ) -> Result<Self, InsufficientPool> {
        let mut members: Vec<Participant> = Vec::new();
        let mut positions: HashMap<Id, usize> = HashMap::new();

        for record in sources.into_iter().flatten() {
            match positions.entry(record.id) {
                Entry::Occupied(slot) => members[*slot.get()] = record,
                Entry::Vacant(slot) => {
                    slot.insert(members.len());
                    members.push(record);
                }
            }
        }

        members.retain(|record| record.id != player && record.is_eligible());

        if members.len() < crate::constants::pool::MIN_ELIGIBLE {
            return Err(InsufficientPool::TooFew {
                needed: crate::constants::pool::MIN_ELIGIBLE,
                found: members.len(),
            });
        }

        if matches!(policy, SelectionPolicy::GenderBalanced) {
            let mut counts: EnumMap<Gender, usize> = EnumMap::default();
            for member in &members {
                if let Some(gender) = member.gender {
                    counts[gender] += 1;
                }
            }
            for (gender, found) in counts {
                if found < crate::constants::pool::MIN_PER_GENDER {
                    return Err(InsufficientPool::GenderImbalance {
                        gender,
                        needed: crate::constants::pool::MIN_PER_GENDER,
                        found,
                    });
                }
            }
        }

        Ok(Self { members })
    }

    /// Returns all candidates in the pool
    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    /// Looks up a candidate by ID
    pub fn participant(&self, id: Id) -> Option<&Participant> {
        self.members.iter().find(|member| member.id == id)
    }

    /// Number of candidates in the pool
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the pool has no candidates
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
