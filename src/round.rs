//! Round construction
//!
//! A round shows one candidate's photo next to four names and asks which
//! name the photo belongs to. This module picks the featured candidate
//! from the pool members not yet featured, fills the remaining slots with
//! decoys, and checks submitted answers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    participant::{Gender, Id, Participant, PhotoRef},
    pool::CandidatePool,
};

/// How the featured candidate and decoys are picked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Alternate the featured gender and pair decoys across genders
    #[default]
    GenderBalanced,
    /// Pick uniformly, ignoring gender entirely
    Uniform,
}

/// Every candidate in the pool has already been featured
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[error("every candidate has already been featured")]
pub struct PoolExhausted;

/// One selectable name in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Candidate the name belongs to
    pub id: Id,
    /// Display name
    pub name: String,
}

/// A single photo-to-name question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    owner: Id,
    photo: PhotoRef,
    choices: Vec<Choice>,
}

impl Round {
    /// Draws the next round from the pool
    ///
    /// The featured candidate comes from the members not in `used`. Under
    /// [`SelectionPolicy::GenderBalanced`] the featured gender is tossed
    /// up whenever both genders still have unfeatured members, one decoy
    /// shares the featured gender and has not been featured either, and
    /// two decoys of the opposite gender come from the whole pool. Slots
    /// left open by short genders are filled from the whole pool, so a
    /// round always carries [`OPTION_COUNT`] distinct names.
    ///
    /// [`OPTION_COUNT`]: crate::constants::round::OPTION_COUNT
    ///
    /// # Errors
    ///
    /// Returns [`PoolExhausted`] when every candidate has been featured.
    pub fn draw(
        pool: &CandidatePool,
        used: &HashSet<Id>,
        policy: SelectionPolicy,
    ) -> Result<Self, PoolExhausted> {
        let unused: Vec<&Participant> = pool
            .members()
            .iter()
            .filter(|member| !used.contains(&member.id))
            .collect();

        if unused.is_empty() {
            return Err(PoolExhausted);
        }

        let mut options = match policy {
            SelectionPolicy::GenderBalanced => Self::balanced_options(pool, &unused)?,
            SelectionPolicy::Uniform => {
                let owner = fastrand::choice(&unused).copied().ok_or(PoolExhausted)?;
                vec![owner]
            }
        };

        let owner = options[0];
        let Some(photo) = owner.photo.clone() else {
            // Pool members are eligible, so a photo is always present.
            return Err(PoolExhausted);
        };

        if options.len() < crate::constants::round::OPTION_COUNT {
            let mut remaining: Vec<&Participant> = pool
                .members()
                .iter()
                .filter(|member| options.iter().all(|chosen| chosen.id != member.id))
                .collect();
            fastrand::shuffle(&mut remaining);
            options.extend(
                remaining
                    .into_iter()
                    .take(crate::constants::round::OPTION_COUNT - options.len()),
            );
        }

        fastrand::shuffle(&mut options);

        Ok(Self {
            owner: owner.id,
            photo,
            choices: options
                .into_iter()
                .map(|member| Choice {
                    id: member.id,
                    name: member.name.clone(),
                })
                .collect(),
        })
    }

    /// Picks the featured candidate and gender-paired decoys
    ///
    /// The featured candidate is always first in the returned list.
    fn balanced_options<'a>(
        pool: &'a CandidatePool,
        unused: &[&'a Participant],
    ) -> Result<Vec<&'a Participant>, PoolExhausted> {
        let mut males = Vec::new();
        let mut females = Vec::new();
        for member in unused {
            match member.gender {
                Some(Gender::Male) => males.push(*member),
                Some(Gender::Female) => females.push(*member),
                None => {}
            }
        }

        let featured = match (males.is_empty(), females.is_empty()) {
            (false, false) => {
                if fastrand::bool() {
                    Gender::Male
                } else {
                    Gender::Female
                }
            }
            (false, true) => Gender::Male,
            (true, false) => Gender::Female,
            (true, true) => return Err(PoolExhausted),
        };

        let mut same_gender = match featured {
            Gender::Male => males,
            Gender::Female => females,
        };
        fastrand::shuffle(&mut same_gender);

        let mut options = Vec::with_capacity(crate::constants::round::OPTION_COUNT);
        options.extend(
            same_gender
                .into_iter()
                .take(1 + crate::constants::round::SAME_GENDER_DECOYS),
        );

        let mut opposite: Vec<&Participant> = pool
            .members()
            .iter()
            .filter(|member| member.gender == Some(featured.opposite()))
            .collect();
        fastrand::shuffle(&mut opposite);
        options.extend(
            opposite
                .into_iter()
                .take(crate::constants::round::OPPOSITE_GENDER_DECOYS),
        );

        Ok(options)
    }

    /// Candidate the photo belongs to
    pub fn owner(&self) -> Id {
        self.owner
    }

    /// Photo shown for this round
    pub fn photo(&self) -> &PhotoRef {
        &self.photo
    }

    /// Selectable names, in display order
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Whether `candidate` is the one in the photo
    pub fn is_correct(&self, candidate: Id) -> bool {
        candidate == self.owner
    }
}
