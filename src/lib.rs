//! # Guess Who Game Library
//!
//! This library provides the core game logic for a photo-identification
//! quiz. A participant logs in with their national ID number, is shown a
//! sequence of rounds each presenting a colleague's photo next to four name
//! candidates, and accumulates a score across a bounded number of attempts.
//! The library handles candidate pool assembly, round selection, attempt
//! budgets, bonus attempts, and finals qualification, while all storage and
//! presentation concerns stay behind host-supplied seams.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

pub mod constants;

pub mod game;
pub mod outcome;
pub mod participant;
pub mod pool;
pub mod progress;
pub mod roster;
pub mod round;
