//! Core game logic and state management
//!
//! This module contains the main game struct and logic for driving one
//! participant's session, from national ID login through photo rounds,
//! score persistence, the bonus run, and entry into the finals.

use std::{collections::HashSet, fmt::Debug};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::Duration;

use super::{
    constants,
    outcome::{Conclusion, Outcome},
    participant::{Id, Participant, PhotoRef},
    pool::{CandidatePool, InsufficientPool},
    progress::AttemptTracker,
    roster::{BackendError, ProgressUpdate, RosterRepository, Scope, ScopeQuery},
    round::{Choice, PoolExhausted, Round, SelectionPolicy},
};

/// Validates that a duration falls within the given bounds in seconds
fn validate_duration<const MIN_SECONDS: u64, const MAX_SECONDS: u64>(
    field: &'static str,
    val: &Duration,
) -> garde::Result {
    if val.as_secs() >= MIN_SECONDS && val.as_secs() <= MAX_SECONDS {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{MIN_SECONDS},{MAX_SECONDS}]"
        )))
    }
}

/// Attempt budget and finals bar for one company
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CompanyPolicy {
    /// Company name as stored on roster records
    #[garde(length(min = 1))]
    pub name: String,
    /// Attempt budget for participants of this company
    #[garde(range(min = 1))]
    pub max_attempts: u32,
    /// Score that qualifies for the finals, if this company has any
    #[garde(skip)]
    pub finals_bar: Option<u32>,
}

/// Tunable rules a game is created with
///
/// The default reflects the deployed event: Simetria plays 20 attempts
/// against a bar of 20, GC plays 7 against a bar of 7, and a resolved
/// round stays on screen for a moment before the next one is drawn.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Policies {
    /// Attempt budget for companies without a policy of their own
    #[garde(range(min = 1))]
    default_max_attempts: u32,
    /// Per-company budgets and finals bars
    #[garde(dive)]
    companies: Vec<CompanyPolicy>,
    /// How featured candidates and decoys are picked
    #[garde(skip)]
    selection: SelectionPolicy,
    /// Whether a bonus run keeps drawing from unfeatured candidates only
    #[garde(skip)]
    retain_used_on_bonus: bool,
    /// Pause between resolving a round and drawing the next one
    #[garde(custom(|v, _| validate_duration::<
        { constants::round::MIN_ADVANCE_DELAY },
        { constants::round::MAX_ADVANCE_DELAY },
    >("advance_delay", v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    advance_delay: Duration,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            default_max_attempts: constants::attempts::DEFAULT_MAX,
            companies: vec![
                CompanyPolicy {
                    name: constants::companies::SIMETRIA.to_string(),
                    max_attempts: constants::companies::SIMETRIA_MAX_ATTEMPTS,
                    finals_bar: Some(constants::companies::SIMETRIA_FINALS_BAR),
                },
                CompanyPolicy {
                    name: constants::companies::GC.to_string(),
                    max_attempts: constants::companies::GC_MAX_ATTEMPTS,
                    finals_bar: Some(constants::companies::GC_FINALS_BAR),
                },
            ],
            selection: SelectionPolicy::default(),
            retain_used_on_bonus: true,
            advance_delay: Duration::from_millis(constants::round::DEFAULT_ADVANCE_DELAY),
        }
    }
}

impl Policies {
    /// Attempt budget for a participant of the given company
    pub fn max_attempts_for(&self, company: &str) -> u32 {
        self.companies
            .iter()
            .find(|policy| policy.name == company)
            .map_or(self.default_max_attempts, |policy| policy.max_attempts)
    }

    /// Qualifying score for the given company, if it has a finals path
    pub fn finals_bar(&self, company: &str) -> Option<u32> {
        self.companies
            .iter()
            .find(|policy| policy.name == company)
            .and_then(|policy| policy.finals_bar)
    }

    /// Roster queries whose union forms the finals candidate pool
    ///
    /// One qualifying-score query per company with a finals bar, plus
    /// the hand-picked finalists.
    pub fn finals_sources(&self) -> Vec<ScopeQuery> {
        self.companies
            .iter()
            .filter_map(|policy| {
                policy.finals_bar.map(|bar| ScopeQuery::QualifyingScore {
                    company: policy.name.clone(),
                    min_score: bar,
                })
            })
            .chain(std::iter::once(ScopeQuery::Finalists))
            .collect_vec()
    }
}

/// Messages that can be scheduled for delayed delivery back to the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Move past a resolved round once the pause has elapsed
    AdvanceRound {
        /// Scheduling generation the alarm belongs to
        generation: u64,
    },
}

/// Where a session stands between rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Phase {
    /// A round is on screen awaiting an answer
    Playing(Round),
    /// The answer was taken and the round lingers until the alarm fires
    RoundResolved(Round),
    /// No more rounds will be drawn
    GameOver(Outcome),
}

/// Everything tied to one authenticated participant
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    player: Participant,
    scope: Scope,
    pool: CandidatePool,
    used_owners: HashSet<Id>,
    tracker: AttemptTracker,
    phase: Phase,
    last_answer: Option<bool>,
    failed_writes: u32,
}

/// Whether anyone is logged in
#[derive(Debug, Clone, Serialize, Deserialize)]
enum State {
    /// No session yet, waiting for a national ID
    AwaitingLogin,
    /// A participant is playing or has finished
    Active(Box<Session>),
}

/// Errors the game reports back to the caller
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// No roster record matches the submitted national ID
    #[error("no participant matches the submitted national ID")]
    IdentityNotFound,
    /// A session is already in progress, log out first
    #[error("a session is already in progress")]
    AlreadyLoggedIn,
    /// The roster backend failed while reading
    #[error("roster lookup failed: {0}")]
    LookupFailed(#[from] BackendError),
    /// The assembled roster cannot sustain a game
    #[error(transparent)]
    InsufficientPool(#[from] InsufficientPool),
    /// No bonus run can start from the current state
    #[error("no bonus run is available")]
    BonusUnavailable,
    /// The finished score does not clear the finals bar
    #[error("the score does not qualify for the finals")]
    NotQualified,
    /// The roster backend rejected a write the operation depends on
    #[error("roster write failed: {0}")]
    PersistenceFailed(BackendError),
}

/// Snapshot of what the participant should see right now
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// Photo of the featured candidate, absent once the game is over
    pub photo: Option<PhotoRef>,
    /// Selectable names for the current round
    pub choices: Vec<Choice>,
    /// Correct answers in the current run, or the resolved final score
    pub score: u32,
    /// Answers submitted in the current run
    pub attempts_played: u32,
    /// Attempt budget for the current run
    pub max_attempts: u32,
    /// Whether the session has finished
    pub game_over: bool,
    /// Why the session finished
    pub conclusion: Option<Conclusion>,
    /// Whether the finished score clears the finals bar
    pub qualified_for_finals: bool,
    /// Whether a bonus run can be claimed right now
    pub bonus_available: bool,
    /// Whether the most recent answer was correct
    pub last_answer: Option<bool>,
    /// Progress writes the roster backend rejected this session
    pub failed_writes: u32,
}

impl GameView {
    /// Converts the view to its wire format
    ///
    /// # Panics
    ///
    /// Panics if serialization fails, which the default serializer
    /// cannot do for this type.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// One complete game instance
///
/// The game is driven from outside: the caller feeds it logins, answers,
/// and due alarms, and reads the resulting [`GameView`]. Persistence and
/// timers stay behind the [`RosterRepository`] trait and the
/// `schedule_message` callback, so the core logic runs the same way under
/// any runtime.
#[derive(Serialize, Deserialize)]
pub struct Game {
    policies: Policies,
    state: State,
    generation: u64,
}

impl Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game").finish_non_exhaustive()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Policies::default())
    }
}

impl Game {
    /// Creates a game awaiting a login
    pub fn new(policies: Policies) -> Self {
        Self {
            policies,
            state: State::AwaitingLogin,
            generation: 0,
        }
    }

    /// Rules this game was created with
    pub fn policies(&self) -> &Policies {
        &self.policies
    }

    /// Authenticates a participant and starts their session
    ///
    /// The submitted ID is reduced to its digits before lookup, so
    /// punctuation from formatted input is accepted. The candidate pool
    /// is drawn from the participant's own company, and previously
    /// persisted progress is resumed. A participant whose budget is
    /// already spent lands directly on the finished screen.
    ///
    /// # Arguments
    ///
    /// * `repository` - Roster backend to read records from
    /// * `national_id` - National ID as typed by the participant
    ///
    /// # Errors
    ///
    /// Returns an error when a session is already active, the ID matches
    /// no record, the backend fails, or the company roster cannot
    /// sustain a game.
    pub fn login<R: RosterRepository>(
        &mut self,
        repository: &mut R,
        national_id: &str,
    ) -> Result<(), GameError> {
        if matches!(self.state, State::Active(_)) {
            return Err(GameError::AlreadyLoggedIn);
        }

        let digits: String = national_id.chars().filter(char::is_ascii_digit).collect();
        let player = repository
            .find_by_identity(&digits)?
            .ok_or(GameError::IdentityNotFound)?;

        let roster = repository.find_by_scope(&ScopeQuery::Company(player.company.clone()))?;
        let pool = CandidatePool::assemble(vec![roster], player.id, self.policies.selection)?;

        let tracker = AttemptTracker::resume(
            player.score,
            player.attempts_played,
            self.policies.max_attempts_for(&player.company),
        );

        let mut used_owners = HashSet::new();
        let phase = if tracker.budget_spent() {
            Phase::GameOver(Outcome::resolve(
                &tracker,
                self.policies.finals_bar(&player.company),
                Conclusion::BudgetSpent,
            ))
        } else {
            match Round::draw(&pool, &used_owners, self.policies.selection) {
                Ok(round) => {
                    used_owners.insert(round.owner());
                    Phase::Playing(round)
                }
                Err(PoolExhausted) => Phase::GameOver(Outcome::resolve(
                    &tracker,
                    self.policies.finals_bar(&player.company),
                    Conclusion::PoolExhausted,
                )),
            }
        };

        log::info!("session started for {} of {}", player.id, player.company);

        self.state = State::Active(Box::new(Session {
            scope: Scope::Company(player.company.clone()),
            player,
            pool,
            used_owners,
            tracker,
            phase,
            last_answer: None,
            failed_writes: 0,
        }));

        Ok(())
    }

    /// Takes the participant's answer for the round on screen
    ///
    /// In a company session the progress is written to the roster
    /// backend before the local scoreboard reflects it. A rejected write
    /// is logged and counted, and play continues on the local state. A
    /// finals session keeps its progress in memory and persists nothing
    /// until it concludes. The resolved round stays on screen until the
    /// scheduled alarm comes back; answers while it lingers are ignored,
    /// as are answers when no round is on screen.
    ///
    /// # Arguments
    ///
    /// * `repository` - Roster backend to persist progress to
    /// * `candidate` - Candidate the participant picked
    /// * `schedule_message` - Function to schedule delayed messages
    pub fn submit_answer<R: RosterRepository, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        repository: &mut R,
        candidate: Id,
        mut schedule_message: S,
    ) {
        let State::Active(session) = &mut self.state else {
            return;
        };
        let Phase::Playing(round) = &session.phase else {
            return;
        };

        let correct = round.is_correct(candidate);
        let round = round.clone();

        // Company progress is durable round by round; a finals run only
        // records its terminal score.
        if matches!(session.scope, Scope::Company(_)) {
            let update = ProgressUpdate::progress(
                session.tracker.score() + u32::from(correct),
                session.tracker.attempts_played() + 1,
            );
            if let Err(error) = repository.update(session.player.id, update) {
                log::warn!("progress write failed for {}: {error}", session.player.id);
                session.failed_writes += 1;
            }
        }

        session.tracker.record_answer(correct);
        if matches!(session.scope, Scope::Company(_)) {
            session.player.score = session.tracker.score();
            session.player.attempts_played = session.tracker.attempts_played();
        }
        session.last_answer = Some(correct);
        session.phase = Phase::RoundResolved(round);

        if session.tracker.budget_spent() {
            Self::conclude(session, &self.policies, repository, Conclusion::BudgetSpent);
        } else {
            self.generation += 1;
            schedule_message(
                AlarmMessage::AdvanceRound {
                    generation: self.generation,
                },
                self.policies.advance_delay,
            );
        }
    }

    /// Handles a scheduled alarm coming due
    ///
    /// Alarms carry the generation they were scheduled under; anything
    /// from an earlier generation is stale and ignored, as is an alarm
    /// arriving in a phase it no longer applies to.
    pub fn receive_alarm<R: RosterRepository>(
        &mut self,
        repository: &mut R,
        message: AlarmMessage,
    ) {
        match message {
            AlarmMessage::AdvanceRound { generation } => {
                if generation != self.generation {
                    return;
                }
                let State::Active(session) = &mut self.state else {
                    return;
                };
                if !matches!(session.phase, Phase::RoundResolved(_)) {
                    return;
                }
                Self::advance_round(session, &self.policies, repository);
            }
        }
    }

    /// Starts the bonus run, wiping the scoreboard for a second chance
    ///
    /// Available once per participant, after their company game has
    /// finished and while their roster record still carries the bonus
    /// flag. The wiped scoreboard is persisted before local state
    /// changes; if that write fails the session is left untouched. The
    /// better of the two runs becomes the final score.
    ///
    /// # Errors
    ///
    /// Returns an error when no finished company session is active, the
    /// bonus flag is spent, no candidate is left to feature, or the
    /// backend rejects the reset.
    pub fn claim_bonus<R: RosterRepository>(
        &mut self,
        repository: &mut R,
    ) -> Result<(), GameError> {
        let State::Active(session) = &mut self.state else {
            return Err(GameError::BonusUnavailable);
        };
        if !matches!(session.phase, Phase::GameOver(_)) {
            return Err(GameError::BonusUnavailable);
        }
        if !session.player.has_bonus || !matches!(session.scope, Scope::Company(_)) {
            return Err(GameError::BonusUnavailable);
        }

        let replayable = if self.policies.retain_used_on_bonus {
            session
                .pool
                .members()
                .iter()
                .any(|member| !session.used_owners.contains(&member.id))
        } else {
            !session.pool.is_empty()
        };
        if !replayable {
            return Err(GameError::InsufficientPool(InsufficientPool::TooFew {
                needed: 1,
                found: 0,
            }));
        }

        repository
            .update(session.player.id, ProgressUpdate::bonus_reset())
            .map_err(GameError::PersistenceFailed)?;

        session.tracker.reset_for_bonus();
        session.player.score = 0;
        session.player.attempts_played = 0;
        session.player.has_bonus = false;
        if !self.policies.retain_used_on_bonus {
            session.used_owners.clear();
        }

        log::info!("bonus run started for {}", session.player.id);
        Self::advance_round(session, &self.policies, repository);
        Ok(())
    }

    /// Moves a qualified participant into the finals
    ///
    /// The finals pool merges every company's qualifying players with
    /// the hand-picked finalists, and the attempt budget equals the
    /// pool size, one attempt per candidate that can be featured. The
    /// company-game state is replaced only once the new pool has been
    /// assembled.
    ///
    /// # Errors
    ///
    /// Returns an error when the current session has not finished with a
    /// qualifying score, a roster query fails, or the merged roster
    /// cannot sustain a game.
    pub fn enter_finals<R: RosterRepository>(
        &mut self,
        repository: &mut R,
    ) -> Result<(), GameError> {
        let State::Active(session) = &mut self.state else {
            return Err(GameError::NotQualified);
        };
        let Phase::GameOver(outcome) = &session.phase else {
            return Err(GameError::NotQualified);
        };
        if !outcome.qualifies_for_finals {
            return Err(GameError::NotQualified);
        }

        let mut sources = Vec::new();
        for query in self.policies.finals_sources() {
            sources.push(repository.find_by_scope(&query)?);
        }
        let pool = CandidatePool::assemble(sources, session.player.id, self.policies.selection)?;
        let budget = pool.len() as u32;

        session.scope = Scope::Finals;
        session.pool = pool;
        session.used_owners.clear();
        session.tracker = AttemptTracker::new(budget);
        session.last_answer = None;

        log::info!(
            "finals started for {} with {budget} candidates",
            session.player.id
        );
        Self::advance_round(session, &self.policies, repository);
        Ok(())
    }

    /// Ends the session and returns to the login screen
    ///
    /// Progress already persisted stays persisted; alarms scheduled for
    /// the ended session become stale.
    pub fn logout(&mut self) {
        if let State::Active(session) = &self.state {
            log::info!("session ended for {}", session.player.id);
        }
        self.state = State::AwaitingLogin;
        self.generation += 1;
    }

    /// What the participant should see right now
    ///
    /// Returns `None` before anyone has logged in.
    pub fn view(&self) -> Option<GameView> {
        let State::Active(session) = &self.state else {
            return None;
        };
        Some(match &session.phase {
            Phase::Playing(round) | Phase::RoundResolved(round) => GameView {
                photo: Some(round.photo().clone()),
                choices: round.choices().to_vec(),
                score: session.tracker.score(),
                attempts_played: session.tracker.attempts_played(),
                max_attempts: session.tracker.max_attempts(),
                game_over: false,
                conclusion: None,
                qualified_for_finals: false,
                bonus_available: false,
                last_answer: session.last_answer,
                failed_writes: session.failed_writes,
            },
            Phase::GameOver(outcome) => GameView {
                photo: None,
                choices: Vec::new(),
                score: outcome.final_score,
                attempts_played: session.tracker.attempts_played(),
                max_attempts: session.tracker.max_attempts(),
                game_over: true,
                conclusion: Some(outcome.conclusion),
                qualified_for_finals: outcome.qualifies_for_finals,
                bonus_available: session.player.has_bonus
                    && matches!(session.scope, Scope::Company(_)),
                last_answer: session.last_answer,
                failed_writes: session.failed_writes,
            },
        })
    }

    /// Draws the next round or concludes the game when none is left
    fn advance_round<R: RosterRepository>(
        session: &mut Session,
        policies: &Policies,
        repository: &mut R,
    ) {
        session.last_answer = None;
        match Round::draw(&session.pool, &session.used_owners, policies.selection) {
            Ok(round) => {
                session.used_owners.insert(round.owner());
                log::debug!("featuring {} for {}", round.owner(), session.player.id);
                session.phase = Phase::Playing(round);
            }
            Err(PoolExhausted) => {
                Self::conclude(session, policies, repository, Conclusion::PoolExhausted);
            }
        }
    }

    /// Resolves the outcome and persists whatever score is authoritative
    ///
    /// A finals session records its final score, a company session that
    /// used the bonus records the better of its two runs, and a plain
    /// company session has nothing left to write.
    fn conclude<R: RosterRepository>(
        session: &mut Session,
        policies: &Policies,
        repository: &mut R,
        conclusion: Conclusion,
    ) {
        let finals_bar = match &session.scope {
            Scope::Company(company) => policies.finals_bar(company),
            Scope::Finals => None,
        };
        let outcome = Outcome::resolve(&session.tracker, finals_bar, conclusion);

        let terminal = match &session.scope {
            Scope::Finals => Some(ProgressUpdate::final_score(outcome.final_score)),
            Scope::Company(_) if session.tracker.bonus_used() => {
                Some(ProgressUpdate::resolved_score(outcome.final_score))
            }
            Scope::Company(_) => None,
        };
        if let Some(update) = terminal {
            if let Err(error) = repository.update(session.player.id, update) {
                log::warn!("terminal write failed for {}: {error}", session.player.id);
                session.failed_writes += 1;
            }
            match &session.scope {
                Scope::Finals => session.player.final_score = Some(outcome.final_score),
                Scope::Company(_) => session.player.score = outcome.final_score,
            }
        }

        log::info!(
            "game over for {}: scored {} after {} attempts",
            session.player.id,
            outcome.final_score,
            session.tracker.attempts_played()
        );
        session.phase = Phase::GameOver(outcome);
    }
}
