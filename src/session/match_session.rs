use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MatchConfig;
use crate::game::engine::MatchEngine;
use crate::game::match_result::{MatchEndInfo, MatchOutcome, SyncRunResult};
use crate::game::rng::MatchRng;
use crate::game::setup::{MatchSetup, OpponentDescriptor, RosterSnapshot};
use crate::game::state::Score;
use crate::game::tactic::{validate, PlanError, TacticDraft, TacticPlan, TacticStep};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the next attempt
    Ready,
    /// An engine is running the plan
    InProgress,
    /// Attackers scored; budget discarded
    Won,
    /// Budget exhausted
    Lost,
}

/// One finished attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub outcome: MatchOutcome,
    pub failed_step: Option<usize>,
    pub score: Score,
    pub plan: TacticPlan,
}

/// A match against one opponent, spanning every retry
#[derive(Debug, Clone)]
pub struct MatchSession {
    pub id: Uuid,
    roster: RosterSnapshot,
    opponent: OpponentDescriptor,
    round: u32,
    config: MatchConfig,
    attempts_remaining: u32,
    plan: TacticPlan,
    /// Highlighted failing step from the last attempt
    failed_step: Option<usize>,
    state: SessionState,
    history: Vec<AttemptRecord>,
}

impl MatchSession {
    pub fn new(
        roster: RosterSnapshot,
        opponent: OpponentDescriptor,
        plan: TacticPlan,
        round: u32,
        config: MatchConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            roster,
            opponent,
            round,
            attempts_remaining: config.max_attempts,
            config,
            plan,
            failed_step: None,
            state: SessionState::Ready,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn plan(&self) -> &TacticPlan {
        &self.plan
    }

    pub fn failed_step(&self) -> Option<usize> {
        self.failed_step
    }

    pub fn opponent(&self) -> &OpponentDescriptor {
        &self.opponent
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Won | SessionState::Lost)
    }

    /// Build an engine for the next attempt with the current plan
    pub fn begin_attempt(&mut self, rng: MatchRng) -> Result<MatchEngine, SessionError> {
        self.ensure_ready()?;

        let setup = MatchSetup::new(self.roster.clone(), self.opponent.clone(), self.plan.clone())
            .with_round(self.round)
            .with_config(self.config.clone())
            .with_rng(rng);
        self.state = SessionState::InProgress;

        tracing::debug!(
            session = %self.id,
            attempt = self.attempt_number(),
            remaining = self.attempts_remaining,
            "attempt started"
        );
        Ok(MatchEngine::new(setup))
    }

    /// Book a finished attempt. A failure spends one attempt and records
    /// the failing step; reaching zero loses the match for good.
    pub fn record_outcome(&mut self, info: &MatchEndInfo) -> Result<SessionState, SessionError> {
        self.record(info.outcome, info.failed_step_index, info.score)
    }

    /// Book a fast-forward run. Anything short of a goal counts as a failed attempt.
    pub fn record_run(&mut self, result: &SyncRunResult) -> Result<SessionState, SessionError> {
        let outcome = if result.success {
            MatchOutcome::Win
        } else {
            MatchOutcome::AttemptFailed
        };
        self.record(outcome, result.failed_step_index, result.score)
    }

    fn record(
        &mut self,
        outcome: MatchOutcome,
        failed_step: Option<usize>,
        score: Score,
    ) -> Result<SessionState, SessionError> {
        if self.state != SessionState::InProgress {
            return Err(SessionError::NoAttemptInProgress);
        }

        self.history.push(AttemptRecord {
            attempt: self.attempt_number(),
            outcome,
            failed_step,
            score,
            plan: self.plan.clone(),
        });

        self.state = match outcome {
            MatchOutcome::Win => {
                self.failed_step = None;
                SessionState::Won
            }
            MatchOutcome::AttemptFailed => {
                self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
                self.failed_step = failed_step;
                if self.attempts_remaining == 0 {
                    SessionState::Lost
                } else {
                    SessionState::Ready
                }
            }
        };

        tracing::info!(
            session = %self.id,
            ?outcome,
            ?failed_step,
            remaining = self.attempts_remaining,
            state = ?self.state,
            "attempt recorded"
        );
        Ok(self.state)
    }

    /// Change one step between attempts. Later steps are dropped and the
    /// count returned. Steps before the highlighted failure are locked.
    pub fn edit_step(&mut self, index: usize, step: TacticStep) -> Result<usize, SessionError> {
        self.check_editable(index)?;
        let dropped = self.plan.replace_step(index, step)?;
        self.clear_highlight_through(index);
        tracing::debug!(session = %self.id, step = index + 1, dropped, "plan step edited");
        Ok(dropped)
    }

    /// Remove one step between attempts, under the same locking as edits
    pub fn delete_step(&mut self, index: usize) -> Result<TacticStep, SessionError> {
        self.check_editable(index)?;
        let removed = self.plan.remove_step(index)?;
        self.clear_highlight_through(index);
        tracing::debug!(session = %self.id, step = index + 1, "plan step deleted");
        Ok(removed)
    }

    /// Swap in a whole new plan from planner drafts
    pub fn replace_plan(&mut self, drafts: &[TacticDraft]) -> Result<(), SessionError> {
        self.ensure_ready()?;
        self.plan = validate(drafts)?;
        self.failed_step = None;
        Ok(())
    }

    fn check_editable(&self, index: usize) -> Result<(), SessionError> {
        self.ensure_ready()?;
        if index >= self.plan.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: self.plan.len(),
            });
        }
        match self.failed_step {
            Some(failed) if index < failed => Err(SessionError::StepLocked { index, failed }),
            _ => Ok(()),
        }
    }

    /// Touching the failing step (or an earlier one) invalidates the highlight
    fn clear_highlight_through(&mut self, index: usize) {
        if matches!(self.failed_step, Some(failed) if index <= failed) {
            self.failed_step = None;
        }
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::InProgress => Err(SessionError::AttemptInProgress),
            SessionState::Won => Err(SessionError::AlreadyWon),
            SessionState::Lost => Err(SessionError::Exhausted),
        }
    }

    fn attempt_number(&self) -> u32 {
        self.history.len() as u32 + 1
    }
}

/// Retry-protocol violations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no attempts remaining")]
    Exhausted,
    #[error("match already won")]
    AlreadyWon,
    #[error("an attempt is already running")]
    AttemptInProgress,
    #[error("no attempt is running")]
    NoAttemptInProgress,
    #[error("step {index} is locked (failure at step {failed})")]
    StepLocked { index: usize, failed: usize },
    #[error("step {index} out of range (plan has {len} steps)")]
    OutOfRange { index: usize, len: usize },
    #[error("invalid plan: {0}")]
    Plan(#[from] PlanError),
}
