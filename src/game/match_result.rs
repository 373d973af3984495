//! Match results
//!
//! Terminal outcomes reported to the caller, plus the structured record a
//! fast-forward run returns for automated verification.

use serde::{Deserialize, Serialize};

use crate::game::action_log::ActionLogEntry;
use crate::game::position::{Side, Slot};
use crate::game::state::{MatchState, Score};
use crate::util::vec2::Vec2;

/// How a match attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Win,
    AttemptFailed,
}

/// Payload of the match-end event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEndInfo {
    pub score: Score,
    pub outcome: MatchOutcome,
    /// Plan step that failed, only for `AttemptFailed`
    pub failed_step_index: Option<usize>,
}

/// Why a fast-forward run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunReason {
    Goal,
    /// A defender or the goalkeeper stopped an action
    Intercepted,
    /// Turnover without an interception (e.g. a missed shot)
    AttemptFailed,
    TacticsCompletedNoGoal,
    Timeout,
    Error,
}

impl RunReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RunReason::Goal => "goal",
            RunReason::Intercepted => "intercepted",
            RunReason::AttemptFailed => "attempt_failed",
            RunReason::TacticsCompletedNoGoal => "tactics_completed_no_goal",
            RunReason::Timeout => "timeout",
            RunReason::Error => "error",
        }
    }
}

impl std::fmt::Display for RunReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agent found outside its legal envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryViolation {
    pub side: Side,
    pub slot: Slot,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateFlags {
    pub ball_animating: bool,
    pub is_paused: bool,
    pub pending_takeover: bool,
    /// Shot in flight with its result not yet applied
    pub awaiting_shot_result: bool,
}

/// Snapshot of the court after a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalState {
    pub score: Score,
    pub attacker_positions: Vec<(Slot, Vec2)>,
    pub defender_positions: Vec<(Slot, Vec2)>,
    pub ball_position: Vec2,
    pub ball_holder: Slot,
    pub boundary_violations: Vec<BoundaryViolation>,
    pub flags: StateFlags,
    pub tactics_executed: usize,
    pub total_tactics: usize,
}

impl FinalState {
    pub fn capture(state: &MatchState, total_tactics: usize) -> Self {
        let positions = |side: Side| -> Vec<(Slot, Vec2)> {
            state.agents(side).iter().map(|(slot, a)| (slot, a.position)).collect()
        };

        Self {
            score: state.score,
            attacker_positions: positions(Side::Attacker),
            defender_positions: positions(Side::Defender),
            ball_position: state.ball.position,
            ball_holder: state.ball_holder,
            boundary_violations: check_boundaries(state),
            flags: StateFlags {
                ball_animating: state.ball.animating,
                is_paused: state.phase == crate::game::state::MatchPhase::Paused,
                pending_takeover: state.pending_takeover,
                awaiting_shot_result: state.pending_shot.is_some(),
            },
            tactics_executed: state.tactic_index.min(total_tactics),
            total_tactics,
        }
    }
}

/// Every agent outside its envelope: field players must stay in
/// [0,100]², goalkeepers in [0,100]×[0,110].
pub fn check_boundaries(state: &MatchState) -> Vec<BoundaryViolation> {
    [Side::Attacker, Side::Defender]
        .into_iter()
        .flat_map(|side| {
            state
                .agents(side)
                .iter()
                .filter(|(_, agent)| !agent.within_envelope())
                .map(move |(slot, agent)| BoundaryViolation {
                    side,
                    slot,
                    position: agent.position,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Structured result of a fast-forward run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRunResult {
    /// True only when the attackers scored
    pub success: bool,
    pub reason: RunReason,
    /// Error message for `RunReason::Error`
    pub message: Option<String>,
    pub score: Score,
    pub frames: u32,
    pub outcome: Option<MatchOutcome>,
    pub failed_step_index: Option<usize>,
    pub ball_holder_history: Vec<Slot>,
    pub action_log: Vec<ActionLogEntry>,
    pub final_state: FinalState,
}
