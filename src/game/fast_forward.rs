//! Synchronous fast-forward mode
//!
//! Steps an engine at a fixed dt in a tight loop, bounded by a frame cap.
//! Balls land in one tick and interception pauses are acknowledged inline,
//! so a whole attempt resolves without a caller. Panics are caught at the
//! loop boundary and reported, letting batch harnesses continue.

use std::panic::{self, AssertUnwindSafe};

use crate::game::constants::timing::DT;
use crate::game::engine::{MatchEngine, MatchEvent};
use crate::game::match_result::{FinalState, MatchOutcome, RunReason, SyncRunResult};
use crate::game::state::MatchPhase;

struct LoopOutcome {
    reason: RunReason,
    message: Option<String>,
    frames: u32,
    outcome: Option<MatchOutcome>,
    failed_step_index: Option<usize>,
}

/// Run `engine` to completion, at most `max_frames` ticks
pub fn run_sync(engine: &mut MatchEngine, max_frames: u32) -> SyncRunResult {
    engine.set_instant_ball(true);

    let looped = panic::catch_unwind(AssertUnwindSafe(|| run_loop(engine, max_frames)));
    let outcome = looped.unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::warn!(%message, "fast-forward run panicked");
        LoopOutcome {
            reason: RunReason::Error,
            message: Some(message),
            frames: engine.state().frame.min(u32::MAX as u64) as u32,
            outcome: None,
            failed_step_index: None,
        }
    });

    let total = engine.plan().len();
    SyncRunResult {
        success: outcome.reason == RunReason::Goal,
        reason: outcome.reason,
        message: outcome.message,
        score: engine.score(),
        frames: outcome.frames,
        outcome: outcome.outcome,
        failed_step_index: outcome.failed_step_index,
        ball_holder_history: engine.state().holder_history.clone(),
        action_log: engine.action_log().entries().to_vec(),
        final_state: FinalState::capture(engine.state(), total),
    }
}

fn run_loop(engine: &mut MatchEngine, max_frames: u32) -> LoopOutcome {
    if engine.phase() == MatchPhase::Idle {
        if let Err(e) = engine.start() {
            return error(e.to_string(), 0);
        }
    }

    let mut intercepted = false;
    for frame in 0..max_frames {
        let mut events = match engine.step(DT) {
            Ok(events) => events,
            Err(e) => return error(e.to_string(), frame),
        };

        // No caller to wait on: acknowledge interceptions immediately
        if engine.phase() == MatchPhase::Paused {
            intercepted |= events.iter().any(|e| matches!(e, MatchEvent::Interception(_)));
            match engine.resume() {
                Ok(more) => events.extend(more),
                Err(e) => return error(e.to_string(), frame),
            }
        }

        for event in &events {
            if let MatchEvent::MatchEnd(info) = event {
                let reason = match info.outcome {
                    MatchOutcome::Win => RunReason::Goal,
                    MatchOutcome::AttemptFailed if intercepted => RunReason::Intercepted,
                    MatchOutcome::AttemptFailed => RunReason::AttemptFailed,
                };
                return LoopOutcome {
                    reason,
                    message: None,
                    frames: frame + 1,
                    outcome: Some(info.outcome),
                    failed_step_index: info.failed_step_index,
                };
            }
        }

        if engine.is_plan_exhausted() {
            return LoopOutcome {
                reason: RunReason::TacticsCompletedNoGoal,
                message: None,
                frames: frame + 1,
                outcome: None,
                failed_step_index: None,
            };
        }
    }

    tracing::warn!(max_frames, "fast-forward run hit the frame cap");
    LoopOutcome {
        reason: RunReason::Timeout,
        message: None,
        frames: max_frames,
        outcome: None,
        failed_step_index: None,
    }
}

fn error(message: String, frames: u32) -> LoopOutcome {
    tracing::warn!(%message, "fast-forward run failed");
    LoopOutcome {
        reason: RunReason::Error,
        message: Some(message),
        frames,
        outcome: None,
        failed_step_index: None,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
