//! Chronological record of engine decisions, kept for automated verification.

use serde::{Deserialize, Serialize};

use crate::game::position::Slot;
use crate::game::state::{InterceptionKind, Score, ShotOutcome};
use crate::game::tactic::{DribbleDirection, DribbleDistance, ShootType};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    TacticStart {
        index: usize,
        kind: String,
    },
    PassStart {
        from: Slot,
        to: Slot,
    },
    PassSuccess {
        to: Slot,
    },
    DribbleStart {
        holder: Slot,
        direction: DribbleDirection,
        distance: DribbleDistance,
    },
    DribbleBack {
        holder: Slot,
    },
    ShootStart {
        shooter: Slot,
        shoot_type: ShootType,
        target: Vec2,
    },
    LineInterceptionCheck {
        interceptor: Option<Slot>,
    },
    DribbleInterceptionCheck {
        interceptor: Option<Slot>,
    },
    Breakthrough {
        interceptor: Slot,
        rate: f32,
    },
    GoalkeeperCheck {
        in_reach: bool,
        rate: f32,
        saved: bool,
    },
    Intercepted {
        kind: InterceptionKind,
        interceptor: Slot,
    },
    ShootResult {
        outcome: ShotOutcome,
    },
    Turnover {
        step_index: Option<usize>,
    },
    ScoreChange {
        score: Score,
    },
    Goal {
        scorer: Slot,
    },
    MalformedStep {
        index: usize,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub frame: u64,
    /// Simulated seconds
    pub time: f32,
    #[serde(flatten)]
    pub event: LogEvent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    pub fn push(&mut self, frame: u64, time: f32, event: LogEvent) {
        self.entries.push(ActionLogEntry { frame, time, event });
    }

    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry satisfies `pred`
    pub fn any(&self, pred: impl Fn(&LogEvent) -> bool) -> bool {
        self.entries.iter().any(|e| pred(&e.event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_serialize_flat() {
        let mut log = ActionLog::default();
        log.push(3, 0.1, LogEvent::PassStart { from: Slot::CenterBack, to: Slot::RightWing });
        let json = serde_json::to_value(log.entries()).unwrap();
        assert_eq!(json[0]["type"], "pass_start");
        assert_eq!(json[0]["to"], "RW");
        assert_eq!(json[0]["frame"], 3);
        assert!(log.any(|e| matches!(e, LogEvent::PassStart { .. })));
    }
}
