//! Match run state
//!
//! Everything that changes tick to tick during one attempt: both sides'
//! agents, the ball, the score, the tactic cursor and the interception
//! bookkeeping. Created by the engine at construction, dropped with it.

use serde::{Deserialize, Serialize};

use crate::game::agent::Agent;
use crate::game::position::{Side, Slot, SlotMap};
use crate::game::tactic::{DribbleDirection, DribbleDistance, NextAction, ShootType, TacticStep};
use crate::util::vec2::Vec2;

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Constructed, not started
    Idle,
    Running,
    /// Interception pending acknowledgment via `resume()`
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub attacker: u32,
    pub defender: u32,
}

/// Ball animation state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec2,
    pub target: Vec2,
    pub animating: bool,
    /// Units per second while animating
    pub speed: f32,
}

impl Ball {
    pub fn at(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            target: position,
            animating: false,
            speed,
        }
    }

    /// Start animating toward `target`
    pub fn launch(&mut self, target: Vec2, speed: f32) {
        self.target = target;
        self.speed = speed;
        self.animating = true;
    }
}

/// In-flight execution of one plan step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Pass {
        to: Slot,
        started: bool,
    },
    Dribble {
        direction: DribbleDirection,
        distance: DribbleDistance,
        next_action: NextAction,
        pass_to: Option<Slot>,
        elapsed: f32,
    },
    Shoot {
        shoot_type: ShootType,
        started: bool,
    },
}

impl Action {
    pub fn from_step(step: &TacticStep) -> Self {
        match *step {
            TacticStep::Pass { to } => Action::Pass { to, started: false },
            TacticStep::Dribble {
                direction,
                distance,
                next_action,
                pass_to,
            } => Action::Dribble {
                direction,
                distance,
                next_action,
                pass_to,
                elapsed: 0.0,
            },
            TacticStep::Shoot { shoot_type } => Action::Shoot {
                shoot_type,
                started: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionInProgress {
    /// Plan index the action belongs to
    pub step_index: usize,
    pub action: Action,
}

/// What the defense stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterceptionKind {
    Pass,
    Dribble,
    Shoot,
}

/// Payload of the interception event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptionInfo {
    pub kind: InterceptionKind,
    pub interceptor: Slot,
    pub interceptor_position: Vec2,
    /// Attacker who lost the ball
    pub ball_holder: Slot,
    /// Intended receiver for passes
    pub target: Option<Slot>,
    pub shoot_type: Option<ShootType>,
    /// True when the goalkeeper, not a field defender, stopped a shot
    pub goalkeeper_save: bool,
    pub step_index: usize,
}

/// Shot result decided at release, applied when the ball arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotOutcome {
    Goal,
    Miss,
    /// Stopped by a defender; resolved through the interception path
    Stopped,
}

/// Defender granted the fast-reaction boost for the current ball flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reactor {
    pub slot: Slot,
    pub target: Vec2,
}

/// Mutable state of one match run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub attackers: SlotMap<Agent>,
    pub defenders: SlotMap<Agent>,
    pub ball: Ball,
    pub ball_holder: Slot,
    pub score: Score,
    pub tactic_index: usize,
    pub action: Option<ActionInProgress>,
    pub phase: MatchPhase,
    pub pending_takeover: bool,
    /// Interception awaiting announcement/acknowledgment
    pub interception: Option<InterceptionInfo>,
    pub failed_tactic_index: Option<usize>,
    pub pending_shot: Option<ShotOutcome>,
    /// Shot target while a shot is in flight
    pub shot_target: Option<Vec2>,
    pub reactor: Option<Reactor>,
    /// Simulated seconds since start
    pub elapsed: f32,
    pub frame: u64,
    pub holder_history: Vec<Slot>,
}

impl MatchState {
    pub fn new(attackers: SlotMap<Agent>, defenders: SlotMap<Agent>, ball_speed: f32) -> Self {
        let holder = Slot::CenterBack;
        let ball = Ball::at(attackers.get(holder).position, ball_speed);
        Self {
            attackers,
            defenders,
            ball,
            ball_holder: holder,
            score: Score::default(),
            tactic_index: 0,
            action: None,
            phase: MatchPhase::Idle,
            pending_takeover: false,
            interception: None,
            failed_tactic_index: None,
            pending_shot: None,
            shot_target: None,
            reactor: None,
            elapsed: 0.0,
            frame: 0,
            holder_history: vec![holder],
        }
    }

    pub fn agents(&self, side: Side) -> &SlotMap<Agent> {
        match side {
            Side::Attacker => &self.attackers,
            Side::Defender => &self.defenders,
        }
    }

    pub fn holder(&self) -> &Agent {
        self.attackers.get(self.ball_holder)
    }

    pub fn holder_mut(&mut self) -> &mut Agent {
        self.attackers.get_mut(self.ball_holder)
    }

    pub fn set_holder(&mut self, slot: Slot) {
        self.ball_holder = slot;
        self.holder_history.push(slot);
    }

    /// Every agent back home, ball to the center back, plan cursor to 0
    pub fn reset_positions(&mut self, ball_speed: f32) {
        for agent in self.attackers.values_mut().chain(self.defenders.values_mut()) {
            agent.reset_position();
        }
        self.ball_holder = Slot::CenterBack;
        self.ball = Ball::at(self.attackers.get(Slot::CenterBack).position, ball_speed);
        self.tactic_index = 0;
        self.action = None;
        self.pending_takeover = false;
        self.interception = None;
        self.pending_shot = None;
        self.shot_target = None;
        self.reactor = None;
    }

    /// No step left to start and nothing in flight
    pub fn is_plan_exhausted(&self, plan_len: usize) -> bool {
        self.tactic_index >= plan_len
            && self.action.is_none()
            && !self.ball.animating
            && !self.pending_takeover
            && self.pending_shot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::SpeedProfile;

    fn state() -> MatchState {
        let attackers = SlotMap::from_fn(|slot| Agent::new(slot, Side::Attacker, SpeedProfile::default()));
        let defenders = SlotMap::from_fn(|slot| Agent::new(slot, Side::Defender, SpeedProfile::default()));
        MatchState::new(attackers, defenders, 80.0)
    }

    #[test]
    fn test_initial_state() {
        let state = state();
        assert_eq!(state.phase, MatchPhase::Idle);
        assert_eq!(state.ball_holder, Slot::CenterBack);
        assert_eq!(state.ball.position, Slot::CenterBack.home(Side::Attacker));
        assert_eq!(state.holder_history, vec![Slot::CenterBack]);
    }

    #[test]
    fn test_reset_positions() {
        let mut state = state();
        state.set_holder(Slot::RightWing);
        state.tactic_index = 3;
        state.pending_takeover = true;
        state.ball.launch(Vec2::new(10.0, 10.0), 120.0);
        state.attackers.get_mut(Slot::RightWing).position = Vec2::new(60.0, 60.0);

        state.reset_positions(80.0);

        assert_eq!(state.ball_holder, Slot::CenterBack);
        assert_eq!(state.tactic_index, 0);
        assert!(!state.pending_takeover);
        assert!(!state.ball.animating);
        assert_eq!(state.ball.speed, 80.0);
        assert_eq!(
            state.attackers.get(Slot::RightWing).position,
            Slot::RightWing.home(Side::Attacker)
        );
    }

    #[test]
    fn test_action_from_step() {
        let action = Action::from_step(&TacticStep::Pass { to: Slot::Pivot });
        assert_eq!(action, Action::Pass { to: Slot::Pivot, started: false });
    }

    #[test]
    fn test_plan_exhausted() {
        let mut state = state();
        assert!(!state.is_plan_exhausted(1));
        state.tactic_index = 1;
        assert!(state.is_plan_exhausted(1));
        state.ball.launch(Vec2::new(50.0, 0.0), 120.0);
        assert!(!state.is_plan_exhausted(1));
    }
}
