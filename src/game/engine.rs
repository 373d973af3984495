//! Match simulation engine
//!
//! A frame-stepped state machine: `Idle -> Running <-> Paused -> Ended`.
//! Each [`MatchEngine::step`] advances agents and the ball, runs the
//! opponent AI, progresses the current tactic step and checks for a
//! terminal score. Interceptions pause the engine until the caller
//! acknowledges them with [`MatchEngine::resume`].

use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::game::action_log::{ActionLog, LogEvent};
use crate::game::agent::Agent;
use crate::game::constants::{dribble, interception as reaction, knockback};
use crate::game::match_result::{MatchEndInfo, MatchOutcome};
use crate::game::position::{Side, Slot, SlotMap};
use crate::game::probability::{roll_success, success_rate};
use crate::game::rng::MatchRng;
use crate::game::setup::{MatchSetup, OpponentDescriptor, RosterSnapshot};
use crate::game::state::{
    Action, ActionInProgress, InterceptionInfo, InterceptionKind, MatchPhase, MatchState, Score,
    ShotOutcome,
};
use crate::game::systems::final_boss::FixedRates;
use crate::game::systems::{defense, final_boss, interception, movement};
use crate::game::tactic::{DribbleDirection, DribbleDistance, NextAction, ShootType, TacticPlan, TacticStep};
use crate::util::vec2::Vec2;

/// Illegal state-machine transition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("match already started")]
    AlreadyStarted,
    #[error("match not started")]
    NotStarted,
    #[error("match has ended")]
    Ended,
    #[error("resume called while not paused")]
    NotPaused,
}

/// Notification produced by a step or a resume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MatchEvent {
    /// Either side's score changed
    Score(Score),
    /// Engine paused; the caller must call `resume()`
    Interception(InterceptionInfo),
    MatchEnd(MatchEndInfo),
}

impl MatchEvent {
    pub fn dispatch(&self, observer: &mut dyn MatchObserver) {
        match self {
            MatchEvent::Score(score) => observer.on_score(score),
            MatchEvent::Interception(info) => observer.on_interception(info),
            MatchEvent::MatchEnd(info) => observer.on_match_end(info),
        }
    }
}

/// Callback surface for presentation layers
pub trait MatchObserver {
    fn on_score(&mut self, _score: &Score) {}
    fn on_interception(&mut self, _info: &InterceptionInfo) {}
    fn on_match_end(&mut self, _info: &MatchEndInfo) {}
}

/// Renderer-facing view of the court
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub phase: MatchPhase,
    pub score: Score,
    pub ball: Vec2,
    pub ball_holder: Slot,
    pub tactic_index: usize,
    pub attackers: Vec<(Slot, Vec2)>,
    pub defenders: Vec<(Slot, Vec2)>,
}

pub struct MatchEngine {
    state: MatchState,
    plan: TacticPlan,
    roster: RosterSnapshot,
    opponent: OpponentDescriptor,
    config: MatchConfig,
    rng: MatchRng,
    /// Present in the final-boss encounter
    fixed_rates: Option<FixedRates>,
    log: ActionLog,
    /// Balls land in a single tick (fast-forward mode)
    instant_ball: bool,
    end: Option<MatchEndInfo>,
}

impl MatchEngine {
    pub fn new(setup: MatchSetup) -> Self {
        let fixed_rates = setup
            .is_final_boss()
            .then(|| FixedRates::from(&setup.config.final_boss));

        let attackers = SlotMap::from_fn(|slot| Agent::new(slot, Side::Attacker, setup.speed_profile(slot, Side::Attacker)));
        let defenders = SlotMap::from_fn(|slot| Agent::new(slot, Side::Defender, setup.speed_profile(slot, Side::Defender)));
        let state = MatchState::new(attackers, defenders, setup.config.pass_ball_speed);

        tracing::debug!(
            opponent = %setup.opponent.name,
            behavior = %setup.opponent.tactic.behavior,
            round = setup.round,
            final_boss = fixed_rates.is_some(),
            steps = setup.plan.len(),
            seed = setup.rng.seed(),
            "match engine created"
        );

        Self {
            state,
            plan: setup.plan,
            roster: setup.roster,
            opponent: setup.opponent,
            config: setup.config,
            rng: setup.rng,
            fixed_rates,
            log: ActionLog::default(),
            instant_ball: false,
            end: None,
        }
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state.phase {
            MatchPhase::Idle => {
                self.state.phase = MatchPhase::Running;
                tracing::info!(opponent = %self.opponent.name, "match started");
                Ok(())
            }
            MatchPhase::Ended => Err(EngineError::Ended),
            _ => Err(EngineError::AlreadyStarted),
        }
    }

    /// Tear down. Safe in any phase; no further events are produced.
    pub fn stop(&mut self) {
        if self.state.phase != MatchPhase::Ended {
            tracing::debug!(phase = ?self.state.phase, "match stopped");
            self.state.phase = MatchPhase::Ended;
        }
    }

    pub fn set_instant_ball(&mut self, instant: bool) {
        self.instant_ball = instant;
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state.phase, MatchPhase::Running | MatchPhase::Paused)
    }

    pub fn is_final_boss(&self) -> bool {
        self.fixed_rates.is_some()
    }

    pub fn ball_position(&self) -> Vec2 {
        self.state.ball.position
    }

    pub fn score(&self) -> Score {
        self.state.score
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn plan(&self) -> &TacticPlan {
        &self.plan
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.log
    }

    pub fn end_info(&self) -> Option<&MatchEndInfo> {
        self.end.as_ref()
    }

    /// Nothing left to execute and nothing in flight
    pub fn is_plan_exhausted(&self) -> bool {
        self.state.is_plan_exhausted(self.plan.len())
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let positions = |side: Side| -> Vec<(Slot, Vec2)> {
            self.state.agents(side).iter().map(|(slot, a)| (slot, a.position)).collect()
        };
        MatchSnapshot {
            phase: self.state.phase,
            score: self.state.score,
            ball: self.state.ball.position,
            ball_holder: self.state.ball_holder,
            tactic_index: self.state.tactic_index,
            attackers: positions(Side::Attacker),
            defenders: positions(Side::Defender),
        }
    }

    /// Advance one tick
    pub fn step(&mut self, dt: f32) -> Result<Vec<MatchEvent>, EngineError> {
        match self.state.phase {
            MatchPhase::Idle => return Err(EngineError::NotStarted),
            MatchPhase::Ended => return Err(EngineError::Ended),
            MatchPhase::Paused => return Ok(Vec::new()),
            MatchPhase::Running => {}
        }

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut events = Vec::new();
        self.state.frame += 1;
        self.state.elapsed += dt;

        movement::update_agents(&mut self.state, dt);

        let score_before = self.state.score;
        if movement::update_ball(&mut self.state, dt, self.instant_ball) {
            self.on_ball_arrived(&mut events);
            if self.state.phase == MatchPhase::Paused {
                return Ok(events);
            }
        }

        if self.state.score == score_before {
            self.update_ai();

            if !self.state.pending_takeover {
                if self.state.action.is_some() {
                    self.update_action(dt, &mut events);
                } else if self.state.tactic_index < self.plan.len() {
                    self.start_next_action();
                }
            }
        }

        self.check_terminal(&mut events);
        Ok(events)
    }

    /// Acknowledge a pending interception: the defense takes over
    pub fn resume(&mut self) -> Result<Vec<MatchEvent>, EngineError> {
        if self.state.phase != MatchPhase::Paused {
            return Err(EngineError::NotPaused);
        }

        let mut events = Vec::new();
        self.state.phase = MatchPhase::Running;
        self.state.interception = None;
        if self.state.pending_takeover {
            self.state.pending_takeover = false;
            self.handle_takeover(&mut events);
        }
        self.check_terminal(&mut events);
        Ok(events)
    }

    fn on_ball_arrived(&mut self, events: &mut Vec<MatchEvent>) {
        if let Some(reactor) = self.state.reactor.take() {
            self.state.defenders.get_mut(reactor.slot).speed_multiplier = 1.0;
        }

        if self.state.pending_takeover {
            if let Some(info) = self.state.interception.clone() {
                tracing::debug!(kind = ?info.kind, interceptor = %info.interceptor, "paused for interception");
                self.state.phase = MatchPhase::Paused;
                events.push(MatchEvent::Interception(info));
            }
            return;
        }

        match self.state.pending_shot.take() {
            Some(ShotOutcome::Goal) => {
                let scorer = self.state.ball_holder;
                self.log(LogEvent::Goal { scorer });
                tracing::info!(scorer = %scorer, "goal");
                self.add_score(Side::Attacker, events);
            }
            Some(ShotOutcome::Miss) => {
                tracing::debug!("shot off target");
                self.handle_takeover(events);
            }
            Some(ShotOutcome::Stopped) | None => {}
        }
        self.state.shot_target = None;
    }

    fn update_ai(&mut self) {
        if self.fixed_rates.is_some() {
            final_boss::assign_lanes(&mut self.state);
        } else {
            let skip = self.state.reactor.map(|r| r.slot);
            defense::update_defenders(&mut self.state, self.opponent.tactic.behavior, skip);
        }
        defense::update_goalkeeper(&mut self.state, self.fixed_rates.is_some());
    }

    fn start_next_action(&mut self) {
        let index = self.state.tactic_index;
        let Some(step) = self.plan.get(index).copied() else {
            return;
        };

        self.log(LogEvent::TacticStart {
            index,
            kind: step.kind().to_string(),
        });
        self.state.action = Some(ActionInProgress {
            step_index: index,
            action: Action::from_step(&step),
        });

        if let TacticStep::Dribble { direction, distance, .. } = step {
            self.start_dribble(index, direction, distance);
        }
    }

    fn update_action(&mut self, dt: f32, events: &mut Vec<MatchEvent>) {
        let Some(mut current) = self.state.action else {
            return;
        };
        let index = current.step_index;

        match current.action {
            Action::Dribble {
                direction,
                distance,
                next_action,
                pass_to,
                elapsed,
            } => {
                let elapsed = elapsed + dt;
                if elapsed < distance.duration() {
                    current.action = Action::Dribble {
                        direction,
                        distance,
                        next_action,
                        pass_to,
                        elapsed,
                    };
                    self.state.action = Some(current);
                    return;
                }

                match next_action {
                    NextAction::DribbleBack => {
                        self.dribble_back(direction);
                        self.finish_action();
                    }
                    NextAction::Pass => match pass_to {
                        Some(to) => {
                            current.action = Action::Pass { to, started: true };
                            self.state.action = Some(current);
                            self.execute_pass(index, to);
                        }
                        None => {
                            tracing::warn!(step = index + 1, "dribble follow-up pass has no receiver, turning over");
                            self.log(LogEvent::MalformedStep {
                                index,
                                reason: "dribble pass without passTo".to_string(),
                            });
                            self.state.failed_tactic_index.get_or_insert(index);
                            self.handle_takeover(events);
                        }
                    },
                    NextAction::ShootCorner | NextAction::ShootCenter => {
                        let shoot_type = if next_action == NextAction::ShootCorner {
                            ShootType::Corner
                        } else {
                            ShootType::Center
                        };
                        current.action = Action::Shoot { shoot_type, started: true };
                        self.state.action = Some(current);
                        self.execute_shoot(index, shoot_type);
                    }
                }
            }
            Action::Pass { to, started } => {
                if !started {
                    current.action = Action::Pass { to, started: true };
                    self.state.action = Some(current);
                    self.execute_pass(index, to);
                } else if !self.state.ball.animating {
                    self.finish_action();
                }
            }
            Action::Shoot { shoot_type, started } => {
                if !started {
                    current.action = Action::Shoot { shoot_type, started: true };
                    self.state.action = Some(current);
                    self.execute_shoot(index, shoot_type);
                } else if !self.state.ball.animating && self.state.pending_shot.is_none() {
                    self.finish_action();
                }
            }
        }
    }

    fn finish_action(&mut self) {
        self.state.action = None;
        self.state.tactic_index += 1;
    }

    fn start_dribble(&mut self, index: usize, direction: DribbleDirection, distance: DribbleDistance) {
        let holder_slot = self.state.ball_holder;
        let holder = self.state.holder_mut();
        let (dx, dy) = direction.delta();
        let from = holder.position;
        let target = from + Vec2::new(dx, dy) * distance.units();
        holder.set_target(target.x, target.y);

        self.log(LogEvent::DribbleStart {
            holder: holder_slot,
            direction,
            distance,
        });

        let found = interception::dribble_interceptor(&self.state.defenders, from);
        self.log(LogEvent::DribbleInterceptionCheck { interceptor: found });
        let Some(slot) = found else {
            return;
        };

        let rate = match self.fixed_rates {
            Some(rates) => rates.dribble_breakthrough,
            None => success_rate(
                self.roster.effective_stats().dribble,
                self.opponent.stats.dribble,
                self.roster.rest_bonus,
            ),
        };

        if roll_success(rate, &mut self.rng) {
            let defender = self.state.defenders.get_mut(slot);
            let angle = (defender.position - from).angle_degrees();
            defender.knockback(angle, knockback::DEFAULT_DISTANCE);
            self.log(LogEvent::Breakthrough { interceptor: slot, rate });
            tracing::debug!(interceptor = %slot, rate, "dribble broke through");
        } else {
            let holder = self.state.holder_mut();
            let here = holder.position;
            holder.set_target(here.x, here.y);
            self.intercept(index, InterceptionKind::Dribble, slot, None, None);
        }
    }

    fn dribble_back(&mut self, direction: DribbleDirection) {
        let holder_slot = self.state.ball_holder;
        let holder = self.state.holder_mut();
        let (dx, dy) = direction.reversed().delta();
        let target = holder.position + Vec2::new(dx, dy) * dribble::BACK_DISTANCE;
        holder.set_target(target.x, target.y);
        self.log(LogEvent::DribbleBack { holder: holder_slot });
    }

    fn execute_pass(&mut self, index: usize, to: Slot) {
        let from_slot = self.state.ball_holder;
        let from = self.state.holder().position;
        let to_pos = self.state.attackers.get(to).position;
        self.log(LogEvent::PassStart { from: from_slot, to });

        let found = interception::line_interceptor(&self.state.defenders, from, to_pos);
        self.log(LogEvent::LineInterceptionCheck { interceptor: found });

        if let Some(slot) = found {
            let rate = match self.fixed_rates {
                Some(rates) => rates.pass_breakthrough,
                None => success_rate(
                    self.roster.effective_stats().pass,
                    self.opponent.stats.pass,
                    self.roster.rest_bonus,
                ),
            };
            if roll_success(rate, &mut self.rng) {
                let angle = (to_pos - from).angle_degrees() + knockback::LINE_ANGLE_OFFSET;
                self.state.defenders.get_mut(slot).knockback(angle, knockback::DEFAULT_DISTANCE);
                self.log(LogEvent::Breakthrough { interceptor: slot, rate });
                tracing::debug!(interceptor = %slot, rate, "pass broke through");
            } else {
                self.intercept(index, InterceptionKind::Pass, slot, Some(to), None);
                return;
            }
        }

        self.state.ball.launch(to_pos, self.config.pass_ball_speed);
        self.state.set_holder(to);
        self.log(LogEvent::PassSuccess { to });
        self.begin_reaction(from, to_pos);
    }

    fn execute_shoot(&mut self, index: usize, shoot_type: ShootType) {
        let shooter = self.state.ball_holder;
        let from = self.state.holder().position;
        let keeper_x = self.state.defenders.get(Slot::Goalkeeper).position.x;
        let target = interception::shot_target(shoot_type, keeper_x);
        let shot_speed = self.config.shot_ball_speed;

        self.log(LogEvent::ShootStart {
            shooter,
            shoot_type,
            target,
        });
        self.state.ball.launch(target, shot_speed);
        self.state.shot_target = Some(target);

        let breakthrough_rate = match self.fixed_rates {
            Some(rates) => rates.shot_breakthrough,
            None => success_rate(
                self.roster.effective_stats().shoot * shoot_type.power(),
                self.opponent.stats.shoot,
                self.roster.rest_bonus,
            ),
        };

        let found = interception::line_interceptor(&self.state.defenders, from, target);
        self.log(LogEvent::LineInterceptionCheck { interceptor: found });

        if let Some(slot) = found {
            if roll_success(breakthrough_rate, &mut self.rng) {
                let angle = (target - from).angle_degrees() + knockback::LINE_ANGLE_OFFSET;
                self.state.defenders.get_mut(slot).knockback(angle, knockback::DEFAULT_DISTANCE);
                self.log(LogEvent::Breakthrough {
                    interceptor: slot,
                    rate: breakthrough_rate,
                });
            } else {
                self.state.shot_target = None;
                self.state.pending_shot = Some(ShotOutcome::Stopped);
                self.log(LogEvent::ShootResult { outcome: ShotOutcome::Stopped });
                self.intercept(index, InterceptionKind::Shoot, slot, None, Some(shoot_type));
                return;
            }
        }

        if !interception::is_on_target(target) {
            self.state.pending_shot = Some(ShotOutcome::Miss);
            self.log(LogEvent::ShootResult { outcome: ShotOutcome::Miss });
            self.begin_reaction(from, target);
            return;
        }

        let (in_reach, save_rate, always) = match self.fixed_rates {
            Some(rates) => (true, rates.keeper_save, rates.keeper_always_saves()),
            None => {
                let keeper = self.state.defenders.get(Slot::Goalkeeper);
                let reach = interception::goalkeeper_reach(keeper, from, target, shot_speed);
                (reach.can_save(), interception::goalkeeper_save_rate(breakthrough_rate, reach), false)
            }
        };
        let saved = in_reach && (always || roll_success(save_rate, &mut self.rng));
        self.log(LogEvent::GoalkeeperCheck {
            in_reach,
            rate: save_rate,
            saved,
        });

        if saved {
            self.state.pending_shot = Some(ShotOutcome::Stopped);
            self.log(LogEvent::ShootResult { outcome: ShotOutcome::Stopped });
            let keeper_pos = Vec2::new(target.x, self.state.defenders.get(Slot::Goalkeeper).position.y);
            self.state.pending_takeover = true;
            self.state.failed_tactic_index.get_or_insert(index);
            self.state.interception = Some(InterceptionInfo {
                kind: InterceptionKind::Shoot,
                interceptor: Slot::Goalkeeper,
                interceptor_position: keeper_pos,
                ball_holder: shooter,
                target: None,
                shoot_type: Some(shoot_type),
                goalkeeper_save: true,
                step_index: index,
            });
            self.log(LogEvent::Intercepted {
                kind: InterceptionKind::Shoot,
                interceptor: Slot::Goalkeeper,
            });
            tracing::debug!(rate = save_rate, "goalkeeper save");
        } else {
            self.state.pending_shot = Some(ShotOutcome::Goal);
            self.log(LogEvent::ShootResult { outcome: ShotOutcome::Goal });
        }

        self.begin_reaction(from, target);
    }

    /// A field defender stopped the action: ball flies to it, takeover pending
    fn intercept(
        &mut self,
        index: usize,
        kind: InterceptionKind,
        interceptor: Slot,
        target: Option<Slot>,
        shoot_type: Option<ShootType>,
    ) {
        let position = self.state.defenders.get(interceptor).position;
        self.state.ball.launch(position, self.config.pass_ball_speed);
        self.state.pending_takeover = true;
        self.state.failed_tactic_index.get_or_insert(index);
        self.state.interception = Some(InterceptionInfo {
            kind,
            interceptor,
            interceptor_position: position,
            ball_holder: self.state.ball_holder,
            target,
            shoot_type,
            goalkeeper_save: false,
            step_index: index,
        });
        self.log(LogEvent::Intercepted { kind, interceptor });
        tracing::debug!(?kind, interceptor = %interceptor, step = index + 1, "intercepted");
    }

    /// Only the defender nearest to the flight line reacts, at boosted speed
    fn begin_reaction(&mut self, from: Vec2, to: Vec2) {
        if self.fixed_rates.is_some() {
            return;
        }
        if let Some(reactor) = interception::reaction_defender(&self.state.defenders, from, to) {
            let defender = self.state.defenders.get_mut(reactor.slot);
            defender.speed_multiplier = reaction::REACTION_SPEED_MULTIPLIER;
            defender.set_target(reactor.target.x, reactor.target.y);
            self.state.reactor = Some(reactor);
        }
    }

    /// Loss of possession, booked as a defender point
    fn handle_takeover(&mut self, events: &mut Vec<MatchEvent>) {
        if self.state.failed_tactic_index.is_none() {
            let index = self
                .state
                .action
                .map_or(self.state.tactic_index, |a| a.step_index);
            self.state.failed_tactic_index = Some(index);
        }
        let step_index = self.state.failed_tactic_index;
        self.log(LogEvent::Turnover { step_index });
        tracing::debug!(?step_index, "turnover");
        self.add_score(Side::Defender, events);
    }

    fn add_score(&mut self, side: Side, events: &mut Vec<MatchEvent>) {
        match side {
            Side::Attacker => self.state.score.attacker += 1,
            Side::Defender => self.state.score.defender += 1,
        }
        let score = self.state.score;
        self.log(LogEvent::ScoreChange { score });
        events.push(MatchEvent::Score(score));
        self.state.reset_positions(self.config.pass_ball_speed);
    }

    fn check_terminal(&mut self, events: &mut Vec<MatchEvent>) {
        if self.state.phase != MatchPhase::Running {
            return;
        }
        let outcome = if self.state.score.attacker >= self.config.points_to_win {
            MatchOutcome::Win
        } else if self.state.score.defender > 0 {
            MatchOutcome::AttemptFailed
        } else {
            return;
        };

        let info = MatchEndInfo {
            score: self.state.score,
            outcome,
            failed_step_index: match outcome {
                MatchOutcome::Win => None,
                MatchOutcome::AttemptFailed => self.state.failed_tactic_index,
            },
        };
        tracing::info!(?outcome, score = ?info.score, failed_step = ?info.failed_step_index, "match ended");
        self.state.phase = MatchPhase::Ended;
        self.end = Some(info.clone());
        events.push(MatchEvent::MatchEnd(info));
    }

    fn log(&mut self, event: LogEvent) {
        self.log.push(self.state.frame, self.state.elapsed, event);
    }
}
