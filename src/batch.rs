//! Batch runner
//!
//! Generates seeded random plans shaped like real planner output (passes and
//! dribble-passes, finished by a shot) and fast-forwards each one against
//! every defense behavior in parallel.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::{env_parse, MatchConfig};
use crate::game::constants::round_stat_range;
use crate::game::engine::MatchEngine;
use crate::game::fast_forward::run_sync;
use crate::game::match_result::{RunReason, SyncRunResult};
use crate::game::position::Slot;
use crate::game::rng::MatchRng;
use crate::game::setup::{MatchSetup, OpponentDescriptor, RosterSnapshot, Stats};
use crate::game::systems::defense::DefenseBehavior;
use crate::game::tactic::{
    DribbleDirection, DribbleDistance, NextAction, PlanError, ShootType, TacticPlan, TacticStep,
};
use crate::metrics::BatchMetrics;

const DIRECTIONS: [DribbleDirection; 4] = [
    DribbleDirection::TowardGoal,
    DribbleDirection::AwayFromGoal,
    DribbleDirection::Left,
    DribbleDirection::Right,
];

/// Batch parameters
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub seed: u64,
    /// Plans per behavior
    pub samples: usize,
    /// Steps per plan
    pub steps: usize,
    pub round: u32,
    pub match_config: MatchConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            samples: 100,
            steps: 3,
            round: 1,
            match_config: MatchConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Load from `BATCH_*` variables on top of the match config
    pub fn load_or_default() -> Self {
        let mut config = Self {
            match_config: MatchConfig::load_or_default(),
            ..Self::default()
        };

        if let Some(v) = env_parse::<u64>("BATCH_SEED", |_| true) {
            config.seed = v;
        }
        if let Some(v) = env_parse::<usize>("BATCH_SAMPLES", |v| *v > 0) {
            config.samples = v;
        }
        if let Some(v) = env_parse::<usize>("BATCH_STEPS", |v| (1..=10).contains(v)) {
            config.steps = v;
        }
        if let Some(v) = env_parse::<u32>("BATCH_ROUND", |v| (1..=6).contains(v)) {
            config.round = v;
        }

        config
    }
}

/// Random plan of `steps` steps starting from the CB. Every step but the last
/// moves the ball to another field player; the last one shoots.
pub fn random_plan<R: Rng>(rng: &mut R, steps: usize) -> Result<TacticPlan, PlanError> {
    let mut holder = Slot::CenterBack;
    let mut plan = Vec::with_capacity(steps);

    for i in 0..steps {
        let last = i + 1 == steps;
        let dribble = rng.gen_bool(0.5);

        let step = if last {
            let shoot_type = *[ShootType::Corner, ShootType::Center].choose(rng).unwrap_or(&ShootType::Center);
            if dribble {
                TacticStep::Dribble {
                    direction: *DIRECTIONS.choose(rng).unwrap_or(&DribbleDirection::TowardGoal),
                    distance: *DribbleDistance::ALL.choose(rng).unwrap_or(&DribbleDistance::Short),
                    next_action: match shoot_type {
                        ShootType::Corner => NextAction::ShootCorner,
                        ShootType::Center => NextAction::ShootCenter,
                    },
                    pass_to: None,
                }
            } else {
                TacticStep::Shoot { shoot_type }
            }
        } else {
            let to = random_receiver(rng, holder);
            holder = to;
            if dribble {
                TacticStep::Dribble {
                    direction: *DIRECTIONS.choose(rng).unwrap_or(&DribbleDirection::TowardGoal),
                    distance: *DribbleDistance::ALL.choose(rng).unwrap_or(&DribbleDistance::Short),
                    next_action: NextAction::Pass,
                    pass_to: Some(to),
                }
            } else {
                TacticStep::Pass { to }
            }
        };
        plan.push(step);
    }

    TacticPlan::new(plan)
}

fn random_receiver<R: Rng>(rng: &mut R, holder: Slot) -> Slot {
    let others: Vec<Slot> = Slot::FIELD.into_iter().filter(|s| *s != holder).collect();
    others.choose(rng).copied().unwrap_or(Slot::Pivot)
}

/// Compact one-line description, e.g. `CB→LB:to-m→P→corner`
pub fn describe(plan: &TacticPlan) -> String {
    let mut desc = String::from(Slot::CenterBack.short_name());
    for step in plan.steps() {
        match step {
            TacticStep::Pass { to } => {
                desc.push('→');
                desc.push_str(to.short_name());
            }
            TacticStep::Dribble {
                direction,
                distance,
                next_action,
                pass_to,
            } => {
                let dir = match direction {
                    DribbleDirection::TowardGoal => "to",
                    DribbleDirection::AwayFromGoal => "aw",
                    DribbleDirection::Left => "le",
                    DribbleDirection::Right => "ri",
                };
                let dist = match distance {
                    DribbleDistance::Short => "s",
                    DribbleDistance::Medium => "m",
                    DribbleDistance::Long => "l",
                };
                desc.push_str(&format!(":{}-{}", dir, dist));
                match (next_action, pass_to) {
                    (NextAction::Pass, Some(to)) => {
                        desc.push('→');
                        desc.push_str(to.short_name());
                    }
                    (NextAction::ShootCorner, _) => desc.push_str("→corner"),
                    (NextAction::ShootCenter, _) => desc.push_str("→center"),
                    _ => desc.push_str("→back"),
                }
            }
            TacticStep::Shoot { shoot_type } => match shoot_type {
                ShootType::Corner => desc.push_str("→corner"),
                ShootType::Center => desc.push_str("→center"),
            },
        }
    }
    desc
}

/// Opponent with uniform stats drawn from the round's range
pub fn random_opponent<R: Rng>(rng: &mut R, behavior: DefenseBehavior, round: u32) -> OpponentDescriptor {
    let (lo, hi) = round_stat_range(round);
    let stat = rng.gen_range(lo..=hi).round();
    OpponentDescriptor::new(format!("{} team", behavior), behavior, Stats::uniform(stat))
}

/// Outcome of one plan against one behavior
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub behavior: DefenseBehavior,
    pub plan: String,
    pub seed: u64,
    pub reason: RunReason,
    pub frames: u32,
    pub failed_step_index: Option<usize>,
}

/// Per-behavior reason histogram
#[derive(Debug, Clone, Default, Serialize)]
pub struct BehaviorSummary {
    pub behavior: DefenseBehavior,
    pub runs: usize,
    pub goals: usize,
    pub intercepted: usize,
    pub attempt_failed: usize,
    pub no_goal: usize,
    pub timeouts: usize,
    pub errors: usize,
}

impl BehaviorSummary {
    fn add(&mut self, reason: RunReason) {
        self.runs += 1;
        match reason {
            RunReason::Goal => self.goals += 1,
            RunReason::Intercepted => self.intercepted += 1,
            RunReason::AttemptFailed => self.attempt_failed += 1,
            RunReason::TacticsCompletedNoGoal => self.no_goal += 1,
            RunReason::Timeout => self.timeouts += 1,
            RunReason::Error => self.errors += 1,
        }
    }
}

/// Run one seeded scenario
pub fn run_scenario(config: &BatchConfig, behavior: DefenseBehavior, seed: u64) -> Result<(String, SyncRunResult), PlanError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let plan = random_plan(&mut rng, config.steps)?;
    let opponent = random_opponent(&mut rng, behavior, config.round);
    let description = describe(&plan);

    let setup = MatchSetup::new(RosterSnapshot::default(), opponent, plan)
        .with_round(config.round)
        .with_config(config.match_config.clone())
        .with_rng(MatchRng::new(seed));
    let mut engine = MatchEngine::new(setup);
    let result = run_sync(&mut engine, config.match_config.max_sync_frames);
    Ok((description, result))
}

/// Every behavior × `samples` plans, in parallel
pub fn run_batch(config: &BatchConfig, metrics: &BatchMetrics) -> Result<Vec<ScenarioResult>, PlanError> {
    let jobs: Vec<(DefenseBehavior, u64)> = DefenseBehavior::ALL
        .into_iter()
        .enumerate()
        .flat_map(|(b, behavior)| {
            (0..config.samples).map(move |i| {
                let seed = config.seed.wrapping_add((b * config.samples + i) as u64);
                (behavior, seed)
            })
        })
        .collect();

    tracing::info!(jobs = jobs.len(), steps = config.steps, round = config.round, "batch started");

    jobs.into_par_iter()
        .map(|(behavior, seed)| {
            let started = Instant::now();
            let (plan, result) = run_scenario(config, behavior, seed)?;
            metrics.record(&result, started.elapsed());
            if result.reason == RunReason::Error {
                tracing::warn!(%behavior, seed, message = ?result.message, "scenario errored");
            }
            Ok(ScenarioResult {
                behavior,
                plan,
                seed,
                reason: result.reason,
                frames: result.frames,
                failed_step_index: result.failed_step_index,
            })
        })
        .collect()
}

/// Fold scenario results into one histogram per behavior, in behavior order
pub fn summarize(results: &[ScenarioResult]) -> Vec<BehaviorSummary> {
    DefenseBehavior::ALL
        .into_iter()
        .map(|behavior| {
            let mut summary = BehaviorSummary {
                behavior,
                ..Default::default()
            };
            for r in results.iter().filter(|r| r.behavior == behavior) {
                summary.add(r.reason);
            }
            summary
        })
        .collect()
}
