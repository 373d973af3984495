//! Interception geometry and the goalkeeper save model.
//!
//! When several defenders are within range the nearest one intercepts;
//! exact distance ties go to the earlier slot in roster order.

use crate::game::agent::Agent;
use crate::game::constants::{court, goalkeeper, interception};
use crate::game::position::{Slot, SlotMap};
use crate::game::state::Reactor;
use crate::game::tactic::ShootType;
use crate::util::vec2::Vec2;

/// Field defender within [`interception::LINE_THRESHOLD`] of the segment
/// `from..to`, nearest first.
pub fn line_interceptor(defenders: &SlotMap<Agent>, from: Vec2, to: Vec2) -> Option<Slot> {
    nearest_field_defender(defenders, interception::LINE_THRESHOLD, |p| p.distance_to_segment(from, to))
}

/// Field defender within [`interception::DRIBBLE_THRESHOLD`] of the dribbler
pub fn dribble_interceptor(defenders: &SlotMap<Agent>, dribbler: Vec2) -> Option<Slot> {
    nearest_field_defender(defenders, interception::DRIBBLE_THRESHOLD, |p| p.distance_to(dribbler))
}

/// The single defender that reacts to a ball flight along `from..to`:
/// nearest to the line within [`interception::REACTION_CUTOFF`], steering
/// for the closest point on it.
pub fn reaction_defender(defenders: &SlotMap<Agent>, from: Vec2, to: Vec2) -> Option<Reactor> {
    let mut best: Option<(Slot, f32, Vec2)> = None;
    for (slot, agent) in defenders.iter() {
        if slot.is_goalkeeper() {
            continue;
        }
        let closest = agent.position.closest_point_on_segment(from, to);
        let dist = agent.position.distance_to(closest);
        if dist > interception::REACTION_CUTOFF {
            continue;
        }
        if best.map_or(true, |(_, d, _)| dist < d) {
            best = Some((slot, dist, closest));
        }
    }
    best.map(|(slot, _, target)| Reactor { slot, target })
}

fn nearest_field_defender(
    defenders: &SlotMap<Agent>,
    threshold: f32,
    distance: impl Fn(Vec2) -> f32,
) -> Option<Slot> {
    let mut best: Option<(Slot, f32)> = None;
    for (slot, agent) in defenders.iter() {
        if slot.is_goalkeeper() {
            continue;
        }
        let dist = distance(agent.position);
        if dist < threshold && best.map_or(true, |(_, d)| dist < d) {
            best = Some((slot, dist));
        }
    }
    best.map(|(slot, _)| slot)
}

/// Aim point on the goal line. Corner shots go inside the post on the side
/// the goalkeeper is not covering.
pub fn shot_target(shoot_type: ShootType, goalkeeper_x: f32) -> Vec2 {
    let x = match shoot_type {
        ShootType::Center => court::GOAL_CENTER,
        ShootType::Corner if goalkeeper_x < court::GOAL_CENTER => court::GOAL_RIGHT - court::CORNER_INSET,
        ShootType::Corner => court::GOAL_LEFT + court::CORNER_INSET,
    };
    Vec2::new(x, court::GOAL_LINE_Y)
}

/// Inside the goal mouth and on the goal line
pub fn is_on_target(target: Vec2) -> bool {
    target.x >= court::GOAL_LEFT && target.x <= court::GOAL_RIGHT && target.y <= court::ON_TARGET_MAX_Y
}

/// How the goalkeeper stands relative to a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalkeeperReach {
    /// Can cover the lateral gap before the ball arrives (with leniency)
    pub reachable: bool,
    /// Already standing on the shot line near the goal
    pub on_line: bool,
}

impl GoalkeeperReach {
    pub fn can_save(&self) -> bool {
        self.reachable || self.on_line
    }
}

/// Compare goalkeeper lateral travel time against ball flight time
pub fn goalkeeper_reach(
    keeper: &Agent,
    shooter: Vec2,
    target: Vec2,
    ball_speed: f32,
) -> GoalkeeperReach {
    let keeper_speed = keeper.get_speed();
    let lateral = (keeper.position.x - target.x).abs();
    let keeper_time = if keeper_speed > 0.0 {
        lateral / keeper_speed
    } else {
        f32::INFINITY
    };
    let ball_time = if ball_speed > 0.0 {
        shooter.distance_to(target) / ball_speed
    } else {
        f32::INFINITY
    };

    let on_line = keeper.position.distance_to_segment(shooter, target) <= goalkeeper::ON_LINE_DISTANCE
        && keeper.position.y <= goalkeeper::GOAL_PROXIMITY;

    GoalkeeperReach {
        reachable: keeper_time <= ball_time * goalkeeper::REACH_LENIENCY,
        on_line,
    }
}

/// Save percentage for a goalkeeper in reach. `breakthrough_rate` is the
/// shot's success rate against the field players; a harder shot leaves the
/// keeper a smaller margin. Floored when already on the line.
pub fn goalkeeper_save_rate(breakthrough_rate: f32, reach: GoalkeeperReach) -> f32 {
    let rate = (100.0 - breakthrough_rate + 100.0) / 2.0;
    if reach.on_line {
        rate.max(goalkeeper::ON_LINE_MIN_SAVE_RATE)
    } else {
        rate
    }
}
