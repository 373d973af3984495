//! Final-boss lane controller.
//!
//! Replaces the regional behavior in the unbeatable encounter: every open
//! lane out of the holder's hands (to each other field attacker, and to the
//! goal) is ranked by how close its midpoint lies to the goal, then the
//! nearest free defender is sent to sit on each lane in that order.

use smallvec::SmallVec;

use crate::config::FinalBossConfig;
use crate::game::constants::court;
use crate::game::position::Slot;
use crate::game::state::MatchState;
use crate::util::vec2::Vec2;

/// A passing or shooting lane out of the holder's hands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lane {
    pub from: Vec2,
    pub to: Vec2,
    /// Receiving attacker, `None` for the shooting lane
    pub receiver: Option<Slot>,
}

impl Lane {
    fn goal_distance(&self) -> f32 {
        self.from
            .lerp(self.to, 0.5)
            .distance_to(Vec2::new(court::GOAL_CENTER, court::GOAL_LINE_Y))
    }
}

/// Lanes from the current holder, most goal-ward first
pub fn lanes(state: &MatchState) -> SmallVec<[Lane; 6]> {
    let from = state.holder().position;
    let mut lanes: SmallVec<[Lane; 6]> = Slot::FIELD
        .iter()
        .filter(|&&slot| slot != state.ball_holder)
        .map(|&slot| Lane {
            from,
            to: state.attackers.get(slot).position,
            receiver: Some(slot),
        })
        .collect();
    lanes.push(Lane {
        from,
        to: Vec2::new(court::GOAL_CENTER, court::GOAL_LINE_Y),
        receiver: None,
    });
    lanes.sort_by(|a, b| a.goal_distance().total_cmp(&b.goal_distance()));
    lanes
}

/// Send one field defender onto each lane, greedily by lane priority
pub fn assign_lanes(state: &mut MatchState) {
    let lanes = lanes(state);
    let mut free: SmallVec<[Slot; 6]> = Slot::FIELD.iter().copied().collect();

    for lane in &lanes {
        let nearest = free
            .iter()
            .enumerate()
            .map(|(i, &slot)| {
                let pos = state.defenders.get(slot).position;
                (i, pos.distance_to_segment(lane.from, lane.to))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let Some((index, _)) = nearest else {
            break;
        };
        let slot = free.remove(index);
        let defender = state.defenders.get_mut(slot);
        let block = defender.position.closest_point_on_segment(lane.from, lane.to);
        defender.set_target(block.x, block.y);
    }
}

/// Fixed-rate rolls used instead of the success-rate formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRates {
    /// Percent chance the attacker beats a defender in range
    pub pass_breakthrough: f32,
    pub dribble_breakthrough: f32,
    pub shot_breakthrough: f32,
    /// Percent chance the goalkeeper saves an on-target shot
    pub keeper_save: f32,
}

impl From<&FinalBossConfig> for FixedRates {
    fn from(config: &FinalBossConfig) -> Self {
        Self {
            pass_breakthrough: (1.0 - config.pass_intercept_rate) * 100.0,
            dribble_breakthrough: (1.0 - config.dribble_intercept_rate) * 100.0,
            shot_breakthrough: (1.0 - config.shoot_block_by_field) * 100.0,
            keeper_save: config.shoot_block_by_gk * 100.0,
        }
    }
}

impl FixedRates {
    /// Keeper rate of 100% saves without a roll
    pub fn keeper_always_saves(&self) -> bool {
        self.keeper_save >= 100.0
    }
}
