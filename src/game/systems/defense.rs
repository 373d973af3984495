//! Opponent formation AI.
//!
//! Each field defender picks its own target every tick from the opponent's
//! regional behavior; there is no squad-level plan. The goalkeeper tracks
//! the ball laterally inside the goal mouth.

use serde::{Deserialize, Serialize};

use crate::game::constants::{court, defense};
use crate::game::position::{Side, Slot};
use crate::game::state::MatchState;
use crate::util::vec2::Vec2;

/// Regional defensive style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum DefenseBehavior {
    /// Two nearest defenders press the holder, the rest hold a shifted zone
    AllToBall,
    /// Mirror pairing against the attacking slots
    ManToMan,
    /// Pure zone shift with the ball
    Zone,
    Press,
    #[default]
    Balanced,
    SideFocus,
    CenterFocus,
    Individual,
    PerfectDefense,
}

impl DefenseBehavior {
    pub const ALL: [DefenseBehavior; 9] = [
        DefenseBehavior::AllToBall,
        DefenseBehavior::ManToMan,
        DefenseBehavior::Zone,
        DefenseBehavior::Press,
        DefenseBehavior::Balanced,
        DefenseBehavior::SideFocus,
        DefenseBehavior::CenterFocus,
        DefenseBehavior::Individual,
        DefenseBehavior::PerfectDefense,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DefenseBehavior::AllToBall => "all_to_ball",
            DefenseBehavior::ManToMan => "man_to_man",
            DefenseBehavior::Zone => "zone",
            DefenseBehavior::Press => "press",
            DefenseBehavior::Balanced => "balanced",
            DefenseBehavior::SideFocus => "side_focus",
            DefenseBehavior::CenterFocus => "center_focus",
            DefenseBehavior::Individual => "individual",
            DefenseBehavior::PerfectDefense => "perfect_defense",
        }
    }
}

impl From<String> for DefenseBehavior {
    fn from(name: String) -> Self {
        DefenseBehavior::ALL
            .into_iter()
            .find(|b| b.name() == name)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for DefenseBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Retarget every field defender for one tick. `skip` is left alone (the
/// defender currently reacting to a ball flight).
pub fn update_defenders(state: &mut MatchState, behavior: DefenseBehavior, skip: Option<Slot>) {
    let holder_slot = state.ball_holder;
    let holder = state.attackers.get(holder_slot).position;

    // Field defenders ordered by distance to the holder, slot order on ties
    let mut by_distance: Vec<(Slot, f32)> = Slot::FIELD
        .iter()
        .map(|&slot| (slot, state.defenders.get(slot).position.distance_to(holder)))
        .collect();
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
    let pressing: Vec<Slot> = by_distance
        .iter()
        .take(defense::PRESSING_DEFENDERS)
        .map(|(slot, _)| *slot)
        .collect();

    let attackers = &state.attackers;
    for (slot, defender) in state.defenders.iter_mut() {
        if slot.is_goalkeeper() || Some(slot) == skip {
            continue;
        }
        let base = slot.home(Side::Defender);
        let pos = defender.position;

        let target = match behavior {
            DefenseBehavior::AllToBall => {
                if pressing.contains(&slot) && pos.distance_to(holder) > defense::PRESS_MIN_DISTANCE {
                    pos + (holder - pos) * defense::PRESS_FRACTION
                } else {
                    Vec2::new(
                        base.x + (holder.x - court::GOAL_CENTER) * defense::ZONE_SHIFT_X_ALL_TO_BALL,
                        base.y + ((holder.y - base.y) * defense::ZONE_SHIFT_Y_ALL_TO_BALL).max(0.0),
                    )
                }
            }
            DefenseBehavior::ManToMan => {
                let Some(mark_slot) = slot.man_to_man_mark() else {
                    continue;
                };
                let mark = attackers.get(mark_slot).position;
                let dist = pos.distance_to(mark);
                if mark_slot == holder_slot {
                    if dist <= defense::TIGHT_MARK_DISTANCE {
                        continue;
                    }
                    mark
                } else {
                    if dist <= defense::MARK_DISTANCE {
                        continue;
                    }
                    mark - (mark - pos) * ((defense::MARK_DISTANCE - 1.0) / dist)
                }
            }
            DefenseBehavior::Zone => Vec2::new(
                base.x + (holder.x - court::GOAL_CENTER) * defense::ZONE_SHIFT_X,
                base.y + ((holder.y - base.y) * defense::ZONE_SHIFT_Y).max(0.0),
            ),
            _ => {
                let dist = pos.distance_to(holder);
                let pressure = if dist > 0.0 {
                    (defense::PRESSURE_SCALE / dist).clamp(defense::PRESSURE_MIN, defense::PRESSURE_MAX)
                } else {
                    defense::PRESSURE_MAX
                };
                base + (holder - pos) * pressure
            }
        };

        defender.set_target(target.x, target.y);
    }
}

/// Keep the goalkeeper on its line, following the ball holder, the flying
/// ball, or during a shot the shot target. In normal play the keeper is
/// placed directly on the shot target; `smooth` animates it there instead.
pub fn update_goalkeeper(state: &mut MatchState, smooth: bool) {
    let home = Slot::Goalkeeper.home(Side::Defender);
    let lo = court::GOAL_LEFT + court::CORNER_INSET;
    let hi = court::GOAL_RIGHT - court::CORNER_INSET;

    if let Some(shot) = state.shot_target {
        let x = shot.x.clamp(lo, hi);
        let keeper = state.defenders.get_mut(Slot::Goalkeeper);
        if keeper.is_knocked_back() {
            return;
        }
        keeper.set_target(x, home.y);
        if !smooth {
            keeper.position = Vec2::new(x, home.y);
        }
        return;
    }

    let x = if state.ball.animating {
        state.ball.position.x
    } else {
        state.attackers.get(state.ball_holder).position.x
    };
    state
        .defenders
        .get_mut(Slot::Goalkeeper)
        .set_target(x.clamp(lo, hi), home.y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::{Agent, SpeedProfile};
    use crate::game::position::SlotMap;

    fn state() -> MatchState {
        let attackers = SlotMap::from_fn(|slot| Agent::new(slot, Side::Attacker, SpeedProfile::default()));
        let defenders = SlotMap::from_fn(|slot| Agent::new(slot, Side::Defender, SpeedProfile::default()));
        MatchState::new(attackers, defenders, 80.0)
    }

    #[test]
    fn test_unknown_behavior_is_balanced() {
        let b: DefenseBehavior = serde_json::from_str("\"wall_of_doom\"").unwrap();
        assert_eq!(b, DefenseBehavior::Balanced);
        let b: DefenseBehavior = serde_json::from_str("\"man_to_man\"").unwrap();
        assert_eq!(b, DefenseBehavior::ManToMan);
        assert_eq!(serde_json::to_string(&DefenseBehavior::AllToBall).unwrap(), "\"all_to_ball\"");
    }

    #[test]
    fn test_zone_shifts_with_ball() {
        let mut state = state();
        state.attackers.get_mut(Slot::CenterBack).position = Vec2::new(80.0, 70.0);
        update_defenders(&mut state, DefenseBehavior::Zone, None);

        let lb = state.defenders.get(Slot::LeftBack);
        // 25 + (80 - 50) * 0.2, 31.25 + (70 - 31.25) * 0.15
        assert!((lb.target.x - 31.0).abs() < 1e-4);
        assert!((lb.target.y - 37.0625).abs() < 1e-4);
    }

    #[test]
    fn test_all_to_ball_presses_two() {
        let mut state = state();
        update_defenders(&mut state, DefenseBehavior::AllToBall, None);

        let holder = state.holder().position;
        let pressing = Slot::FIELD
            .iter()
            .filter(|&&slot| {
                let d = state.defenders.get(slot);
                d.target.distance_to(holder) < d.position.distance_to(holder) * 0.5
            })
            .count();
        assert_eq!(pressing, 2);
    }

    #[test]
    fn test_man_to_man_tight_on_holder() {
        let mut state = state();
        update_defenders(&mut state, DefenseBehavior::ManToMan, None);
        // CB marks CB, who holds the ball
        assert_eq!(state.defenders.get(Slot::CenterBack).target, state.holder().position);
    }

    #[test]
    fn test_skip_leaves_reactor_alone() {
        let mut state = state();
        let before = state.defenders.get(Slot::Pivot).target;
        update_defenders(&mut state, DefenseBehavior::Balanced, Some(Slot::Pivot));
        assert_eq!(state.defenders.get(Slot::Pivot).target, before);
    }

    #[test]
    fn test_goalkeeper_clamped_to_mouth() {
        let mut state = state();
        state.attackers.get_mut(Slot::CenterBack).position = Vec2::new(10.0, 60.0);
        update_goalkeeper(&mut state, false);
        assert_eq!(state.defenders.get(Slot::Goalkeeper).target, Vec2::new(43.5, 5.0));
    }

    #[test]
    fn test_goalkeeper_snaps_to_shot_unless_smooth() {
        let mut state = state();
        state.shot_target = Some(Vec2::new(56.5, 0.0));
        update_goalkeeper(&mut state, false);
        assert_eq!(state.defenders.get(Slot::Goalkeeper).position, Vec2::new(56.5, 5.0));

        let mut state = self::state();
        state.shot_target = Some(Vec2::new(56.5, 0.0));
        update_goalkeeper(&mut state, true);
        let keeper = state.defenders.get(Slot::Goalkeeper);
        assert_eq!(keeper.target, Vec2::new(56.5, 5.0));
        assert_eq!(keeper.position, Vec2::new(50.0, 5.0));
    }
}
