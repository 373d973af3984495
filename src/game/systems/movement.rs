use crate::game::constants::ball::ARRIVE_RADIUS;
use crate::game::state::MatchState;

/// Advance every agent on both sides
pub fn update_agents(state: &mut MatchState, dt: f32) {
    for agent in state.attackers.values_mut().chain(state.defenders.values_mut()) {
        agent.update(dt);
    }
}

/// Advance the ball. An animating ball moves at its own speed and lands
/// exactly on target once within [`ARRIVE_RADIUS`]; `instant` lands it in
/// one tick. A resting ball follows the holder.
///
/// Returns true on the tick the ball arrives.
pub fn update_ball(state: &mut MatchState, dt: f32, instant: bool) -> bool {
    let ball = &mut state.ball;
    if !ball.animating {
        ball.position = state.attackers.get(state.ball_holder).position;
        return false;
    }

    let to_target = ball.target - ball.position;
    let dist = to_target.length();
    let step = ball.speed * dt;

    if instant || dist < ARRIVE_RADIUS || dist <= step {
        ball.position = ball.target;
        ball.animating = false;
        true
    } else {
        ball.position += to_target * (step / dist);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::agent::{Agent, SpeedProfile};
    use crate::game::constants::timing::DT;
    use crate::game::position::{Side, Slot, SlotMap};
    use crate::util::vec2::Vec2;

    fn state() -> MatchState {
        let attackers = SlotMap::from_fn(|slot| Agent::new(slot, Side::Attacker, SpeedProfile::default()));
        let defenders = SlotMap::from_fn(|slot| Agent::new(slot, Side::Defender, SpeedProfile::default()));
        MatchState::new(attackers, defenders, 80.0)
    }

    #[test]
    fn test_resting_ball_follows_holder() {
        let mut state = state();
        state.attackers.get_mut(Slot::CenterBack).position = Vec2::new(40.0, 60.0);
        assert!(!update_ball(&mut state, DT, false));
        assert_eq!(state.ball.position, Vec2::new(40.0, 60.0));
    }

    #[test]
    fn test_ball_interpolates_then_arrives() {
        let mut state = state();
        let start = state.ball.position;
        let target = Vec2::new(start.x, start.y - 40.0);
        state.ball.launch(target, 80.0);

        assert!(!update_ball(&mut state, DT, false));
        assert!((state.ball.position.distance_to(start) - 80.0 * DT).abs() < 1e-3);

        let mut arrived = false;
        for _ in 0..30 {
            if update_ball(&mut state, DT, false) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert_eq!(state.ball.position, target);
        assert!(!state.ball.animating);
    }

    #[test]
    fn test_instant_ball() {
        let mut state = state();
        state.ball.launch(Vec2::new(95.0, 10.0), 80.0);
        assert!(update_ball(&mut state, DT, true));
        assert_eq!(state.ball.position, Vec2::new(95.0, 10.0));
    }

    #[test]
    fn test_update_agents_moves_both_sides() {
        let mut state = state();
        state.attackers.get_mut(Slot::Pivot).set_target(62.5, 20.0);
        state.defenders.get_mut(Slot::Pivot).set_target(70.0, 20.0);
        update_agents(&mut state, DT);
        assert!(state.attackers.get(Slot::Pivot).position.y < 32.5);
        assert!(state.defenders.get(Slot::Pivot).position.y < 30.0);
    }
}
