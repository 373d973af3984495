//! Quantified engine properties: rate bounds, interception geometry,
//! knockback return and the court envelope after arbitrary runs.

use handball_engine::batch::random_plan;
use handball_engine::game::agent::{Agent, SpeedProfile};
use handball_engine::game::constants::timing::DT;
use handball_engine::game::engine::MatchEngine;
use handball_engine::game::fast_forward::run_sync;
use handball_engine::game::position::{Side, Slot, SlotMap};
use handball_engine::game::probability::success_rate;
use handball_engine::game::rng::MatchRng;
use handball_engine::game::setup::{MatchSetup, OpponentDescriptor, RosterSnapshot, Stats};
use handball_engine::game::systems::defense::DefenseBehavior;
use handball_engine::game::systems::interception::line_interceptor;
use handball_engine::util::geometry::point_to_line_distance;
use handball_engine::util::vec2::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn defenders_with(slot: Slot, position: Vec2) -> SlotMap<Agent> {
    SlotMap::from_fn(|s| {
        let mut agent = Agent::new(s, Side::Defender, SpeedProfile::default());
        if !s.is_goalkeeper() {
            agent.position = Vec2::new(95.0, 95.0);
        }
        if s == slot {
            agent.position = position;
        }
        agent
    })
}

proptest! {
    #[test]
    fn success_rate_is_bounded(attack in 0.0f32..1000.0, defense in 0.0f32..1000.0, rest in any::<bool>()) {
        let rate = success_rate(attack, defense, rest);
        prop_assert!((5.0..=95.0).contains(&rate), "rate {} out of bounds", rate);
    }

    #[test]
    fn rest_bonus_never_hurts(attack in 0.0f32..1000.0, defense in 0.0f32..1000.0) {
        prop_assert!(success_rate(attack, defense, true) >= success_rate(attack, defense, false));
    }

    #[test]
    fn degenerate_stats_stay_bounded(attack in prop::num::f32::ANY, defense in prop::num::f32::ANY) {
        let rate = success_rate(attack, defense, false);
        prop_assert!((5.0..=95.0).contains(&rate));
    }
}

#[test]
fn interception_threshold_is_deterministic() {
    let from = Vec2::new(0.0, 50.0);
    let to = Vec2::new(100.0, 50.0);
    assert_eq!(point_to_line_distance(50.0, 50.0, 0.0, 50.0, 100.0, 50.0), 0.0);
    assert!((point_to_line_distance(50.0, 10.0, 0.0, 50.0, 100.0, 50.0) - 40.0).abs() < 1e-4);

    for slot in Slot::FIELD {
        let on_line = defenders_with(slot, Vec2::new(50.0, 50.0));
        assert_eq!(line_interceptor(&on_line, from, to), Some(slot));

        let far = defenders_with(slot, Vec2::new(50.0, 10.0));
        assert_eq!(line_interceptor(&far, from, to), None);
    }
}

#[test]
fn knockback_returns_to_origin() {
    let mut agent = Agent::new(Slot::Pivot, Side::Defender, SpeedProfile::default());
    let origin = agent.position;
    agent.knockback(0.0, 5.0);
    assert!(agent.position.distance_to(origin) > 4.9);

    let mut elapsed = 0.0;
    while elapsed <= 3.5 {
        agent.update(DT);
        elapsed += DT;
    }
    assert!(agent.position.distance_to(origin) < 0.01);
    assert!(!agent.is_knocked_back());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn agents_stay_on_court(
        seed in any::<u64>(),
        steps in 1usize..=6,
        behavior in 0usize..DefenseBehavior::ALL.len(),
        stat in 1.0f32..30.0,
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let plan = random_plan(&mut rng, steps).unwrap();
        let opponent = OpponentDescriptor::new("Prop", DefenseBehavior::ALL[behavior], Stats::uniform(stat));
        let setup = MatchSetup::new(RosterSnapshot::default(), opponent, plan).with_rng(MatchRng::new(seed));
        let mut engine = MatchEngine::new(setup);

        let result = run_sync(&mut engine, 10_000);
        prop_assert!(
            result.final_state.boundary_violations.is_empty(),
            "violations: {:?}",
            result.final_state.boundary_violations
        );
        for (slot, p) in result.final_state.defender_positions.iter().chain(&result.final_state.attacker_positions) {
            let max_y = if slot.is_goalkeeper() { 110.0 } else { 100.0 };
            prop_assert!(p.x >= 0.0 && p.x <= 100.0 && p.y >= 0.0 && p.y <= max_y);
        }
    }
}
