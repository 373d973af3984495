//! Read-only inputs a match is built from: the player's roster snapshot,
//! the opponent descriptor and the tournament round.

use serde::{Deserialize, Serialize};

use crate::config::{FinalBossConfig, MatchConfig};
use crate::game::agent::SpeedProfile;
use crate::game::position::{Side, Slot};
use crate::game::rng::MatchRng;
use crate::game::systems::defense::DefenseBehavior;
use crate::game::tactic::TacticPlan;

/// Team action stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub pass: f32,
    pub dribble: f32,
    pub shoot: f32,
}

impl Stats {
    pub const fn uniform(value: f32) -> Self {
        Self {
            pass: value,
            dribble: value,
            shoot: value,
        }
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            pass: self.pass * factor,
            dribble: self.dribble * factor,
            shoot: self.shoot * factor,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::uniform(5.0)
    }
}

/// The player's team as the engine sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    pub stats: Stats,
    #[serde(default)]
    pub aces: Vec<Slot>,
    #[serde(default)]
    pub gear_second: Vec<Slot>,
    /// +2 attack on every success roll after a rest day
    #[serde(default)]
    pub rest_bonus: bool,
    /// Captain personality multiplier on all stats
    #[serde(default = "one")]
    pub captain_multiplier: f32,
}

fn one() -> f32 {
    1.0
}

impl Default for RosterSnapshot {
    fn default() -> Self {
        Self {
            stats: Stats::default(),
            aces: Vec::new(),
            gear_second: Vec::new(),
            rest_bonus: false,
            captain_multiplier: 1.0,
        }
    }
}

impl RosterSnapshot {
    pub fn effective_stats(&self) -> Stats {
        self.stats.scaled(self.captain_multiplier)
    }
}

/// Opponent defensive tactic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentTactic {
    #[serde(default)]
    pub behavior: DefenseBehavior,
    #[serde(default)]
    pub aggressiveness: f32,
}

impl Default for OpponentTactic {
    fn default() -> Self {
        Self {
            behavior: DefenseBehavior::Balanced,
            aggressiveness: 0.5,
        }
    }
}

/// Opponent team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentDescriptor {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub tactic: OpponentTactic,
    pub stats: Stats,
    #[serde(default)]
    pub aces: Vec<Slot>,
    #[serde(default)]
    pub gear_second: Vec<Slot>,
}

impl OpponentDescriptor {
    pub fn new(name: impl Into<String>, behavior: DefenseBehavior, stats: Stats) -> Self {
        Self {
            name: name.into(),
            region: String::new(),
            tactic: OpponentTactic {
                behavior,
                ..Default::default()
            },
            stats,
            aces: Vec::new(),
            gear_second: Vec::new(),
        }
    }
}

/// Everything needed to construct a [`MatchEngine`](crate::game::engine::MatchEngine)
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub roster: RosterSnapshot,
    pub opponent: OpponentDescriptor,
    pub plan: TacticPlan,
    /// Tournament round, 1-based
    pub round: u32,
    pub config: MatchConfig,
    pub rng: MatchRng,
}

impl MatchSetup {
    pub fn new(roster: RosterSnapshot, opponent: OpponentDescriptor, plan: TacticPlan) -> Self {
        Self {
            roster,
            opponent,
            plan,
            round: 1,
            config: MatchConfig::default(),
            rng: MatchRng::from_entropy(),
        }
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_rng(mut self, rng: MatchRng) -> Self {
        self.rng = rng;
        self
    }

    /// Unbeatable encounter: named opponent in the final round
    pub fn is_final_boss(&self) -> bool {
        is_final_boss(&self.config.final_boss, &self.opponent, self.round)
    }

    /// Speed inputs for the agent in `slot` on `side`
    pub fn speed_profile(&self, slot: Slot, side: Side) -> SpeedProfile {
        match side {
            Side::Attacker => SpeedProfile {
                stat: self.roster.effective_stats().dribble,
                is_ace: self.roster.aces.contains(&slot),
                is_gear_second: self.roster.gear_second.contains(&slot),
                final_boss: false,
            },
            Side::Defender => SpeedProfile {
                stat: self.opponent.stats.dribble,
                is_ace: self.opponent.aces.contains(&slot),
                is_gear_second: self.opponent.gear_second.contains(&slot),
                final_boss: self.is_final_boss(),
            },
        }
    }
}

/// The boss is identified by team name or region, and only counts in the final round
pub fn is_final_boss(config: &FinalBossConfig, opponent: &OpponentDescriptor, round: u32) -> bool {
    config.enabled
        && round == config.final_round
        && (opponent.name == config.identity || opponent.region == config.identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tactic::{ShootType, TacticStep};

    fn plan() -> TacticPlan {
        TacticPlan::new(vec![TacticStep::Shoot { shoot_type: ShootType::Corner }]).unwrap()
    }

    #[test]
    fn test_final_boss_needs_name_and_round() {
        let config = FinalBossConfig::default();
        let boss = OpponentDescriptor::new(config.identity.clone(), DefenseBehavior::Zone, Stats::uniform(20.0));
        let other = OpponentDescriptor::new("Harbor City", DefenseBehavior::Zone, Stats::uniform(20.0));

        assert!(is_final_boss(&config, &boss, config.final_round));
        assert!(!is_final_boss(&config, &boss, config.final_round - 1));
        assert!(!is_final_boss(&config, &other, config.final_round));
    }

    #[test]
    fn test_speed_profile_sources() {
        let roster = RosterSnapshot {
            aces: vec![Slot::LeftWing],
            gear_second: vec![Slot::Pivot],
            ..Default::default()
        };
        let opponent = OpponentDescriptor::new("Harbor City", DefenseBehavior::Balanced, Stats::uniform(12.0));
        let setup = MatchSetup::new(roster, opponent, plan()).with_rng(MatchRng::new(1));

        let lw = setup.speed_profile(Slot::LeftWing, Side::Attacker);
        assert!(lw.is_ace && !lw.is_gear_second);
        assert!(setup.speed_profile(Slot::Pivot, Side::Attacker).is_gear_second);

        let def = setup.speed_profile(Slot::LeftWing, Side::Defender);
        assert_eq!(def.stat, 12.0);
        assert!(!def.is_ace && !def.final_boss);
    }

    #[test]
    fn test_roster_json_defaults() {
        let roster: RosterSnapshot =
            serde_json::from_str(r#"{"stats":{"pass":8,"dribble":9,"shoot":10},"aces":["CB"]}"#).unwrap();
        assert_eq!(roster.captain_multiplier, 1.0);
        assert_eq!(roster.aces, vec![Slot::CenterBack]);
        assert!(roster.gear_second.is_empty());
    }
}
