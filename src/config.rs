use serde::{Deserialize, Serialize};

use crate::game::constants::{ball, final_boss, rules, timing};

/// Match rules and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Attacker points needed to win
    pub points_to_win: u32,
    /// Attempts granted per match before it is lost
    pub max_attempts: u32,
    /// Simulation tick rate in Hz
    pub tick_rate: u32,
    /// Frame cap for fast-forward runs
    pub max_sync_frames: u32,
    /// Real-time delay before the interception overlay fires (ms)
    pub interception_overlay_ms: u64,
    pub pass_ball_speed: f32,
    pub shot_ball_speed: f32,
    pub final_boss: FinalBossConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            points_to_win: rules::POINTS_TO_WIN,
            max_attempts: rules::MAX_ATTEMPTS,
            tick_rate: timing::TICK_RATE,
            max_sync_frames: timing::MAX_SYNC_FRAMES,
            interception_overlay_ms: timing::INTERCEPTION_OVERLAY_MS,
            pass_ball_speed: ball::PASS_SPEED,
            shot_ball_speed: ball::SHOT_SPEED,
            final_boss: FinalBossConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_parse::<u32>("HANDBALL_POINTS_TO_WIN", |v| *v > 0) {
            config.points_to_win = v;
        }
        if let Some(v) = env_parse::<u32>("HANDBALL_MAX_ATTEMPTS", |v| *v > 0 && *v <= 100) {
            config.max_attempts = v;
        }
        if let Some(v) = env_parse::<u32>("HANDBALL_TICK_RATE", |v| (1..=240).contains(v)) {
            config.tick_rate = v;
        }
        if let Some(v) = env_parse::<u32>("HANDBALL_MAX_SYNC_FRAMES", |v| *v > 0) {
            config.max_sync_frames = v;
        }
        if let Some(v) = env_parse::<u64>("HANDBALL_OVERLAY_MS", |v| *v <= 10_000) {
            config.interception_overlay_ms = v;
        }

        if let Ok(enabled) = std::env::var("HANDBALL_FINAL_BOSS") {
            match enabled.as_str() {
                "1" | "true" | "on" => config.final_boss.enabled = true,
                "0" | "false" | "off" => config.final_boss.enabled = false,
                other => tracing::warn!("Invalid HANDBALL_FINAL_BOSS '{}', using default", other),
            }
        }
        if let Ok(identity) = std::env::var("HANDBALL_FINAL_BOSS_IDENTITY") {
            if identity.is_empty() {
                tracing::warn!("HANDBALL_FINAL_BOSS_IDENTITY is empty, using default");
            } else {
                config.final_boss.identity = identity;
            }
        }
        if let Some(v) = env_parse::<u32>("HANDBALL_FINAL_ROUND", |v| *v > 0) {
            config.final_boss.final_round = v;
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.points_to_win == 0 {
            return Err("points_to_win must be at least 1".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.tick_rate == 0 {
            return Err("tick_rate cannot be 0".to_string());
        }
        if self.max_sync_frames == 0 {
            return Err("max_sync_frames must be at least 1".to_string());
        }
        if !(self.pass_ball_speed > 0.0) || !(self.shot_ball_speed > 0.0) {
            return Err("ball speeds must be positive".to_string());
        }
        self.final_boss.validate()
    }

    /// Fixed timestep for this tick rate
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

/// The unbeatable final-round opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalBossConfig {
    pub enabled: bool,
    /// Opponent name or region that marks the boss
    pub identity: String,
    /// Round in which the boss rules apply
    pub final_round: u32,
    /// Probability the defense stops a pass with a defender in range
    pub pass_intercept_rate: f32,
    pub dribble_intercept_rate: f32,
    /// Probability a field defender blocks a shot
    pub shoot_block_by_field: f32,
    /// Probability the goalkeeper saves an on-target shot
    pub shoot_block_by_gk: f32,
}

impl Default for FinalBossConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            identity: "K航拿".to_string(),
            final_round: final_boss::FINAL_ROUND,
            pass_intercept_rate: final_boss::PASS_INTERCEPT_RATE,
            dribble_intercept_rate: final_boss::DRIBBLE_INTERCEPT_RATE,
            shoot_block_by_field: final_boss::SHOOT_BLOCK_BY_FIELD,
            shoot_block_by_gk: final_boss::SHOOT_BLOCK_BY_GK,
        }
    }
}

impl FinalBossConfig {
    pub fn validate(&self) -> Result<(), String> {
        let rates = [
            self.pass_intercept_rate,
            self.dribble_intercept_rate,
            self.shoot_block_by_field,
            self.shoot_block_by_gk,
        ];
        if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err("final boss rates must lie in [0, 1]".to_string());
        }
        if self.final_round == 0 {
            return Err("final_round must be at least 1".to_string());
        }
        Ok(())
    }
}

pub(crate) fn env_parse<T>(key: &str, valid: impl Fn(&T) -> bool) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(parsed) if valid(&parsed) => Some(parsed),
        Ok(_) => {
            tracing::warn!("{} out of range ('{}'), using default", key, raw);
            None
        }
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}
