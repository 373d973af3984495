/// Simulation timing
pub mod timing {
    /// Tick rate in Hz
    pub const TICK_RATE: u32 = 30;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 30.0;
    /// Frame cap for synchronous runs
    pub const MAX_SYNC_FRAMES: u32 = 10_000;
    /// Real-time delay before the interception overlay is shown (ms)
    pub const INTERCEPTION_OVERLAY_MS: u64 = 500;
}

/// Court geometry. Attacking goal line at y = 0, half line at y = 100.
pub mod court {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 100.0;
    /// Legal envelope for agents and targets
    pub const PLAY_MIN: f32 = 5.0;
    pub const PLAY_MAX: f32 = 95.0;
    /// Goalkeepers may legally sit up to this y (off-court attacker GK)
    pub const GK_MAX_Y: f32 = 110.0;
    /// Goal mouth x-range
    pub const GOAL_LEFT: f32 = 42.5;
    pub const GOAL_RIGHT: f32 = 57.5;
    pub const GOAL_CENTER: f32 = 50.0;
    pub const GOAL_LINE_Y: f32 = 0.0;
    /// Shots landing at or below this y count as reaching the goal line
    pub const ON_TARGET_MAX_Y: f32 = 1.0;
    /// Corner shots aim this far inside the posts
    pub const CORNER_INSET: f32 = 1.0;
}

/// Movement speed model
pub mod movement {
    pub const BASE_SPEED: f32 = 5.0;
    pub const STAT_MODIFIER: f32 = 0.2;
    /// Flat boost for every defender
    pub const DEFENDER_BOOST: f32 = 1.5;
    /// Extra defender boost in the final-boss encounter
    pub const FINAL_BOSS_BOOST: f32 = 2.0;
    /// Goalkeeper lateral-movement boost
    pub const GOALKEEPER_BOOST: f32 = 1.5;
    pub const ACE_MULTIPLIER: f32 = 1.5;
    pub const GEAR_SECOND_MULTIPLIER: f32 = 2.0;
    /// Agents snap to their target inside this radius
    pub const ARRIVE_RADIUS: f32 = 0.5;
}

/// Knockback after a breakthrough
pub mod knockback {
    /// Seconds to ease back to the original position
    pub const DURATION: f32 = 3.3;
    pub const DEFAULT_DISTANCE: f32 = 5.0;
    /// Offset added to the ball direction for line knockbacks (degrees)
    pub const LINE_ANGLE_OFFSET: f32 = 315.0;
}

/// Dribble follow-ups
pub mod dribble {
    /// Reverse dribble length for `dribble_back` (medium tier)
    pub const BACK_DISTANCE: f32 = 30.0;
}

/// Ball animation
pub mod ball {
    pub const PASS_SPEED: f32 = 80.0;
    pub const SHOT_SPEED: f32 = 120.0;
    /// Ball arrives once within this distance of its target
    pub const ARRIVE_RADIUS: f32 = 1.0;
}

/// Interception geometry
pub mod interception {
    /// Max distance from a pass/shot line for a defender to intercept
    pub const LINE_THRESHOLD: f32 = 2.0;
    /// Max distance from the dribbler for a defender to intercept
    pub const DRIBBLE_THRESHOLD: f32 = 3.0;
    /// Only defenders this close to a travelling line react to it
    pub const REACTION_CUTOFF: f32 = 30.0;
    /// Speed multiplier for the single reacting defender
    pub const REACTION_SPEED_MULTIPLIER: f32 = 2.5;
}

/// Goalkeeper save model
pub mod goalkeeper {
    /// Time-to-target leniency when comparing GK and ball travel times
    pub const REACH_LENIENCY: f32 = 1.5;
    /// GK counts as already on the shot line inside this distance
    pub const ON_LINE_DISTANCE: f32 = 3.0;
    /// ...and only while standing this close to the goal line
    pub const GOAL_PROXIMITY: f32 = 10.0;
    /// Save-rate floor when already on the shot line
    pub const ON_LINE_MIN_SAVE_RATE: f32 = 80.0;
}

/// Success-rate formula bounds
pub mod rates {
    pub const MIN_RATE: f32 = 5.0;
    pub const MAX_RATE: f32 = 95.0;
    /// Attack bonus after a rest day
    pub const REST_BONUS: f32 = 2.0;
}

/// Defensive AI tuning
pub mod defense {
    /// all_to_ball: how many defenders press
    pub const PRESSING_DEFENDERS: usize = 2;
    /// all_to_ball: fraction of the gap closed per tick
    pub const PRESS_FRACTION: f32 = 0.6;
    /// all_to_ball: stop pressing when this close
    pub const PRESS_MIN_DISTANCE: f32 = 5.0;
    pub const ZONE_SHIFT_X_ALL_TO_BALL: f32 = 0.15;
    pub const ZONE_SHIFT_Y_ALL_TO_BALL: f32 = 0.2;
    /// man_to_man: tight pressure distance on the ball holder
    pub const TIGHT_MARK_DISTANCE: f32 = 2.0;
    /// man_to_man: stand-off distance from other marks
    pub const MARK_DISTANCE: f32 = 3.0;
    pub const ZONE_SHIFT_X: f32 = 0.2;
    pub const ZONE_SHIFT_Y: f32 = 0.15;
    /// balanced: pressure = clamp(PRESSURE_SCALE / dist, MIN, MAX)
    pub const PRESSURE_SCALE: f32 = 20.0;
    pub const PRESSURE_MIN: f32 = 0.1;
    pub const PRESSURE_MAX: f32 = 0.5;
}

/// Final-boss fixed-rate table (probabilities the defense stops the action)
pub mod final_boss {
    pub const PASS_INTERCEPT_RATE: f32 = 0.67;
    pub const DRIBBLE_INTERCEPT_RATE: f32 = 0.67;
    pub const SHOOT_BLOCK_BY_FIELD: f32 = 0.67;
    pub const SHOOT_BLOCK_BY_GK: f32 = 1.0;
    pub const FINAL_ROUND: u32 = 6;
}

/// Match rules
pub mod rules {
    pub const POINTS_TO_WIN: u32 = 1;
    pub const MAX_ATTEMPTS: u32 = 10;
}

/// Opponent stat ranges per tournament round (inclusive), used by the batch runner
pub fn round_stat_range(round: u32) -> (f32, f32) {
    match round {
        0 | 1 => (5.0, 10.0),
        2 => (7.0, 12.0),
        3 => (9.0, 14.0),
        4 => (11.0, 16.0),
        5 => (13.0, 18.0),
        _ => (15.0, 20.0),
    }
}
