//! On-court participant: position, steering target, speed model and the
//! knockback sub-state entered after a defender is broken through.

use serde::{Deserialize, Serialize};

use crate::game::constants::{court, knockback, movement};
use crate::game::position::{Side, Slot};
use crate::util::vec2::Vec2;

/// Inputs to the speed formula, sourced from roster/opponent state.
/// The engine never mutates these after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Dribble stat driving movement speed
    pub stat: f32,
    pub is_ace: bool,
    pub is_gear_second: bool,
    /// Final-boss encounter doubles defender speed again
    pub final_boss: bool,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            stat: 5.0,
            is_ace: false,
            is_gear_second: false,
            final_boss: false,
        }
    }
}

/// Knockback return animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    /// Seconds since the knockback began
    pub elapsed: f32,
    pub duration: f32,
    /// Where the agent stood before being knocked back
    pub origin: Vec2,
    /// Where the knockback left it
    pub displaced: Vec2,
}

impl Knockback {
    /// Cubic ease-out progress in `[0, 1]`
    fn eased_progress(&self) -> f32 {
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        1.0 - (1.0 - t).powi(3)
    }
}

/// One participant on either side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub slot: Slot,
    pub side: Side,
    pub position: Vec2,
    pub target: Vec2,
    pub speed: SpeedProfile,
    /// Transient multiplier (nearest-interceptor reaction); 1.0 otherwise
    pub speed_multiplier: f32,
    pub knockback: Option<Knockback>,
}

impl Agent {
    pub fn new(slot: Slot, side: Side, speed: SpeedProfile) -> Self {
        let home = slot.home(side);
        Self {
            slot,
            side,
            position: home,
            target: home,
            speed,
            speed_multiplier: 1.0,
            knockback: None,
        }
    }

    pub fn is_knocked_back(&self) -> bool {
        self.knockback.is_some()
    }

    /// Movement speed in court units per second
    pub fn get_speed(&self) -> f32 {
        let mut speed = movement::BASE_SPEED + self.speed.stat.max(0.0) * movement::STAT_MODIFIER;

        if self.side == Side::Defender {
            speed *= movement::DEFENDER_BOOST;
            if self.speed.final_boss {
                speed *= movement::FINAL_BOSS_BOOST;
            }
        }

        if self.slot.is_goalkeeper() {
            speed *= movement::GOALKEEPER_BOOST;
        }

        if self.speed.is_gear_second {
            speed *= movement::GEAR_SECOND_MULTIPLIER;
        } else if self.speed.is_ace {
            speed *= movement::ACE_MULTIPLIER;
        }

        speed * self.speed_multiplier
    }

    /// Advance one tick. Knocked-back agents only run the return animation.
    pub fn update(&mut self, dt: f32) {
        if let Some(kb) = self.knockback.as_mut() {
            kb.elapsed += dt;
            if kb.elapsed >= kb.duration {
                let origin = kb.origin;
                self.position = origin;
                self.target = origin;
                self.knockback = None;
            } else {
                self.position = kb.displaced.lerp(kb.origin, kb.eased_progress());
            }
            return;
        }

        let to_target = self.target - self.position;
        let dist = to_target.length();
        if dist <= movement::ARRIVE_RADIUS {
            self.position = self.target;
            return;
        }

        let step = self.get_speed() * dt;
        if step >= dist {
            self.position = self.target;
        } else {
            self.position += to_target * (step / dist);
        }
    }

    /// Steer toward `(x, y)`, clamped to the legal play area
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.target = Vec2::new(x, y).clamp_axes(court::PLAY_MIN, court::PLAY_MAX);
    }

    /// Displace the agent `distance` units along `angle_degrees` and start
    /// the eased return to where it stood.
    pub fn knockback(&mut self, angle_degrees: f32, distance: f32) {
        let origin = self.position;
        let displaced = (origin + Vec2::from_angle_degrees(angle_degrees) * distance)
            .clamp_axes(court::PLAY_MIN, court::PLAY_MAX);

        self.position = displaced;
        self.target = displaced;
        self.knockback = Some(Knockback {
            elapsed: 0.0,
            duration: knockback::DURATION,
            origin,
            displaced,
        });

        tracing::debug!(
            slot = %self.slot,
            from_x = origin.x,
            from_y = origin.y,
            to_x = displaced.x,
            to_y = displaced.y,
            "knocked back"
        );
    }

    /// Snap to the slot's home and clear transient state
    pub fn reset_position(&mut self) {
        let home = self.slot.home(self.side);
        self.position = home;
        self.target = home;
        self.knockback = None;
        self.speed_multiplier = 1.0;
    }

    /// Whether the agent lies inside its legal coordinate envelope.
    /// Goalkeepers may additionally stand behind the half line.
    pub fn within_envelope(&self) -> bool {
        let p = self.position;
        let max_y = if self.slot.is_goalkeeper() {
            court::GK_MAX_Y
        } else {
            court::MAX
        };
        p.x >= court::MIN && p.x <= court::MAX && p.y >= court::MIN && p.y <= max_y
    }
}
