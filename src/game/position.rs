//! Court slots and their fixed home coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::util::vec2::Vec2;

/// One of the seven fixed roles. Each side fields exactly one agent per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "LW")]
    LeftWing,
    #[serde(rename = "RW")]
    RightWing,
    #[serde(rename = "CB")]
    CenterBack,
    #[serde(rename = "LB")]
    LeftBack,
    #[serde(rename = "RB")]
    RightBack,
    #[serde(rename = "P", alias = "PV")]
    Pivot,
    #[serde(rename = "GK")]
    Goalkeeper,
}

impl Slot {
    /// Roster order; roster indices (ace lists etc.) refer to this order.
    pub const ALL: [Slot; 7] = [
        Slot::LeftWing,
        Slot::RightWing,
        Slot::CenterBack,
        Slot::LeftBack,
        Slot::RightBack,
        Slot::Pivot,
        Slot::Goalkeeper,
    ];

    /// Every slot except the goalkeeper.
    pub const FIELD: [Slot; 6] = [
        Slot::LeftWing,
        Slot::RightWing,
        Slot::CenterBack,
        Slot::LeftBack,
        Slot::RightBack,
        Slot::Pivot,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Slot> {
        Self::ALL.get(index).copied()
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Slot::LeftWing => "LW",
            Slot::RightWing => "RW",
            Slot::CenterBack => "CB",
            Slot::LeftBack => "LB",
            Slot::RightBack => "RB",
            Slot::Pivot => "P",
            Slot::Goalkeeper => "GK",
        }
    }

    pub fn is_goalkeeper(self) -> bool {
        self == Slot::Goalkeeper
    }

    /// Home coordinates for this slot on the given side.
    ///
    /// The attacking goalkeeper sits off-court behind the half line; the
    /// defending 6-0 formation guards the goal at y = 0.
    pub fn home(self, side: Side) -> Vec2 {
        match side {
            Side::Attacker => match self {
                Slot::LeftWing => Vec2::new(5.0, 10.0),
                Slot::RightWing => Vec2::new(95.0, 10.0),
                Slot::CenterBack => Vec2::new(49.5, 70.0),
                Slot::LeftBack => Vec2::new(8.75, 50.0),
                Slot::RightBack => Vec2::new(91.25, 50.0),
                Slot::Pivot => Vec2::new(62.5, 32.5),
                Slot::Goalkeeper => Vec2::new(50.0, 105.0),
            },
            Side::Defender => match self {
                Slot::LeftWing => Vec2::new(13.0, 15.0),
                Slot::RightWing => Vec2::new(87.0, 15.0),
                Slot::CenterBack => Vec2::new(49.0, 50.0),
                Slot::LeftBack => Vec2::new(25.0, 31.25),
                Slot::RightBack => Vec2::new(52.5, 32.5),
                Slot::Pivot => Vec2::new(70.0, 30.0),
                Slot::Goalkeeper => Vec2::new(50.0, 5.0),
            },
        }
    }

    /// Attacker a defender marks in man-to-man (mirror pairing)
    pub fn man_to_man_mark(self) -> Option<Slot> {
        match self {
            Slot::LeftWing => Some(Slot::RightWing),
            Slot::RightWing => Some(Slot::LeftWing),
            Slot::CenterBack => Some(Slot::CenterBack),
            Slot::LeftBack => Some(Slot::RightBack),
            Slot::RightBack => Some(Slot::LeftBack),
            Slot::Pivot => Some(Slot::Pivot),
            Slot::Goalkeeper => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LW" => Ok(Slot::LeftWing),
            "RW" => Ok(Slot::RightWing),
            "CB" => Ok(Slot::CenterBack),
            "LB" => Ok(Slot::LeftBack),
            "RB" => Ok(Slot::RightBack),
            "P" | "PV" => Ok(Slot::Pivot),
            "GK" => Ok(Slot::Goalkeeper),
            other => Err(format!("unknown slot '{}'", other)),
        }
    }
}

/// Which team an agent plays for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Attacker,
    Defender,
}

/// Per-slot storage indexed by [`Slot::index`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotMap<T> {
    items: [T; 7],
}

impl<T> SlotMap<T> {
    pub fn from_fn(mut f: impl FnMut(Slot) -> T) -> Self {
        Self {
            items: Slot::ALL.map(|slot| f(slot)),
        }
    }

    pub fn get(&self, slot: Slot) -> &T {
        &self.items[slot.index()]
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut T {
        &mut self.items[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> {
        Slot::ALL.iter().copied().zip(self.items.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Slot, &mut T)> {
        Slot::ALL.iter().copied().zip(self.items.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}
