// Power-up kinds and lifecycle
//
// Power-ups spawn from destroyed destructible walls, sit on the board
// until collected, and silently expire if nobody picks them up in time.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::LootConfig;
use crate::types::Coord;

/// The five collectible kinds. Curse is the only negative one.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    BombCapacityUp,
    BlastRangeUp,
    SpeedUp,
    Kick,
    Curse,
}

impl PowerUpKind {
    /// Draws a kind from the weighted table: a uniform roll in
    /// [0, total) walked through cumulative thresholds.
    pub fn roll<R: Rng>(rng: &mut R, loot: &LootConfig) -> PowerUpKind {
        let draw = rng.random_range(0..loot.total_weight());
        let mut threshold = loot.weight_bomb_capacity;
        if draw < threshold {
            return PowerUpKind::BombCapacityUp;
        }
        threshold += loot.weight_blast_range;
        if draw < threshold {
            return PowerUpKind::BlastRangeUp;
        }
        threshold += loot.weight_speed;
        if draw < threshold {
            return PowerUpKind::SpeedUp;
        }
        threshold += loot.weight_kick;
        if draw < threshold {
            return PowerUpKind::Kick;
        }
        PowerUpKind::Curse
    }
}

/// A live power-up on the board
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub pos: Coord,
    pub kind: PowerUpKind,
    pub spawned_at: u64,
    pub collected: bool,
}

impl PowerUp {
    pub fn new(pos: Coord, kind: PowerUpKind, now: u64) -> Self {
        PowerUp {
            pos,
            kind,
            spawned_at: now,
            collected: false,
        }
    }

    /// Milliseconds until this power-up expires, saturating at zero
    pub fn remaining_ms(&self, now: u64, expiry_ms: u64) -> u64 {
        (self.spawned_at + expiry_ms).saturating_sub(now)
    }

    /// True once the uncollected power-up has outlived its deadline
    pub fn is_expired(&self, now: u64, expiry_ms: u64) -> bool {
        !self.collected && self.remaining_ms(now, expiry_ms) == 0
    }

    /// True in the final warning window before expiry. Renderers use this
    /// to blink the sprite; the core only exposes the deadline.
    pub fn is_blinking(&self, now: u64, expiry_ms: u64, blink_ms: u64) -> bool {
        let remaining = self.remaining_ms(now, expiry_ms);
        remaining > 0 && remaining <= blink_ms
    }
}
