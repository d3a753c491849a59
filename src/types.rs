// Core grid types and driver-facing snapshot views
//
// The simulation mutates `Cell` values in place; renderers and other
// drivers only ever see the serializable view structs at the bottom.

use serde::{Deserialize, Serialize};

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

/// Represents the four possible movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns all possible directions
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Converts direction to string representation for API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parses a direction from its string representation
    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }

    /// Unit offset of this direction. Row 0 is the top of the board,
    /// so `Up` decreases y.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        let (dx, dy) = self.delta();
        Coord { x: coord.x + dx, y: coord.y + dy }
    }
}

/// One board cell. Explosion cells carry the timestamp they were created,
/// bomb cells carry their owner, so no parallel bookkeeping arrays exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
    DestructibleWall,
    Bomb { owner: usize },
    Explosion { since: u64 },
}

impl Cell {
    /// Numeric cell code shared by the level text format and snapshots:
    /// 0 empty, 1 wall, 2 destructible wall, 3 bomb, 4 explosion.
    pub fn code(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Wall => 1,
            Cell::DestructibleWall => 2,
            Cell::Bomb { .. } => 3,
            Cell::Explosion { .. } => 4,
        }
    }
}

/// Read-only view of one live bomb
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BombView {
    pub x: i32,
    pub y: i32,
    pub owner: usize,
    pub remaining_fuse_ms: u64,
}

/// Read-only view of one live power-up
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PowerUpView {
    pub x: i32,
    pub y: i32,
    pub kind: crate::powerup::PowerUpKind,
    pub expires_in_ms: u64,
    pub blinking: bool,
}

/// Read-only view of one entity
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub lives: u32,
    pub active_bombs: u32,
    pub max_bombs: u32,
    pub blast_range: u32,
    pub speed: u32,
    pub facing: String,
    pub alive: bool,
    pub invincible: bool,
    pub cursed: bool,
    pub has_kick: bool,
}

/// Complete read-only snapshot of a running match, taken once per driver
/// request. Cell kinds are row-major rows of numeric codes.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GameView {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<Vec<u8>>,
    pub bombs: Vec<BombView>,
    pub power_ups: Vec<PowerUpView>,
    pub players: Vec<PlayerView>,
    pub scores: Vec<i32>,
    pub bombs_placed: u64,
    pub walls_destroyed: u64,
    pub tick: u64,
    pub running: bool,
}
