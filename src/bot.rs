// Bot decision unit
//
// A difficulty-parameterized policy that picks a heading and a bomb
// intent for one entity slot. The unit only reads board and entity
// state; the game orchestrator executes the chosen move and placement
// through the same paths a human input would take.

use rand::Rng;

use crate::board::Board;
use crate::config::Config;
use crate::entity::Entity;
use crate::types::{Coord, Direction};

/// Difficulty tier 1-3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Maps the numeric tier used by drivers onto a difficulty
    pub fn from_tier(tier: u8) -> Result<Difficulty, String> {
        match tier {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(format!("Unknown bot difficulty tier: {}", other)),
        }
    }

    pub fn tier(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

/// What the bot wants to do this tick
#[derive(Debug, Clone, Copy)]
pub struct BotAction {
    /// None means hold still
    pub heading: Option<Direction>,
    pub drop_bomb: bool,
}

/// Per-slot decision state. Reconsiders its heading every N ticks and
/// carries a pending bomb intent until the cooldown lets it through.
#[derive(Debug, Clone)]
pub struct BotController {
    difficulty: Difficulty,
    heading: Option<Direction>,
    move_count: u64,
    wants_bomb: bool,
    last_bomb_tick: Option<u64>,
}

impl BotController {
    pub fn new(difficulty: Difficulty) -> Self {
        BotController {
            difficulty,
            heading: Some(Direction::Left),
            move_count: 0,
            wants_bomb: false,
            last_bomb_tick: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Advances the decision state by one tick and returns the intended
    /// action. The heading is only re-rolled at the reconsideration
    /// interval; bomb intent is released as soon as the cooldown allows.
    pub fn decide<R: Rng>(
        &mut self,
        tick: u64,
        board: &Board,
        me: &Entity,
        opponent: &Entity,
        config: &Config,
        rng: &mut R,
    ) -> BotAction {
        self.move_count += 1;
        if self.move_count % config.bot.reconsider_interval_ticks == 0 {
            self.reconsider(board, me, opponent, config, rng);
        }

        BotAction {
            heading: self.heading,
            drop_bomb: self.wants_bomb && self.bomb_ready(tick, config),
        }
    }

    /// Called by the orchestrator when the chosen move hit an obstacle
    pub fn force_reconsider<R: Rng>(
        &mut self,
        board: &Board,
        me: &Entity,
        opponent: &Entity,
        config: &Config,
        rng: &mut R,
    ) {
        self.reconsider(board, me, opponent, config, rng);
    }

    /// Clears the pending intent and starts the cooldown
    pub fn note_bomb_placed(&mut self, tick: u64) {
        self.wants_bomb = false;
        self.last_bomb_tick = Some(tick);
    }

    fn bomb_ready(&self, tick: u64, config: &Config) -> bool {
        match self.last_bomb_tick {
            None => true,
            Some(t) => tick.saturating_sub(t) >= config.bot.bomb_cooldown_ticks,
        }
    }

    fn reconsider<R: Rng>(
        &mut self,
        board: &Board,
        me: &Entity,
        opponent: &Entity,
        config: &Config,
        rng: &mut R,
    ) {
        match self.difficulty {
            Difficulty::Easy => {
                self.heading = if rng.random_bool(config.bot.hold_still_chance) {
                    None
                } else {
                    Some(random_direction(rng))
                };
                if rng.random_bool(config.bot.easy_bomb_chance) {
                    self.wants_bomb = true;
                }
            }
            Difficulty::Medium => {
                self.heading = if rng.random_bool(config.bot.medium_random_ratio) {
                    Some(random_direction(rng))
                } else {
                    Some(chase_direction(&me.pos, &opponent.pos))
                };
                if rng.random_bool(config.bot.medium_bomb_chance) {
                    self.wants_bomb = true;
                }
            }
            Difficulty::Hard => {
                self.heading = Some(chase_direction(&me.pos, &opponent.pos));
                if walled_neighbors(board, &me.pos) >= config.bot.trapped_neighbor_threshold {
                    // Boxed in: bomb out an escape route regardless of
                    // where the opponent is
                    self.wants_bomb = true;
                } else if manhattan_distance(&me.pos, &opponent.pos)
                    <= config.bot.hard_close_distance
                    && rng.random_bool(config.bot.hard_bomb_chance)
                {
                    self.wants_bomb = true;
                }
            }
        }
    }
}

/// Picks the direction that closes the larger axis gap to the target
fn chase_direction(from: &Coord, to: &Coord) -> Direction {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() >= dy.abs() {
        if dx >= 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy >= 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// Counts how many of the four cardinal neighbors are walls of either
/// kind (the trap heuristic input)
fn walled_neighbors(board: &Board, pos: &Coord) -> usize {
    Direction::all()
        .iter()
        .filter(|dir| {
            let n = dir.apply(pos);
            board.is_wall(n.x, n.y) || board.is_destructible_wall(n.x, n.y)
        })
        .count()
}

/// Calculates Manhattan distance between two coordinates
fn manhattan_distance(a: &Coord, b: &Coord) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

fn random_direction<R: Rng>(rng: &mut R) -> Direction {
    Direction::all()[rng.random_range(0..4)]
}
