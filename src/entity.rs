// Player/bot entity: movement gate, lives, upgrades, damage handling
//
// Humans and bots share this type; what differs is the control policy
// the game attaches to each slot.

use crate::board::Board;
use crate::config::Config;
use crate::powerup::PowerUpKind;
use crate::types::{Coord, Direction};

/// Result of a movement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Position updated
    Moved,
    /// The movement-rate gate has not elapsed yet
    Gated,
    /// The target cell refused the move
    Blocked,
}

/// Result of a damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Damage ignored inside the invincibility window
    Ignored,
    /// Lost a life, teleported home, now briefly invincible
    Respawned,
    /// Lives hit zero; the entity is out of the match
    Eliminated,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: usize,
    pub pos: Coord,
    pub spawn: Coord,
    pub facing: Direction,
    pub lives: u32,
    pub max_bombs: u32,
    pub active_bombs: u32,
    pub blast_range: u32,
    pub speed: u32,
    pub has_kick: bool,
    pub alive: bool,
    pub invincible_until: u64,
    pub cursed_until: u64,
    last_move_at: u64,
    // Curse resets to these, not to whatever was collected since
    base_max_bombs: u32,
    base_blast_range: u32,
}

impl Entity {
    pub fn new(id: usize, spawn: Coord, config: &Config) -> Self {
        Entity {
            id,
            pos: spawn,
            spawn,
            facing: if id == 0 { Direction::Right } else { Direction::Left },
            lives: config.rules.starting_lives,
            max_bombs: config.rules.starting_max_bombs,
            active_bombs: 0,
            blast_range: config.rules.starting_blast_range,
            speed: config.rules.starting_speed,
            has_kick: false,
            alive: true,
            invincible_until: 0,
            cursed_until: 0,
            last_move_at: 0,
            base_max_bombs: config.rules.starting_max_bombs,
            base_blast_range: config.rules.starting_blast_range,
        }
    }

    /// True while the movement-rate gate is closed: moves are spaced
    /// `base_delay / speed` milliseconds apart
    fn gate_closed(&self, now: u64, config: &Config) -> bool {
        self.last_move_at != 0
            && now.saturating_sub(self.last_move_at) < config.timing.move_delay_ms(self.speed)
    }

    /// True when the entity could act on a movement input right now
    pub fn can_move(&self, now: u64, config: &Config) -> bool {
        self.alive && !self.gate_closed(now, config)
    }

    /// Attempts one step in `dir`. Succeeds only if the rate gate allows
    /// it and the board accepts the target cell; facing updates on
    /// success (a rendering concern).
    pub fn try_move(
        &mut self,
        dir: Direction,
        board: &Board,
        now: u64,
        config: &Config,
    ) -> MoveResult {
        if !self.alive {
            return MoveResult::Blocked;
        }
        if self.gate_closed(now, config) {
            return MoveResult::Gated;
        }

        let target = dir.apply(&self.pos);
        if !board.is_valid_move(target.x, target.y) {
            return MoveResult::Blocked;
        }

        self.pos = target;
        self.facing = dir;
        self.last_move_at = now;
        MoveResult::Moved
    }

    pub fn is_invincible(&self, now: u64) -> bool {
        now < self.invincible_until
    }

    pub fn is_cursed(&self, now: u64) -> bool {
        now < self.cursed_until
    }

    /// Applies one hit. Inside the invincibility window this is a no-op;
    /// otherwise a life is lost and the entity either respawns at its
    /// fixed spawn point or is eliminated for good.
    pub fn take_damage(&mut self, now: u64, config: &Config) -> DamageOutcome {
        if !self.alive || self.is_invincible(now) {
            return DamageOutcome::Ignored;
        }

        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            self.pos = self.spawn;
            self.invincible_until = now + config.timing.invincibility_ms;
            DamageOutcome::Respawned
        } else {
            self.alive = false;
            DamageOutcome::Eliminated
        }
    }

    /// Applies a collected power-up's effect
    pub fn apply_power_up(&mut self, kind: PowerUpKind, now: u64, config: &Config) {
        match kind {
            PowerUpKind::BombCapacityUp => self.max_bombs += 1,
            PowerUpKind::BlastRangeUp => self.blast_range += 1,
            PowerUpKind::SpeedUp => {
                self.speed = (self.speed + 1).min(config.rules.max_speed);
            }
            PowerUpKind::Kick => self.has_kick = true,
            PowerUpKind::Curse => {
                // Immediate reset; expiry only clears the status flag,
                // lost upgrades must be re-collected
                self.cursed_until = now + config.timing.curse_duration_ms;
                self.max_bombs = self.base_max_bombs;
                self.blast_range = self.base_blast_range;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn empty_board(config: &Config) -> Board {
        // Generated board with density forced to zero: walls only on the
        // border and pillars
        let mut cfg = config.clone();
        cfg.board.destructible_density = 0.0;
        let mut rng = StdRng::seed_from_u64(0);
        let spawns = [Coord { x: 1, y: 1 }, Coord { x: 13, y: 11 }];
        Board::generate(15, 13, &spawns, &cfg, &mut rng).unwrap()
    }

    #[test]
    fn test_movement_gate_spacing() {
        let config = Config::default_hardcoded();
        let board = empty_board(&config);
        let mut e = Entity::new(0, Coord { x: 1, y: 1 }, &config);

        assert_eq!(e.try_move(Direction::Right, &board, 50, &config), MoveResult::Moved);
        assert_eq!(e.pos, Coord { x: 2, y: 1 });
        // 200 ms must elapse at speed 1
        assert_eq!(e.try_move(Direction::Right, &board, 150, &config), MoveResult::Gated);
        assert_eq!(e.pos, Coord { x: 2, y: 1 });
        assert_eq!(e.try_move(Direction::Right, &board, 250, &config), MoveResult::Moved);
        assert_eq!(e.pos, Coord { x: 3, y: 1 });
    }

    #[test]
    fn test_speed_up_shortens_the_gate() {
        let config = Config::default_hardcoded();
        let board = empty_board(&config);
        let mut e = Entity::new(0, Coord { x: 1, y: 1 }, &config);
        e.apply_power_up(PowerUpKind::SpeedUp, 0, &config);
        assert_eq!(e.speed, 2);

        assert_eq!(e.try_move(Direction::Right, &board, 50, &config), MoveResult::Moved);
        // 100 ms suffices at speed 2
        assert_eq!(e.try_move(Direction::Right, &board, 150, &config), MoveResult::Moved);
    }

    #[test]
    fn test_speed_is_bounded() {
        let config = Config::default_hardcoded();
        let mut e = Entity::new(0, Coord { x: 1, y: 1 }, &config);
        for _ in 0..10 {
            e.apply_power_up(PowerUpKind::SpeedUp, 0, &config);
        }
        assert_eq!(e.speed, config.rules.max_speed);
    }

    #[test]
    fn test_walls_block_movement() {
        let config = Config::default_hardcoded();
        let board = empty_board(&config);
        let mut e = Entity::new(0, Coord { x: 1, y: 1 }, &config);

        // Border wall above, pillar would be at (2,2)
        assert_eq!(e.try_move(Direction::Up, &board, 10, &config), MoveResult::Blocked);
        assert_eq!(e.pos, Coord { x: 1, y: 1 });
    }

    #[test]
    fn test_damage_respawn_and_invincibility() {
        let config = Config::default_hardcoded();
        let mut e = Entity::new(0, Coord { x: 1, y: 1 }, &config);
        e.pos = Coord { x: 5, y: 5 };

        assert_eq!(e.take_damage(1000, &config), DamageOutcome::Respawned);
        assert_eq!(e.lives, 2);
        assert_eq!(e.pos, e.spawn, "respawn teleports home");
        assert!(e.is_invincible(1000));
        assert!(e.is_invincible(2999));
        assert!(!e.is_invincible(3000));

        // A second hit inside the window never decrements lives
        assert_eq!(e.take_damage(2000, &config), DamageOutcome::Ignored);
        assert_eq!(e.lives, 2);
    }

    #[test]
    fn test_elimination_at_zero_lives() {
        let config = Config::default_hardcoded();
        let mut e = Entity::new(0, Coord { x: 1, y: 1 }, &config);

        assert_eq!(e.take_damage(1000, &config), DamageOutcome::Respawned);
        assert_eq!(e.take_damage(10_000, &config), DamageOutcome::Respawned);
        assert_eq!(e.take_damage(20_000, &config), DamageOutcome::Eliminated);
        assert!(!e.alive);
        assert_eq!(e.lives, 0);
        // Further hits on a dead entity change nothing
        assert_eq!(e.take_damage(30_000, &config), DamageOutcome::Ignored);
        assert_eq!(e.lives, 0);
    }

    #[test]
    fn test_curse_resets_upgrades_without_restoring() {
        let config = Config::default_hardcoded();
        let mut e = Entity::new(0, Coord { x: 1, y: 1 }, &config);

        e.apply_power_up(PowerUpKind::BombCapacityUp, 0, &config);
        e.apply_power_up(PowerUpKind::BombCapacityUp, 0, &config);
        e.apply_power_up(PowerUpKind::BlastRangeUp, 0, &config);
        assert_eq!(e.max_bombs, 3);
        assert_eq!(e.blast_range, config.rules.starting_blast_range + 1);

        e.apply_power_up(PowerUpKind::Curse, 5000, &config);
        assert!(e.is_cursed(5000));
        assert_eq!(e.max_bombs, config.rules.starting_max_bombs);
        assert_eq!(e.blast_range, config.rules.starting_blast_range);

        // Status clears after 10 s; the lost upgrades stay lost
        assert!(!e.is_cursed(15_000));
        assert_eq!(e.max_bombs, config.rules.starting_max_bombs);
        assert_eq!(e.blast_range, config.rules.starting_blast_range);
    }

    #[test]
    fn test_kick_flag_is_granted() {
        let config = Config::default_hardcoded();
        let mut e = Entity::new(0, Coord { x: 1, y: 1 }, &config);
        assert!(!e.has_kick);
        e.apply_power_up(PowerUpKind::Kick, 0, &config);
        assert!(e.has_kick);
    }
}
