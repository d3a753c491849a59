// Game orchestration: one discrete tick of the simulation
//
// Tick order is fixed: buffered human inputs, then bot decisions, then
// bomb advancement and blast resolution (in bomb insertion order), then
// board-level expiry, then the terminal check. The game is the only
// component that writes to more than one collaborator.

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::{Board, ExplodeResult};
use crate::bomb::Bomb;
use crate::bot::{BotController, Difficulty};
use crate::config::Config;
use crate::entity::{DamageOutcome, Entity, MoveResult};
use crate::types::{BombView, Cell, Coord, Direction, GameView, PlayerView, PowerUpView};

/// Who drives an entity slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Human,
    Bot(Difficulty),
}

/// Buffered directional input for a human-controlled slot. Directions
/// form a most-recently-pressed stack so overlapping key holds resolve
/// the way players expect.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: Vec<Direction>,
    bomb_requested: bool,
}

impl InputState {
    fn press(&mut self, dir: Direction) {
        self.held.retain(|d| *d != dir);
        self.held.push(dir);
    }

    fn release(&mut self, dir: Direction) {
        self.held.retain(|d| *d != dir);
    }

    fn current(&self) -> Option<Direction> {
        self.held.last().copied()
    }

    fn take_bomb_request(&mut self) -> bool {
        std::mem::replace(&mut self.bomb_requested, false)
    }
}

/// Control policy attached to an entity slot: humans react to buffered
/// input, bots to their decision unit. Same entity type either way.
#[derive(Debug, Clone)]
pub enum ControlPolicy {
    Human(InputState),
    Bot(BotController),
}

/// One running match: a board, two entities, the live bombs and the
/// bookkeeping around them
pub struct Game {
    config: Config,
    board: Board,
    spawns: [Coord; 2],
    entities: [Entity; 2],
    controls: [ControlPolicy; 2],
    bombs: Vec<Bomb>,
    scores: [i32; 2],
    bombs_placed: u64,
    walls_destroyed: u64,
    tick_count: u64,
    running: bool,
    rng: StdRng,
}

impl Game {
    /// Creates a match on a freshly generated board. Spawn points sit in
    /// opposite corners of the arena.
    pub fn new(
        width: i32,
        height: i32,
        modes: [ControlMode; 2],
        config: Config,
    ) -> Result<Game, String> {
        Self::with_rng(width, height, modes, config, StdRng::from_os_rng())
    }

    /// Deterministic variant for tests and headless batch runs
    pub fn with_seed(
        width: i32,
        height: i32,
        modes: [ControlMode; 2],
        config: Config,
        seed: u64,
    ) -> Result<Game, String> {
        Self::with_rng(width, height, modes, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        width: i32,
        height: i32,
        modes: [ControlMode; 2],
        config: Config,
        mut rng: StdRng,
    ) -> Result<Game, String> {
        let spawns = [
            Coord { x: 1, y: 1 },
            Coord { x: width - 2, y: height - 2 },
        ];
        let board = Board::generate(width, height, &spawns, &config, &mut rng)?;

        let entities = [
            Entity::new(0, spawns[0], &config),
            Entity::new(1, spawns[1], &config),
        ];
        let controls = [Self::policy_for(modes[0]), Self::policy_for(modes[1])];

        info!(
            "New {}x{} match: player 1 {:?}, player 2 {:?}",
            width, height, modes[0], modes[1]
        );

        Ok(Game {
            config,
            board,
            spawns,
            entities,
            controls,
            bombs: Vec::new(),
            scores: [0; 2],
            bombs_placed: 0,
            walls_destroyed: 0,
            tick_count: 0,
            running: true,
            rng,
        })
    }

    fn policy_for(mode: ControlMode) -> ControlPolicy {
        match mode {
            ControlMode::Human => ControlPolicy::Human(InputState::default()),
            ControlMode::Bot(difficulty) => ControlPolicy::Bot(BotController::new(difficulty)),
        }
    }

    /// Replaces the board with a level loaded from the external text
    /// format and restarts the match on it. On a parse error the current
    /// match is left untouched.
    pub fn load_level(&mut self, text: &str) -> Result<(), String> {
        let (board, spawns) = Board::parse_level(text)?;

        self.board = board;
        self.spawns = spawns;
        self.bombs.clear();
        for (id, entity) in self.entities.iter_mut().enumerate() {
            *entity = Entity::new(id, spawns[id], &self.config);
        }
        for control in self.controls.iter_mut() {
            *control = match control {
                ControlPolicy::Human(_) => ControlPolicy::Human(InputState::default()),
                ControlPolicy::Bot(bot) => ControlPolicy::Bot(BotController::new(bot.difficulty())),
            };
        }
        self.scores = [0; 2];
        self.bombs_placed = 0;
        self.walls_destroyed = 0;
        self.tick_count = 0;
        self.running = true;

        info!("Loaded {}x{} level", self.board.width, self.board.height);
        Ok(())
    }

    /// Serializes the current terrain back into the level text format
    pub fn save_level(&self) -> String {
        self.board.encode_level(&self.spawns)
    }

    /// Records a press or release of a directional control. Ignored for
    /// bot-driven slots.
    pub fn handle_directional_input(&mut self, entity_id: usize, dir: Direction, pressed: bool) {
        if let Some(ControlPolicy::Human(input)) = self.controls.get_mut(entity_id) {
            if pressed {
                input.press(dir);
            } else {
                input.release(dir);
            }
        }
    }

    /// Requests a bomb drop on the next tick. Ignored for bot slots.
    pub fn handle_bomb_request(&mut self, entity_id: usize) {
        if let Some(ControlPolicy::Human(input)) = self.controls.get_mut(entity_id) {
            input.bomb_requested = true;
        }
    }

    /// Advances the simulation by one tick at timestamp `now` (ms)
    pub fn update(&mut self, now: u64) {
        if !self.running {
            return;
        }
        self.tick_count += 1;

        self.apply_human_inputs(now);
        self.apply_bot_decisions(now);
        self.advance_bombs(now);
        self.board.expire(now, &self.config);
        self.evaluate_terminal();
    }

    fn apply_human_inputs(&mut self, now: u64) {
        for id in 0..self.entities.len() {
            let (dir, bomb) = match self.controls.get_mut(id) {
                Some(ControlPolicy::Human(input)) => (input.current(), input.take_bomb_request()),
                _ => continue,
            };
            if !self.entities[id].alive {
                continue;
            }
            if bomb {
                self.try_place_bomb(id, now);
            }
            if let Some(dir) = dir {
                self.apply_move(id, dir, now);
            }
        }
    }

    fn apply_bot_decisions(&mut self, now: u64) {
        for id in 0..self.entities.len() {
            if !self.entities[id].alive {
                continue;
            }
            let action = match &mut self.controls[id] {
                ControlPolicy::Bot(bot) => bot.decide(
                    self.tick_count,
                    &self.board,
                    &self.entities[id],
                    &self.entities[1 - id],
                    &self.config,
                    &mut self.rng,
                ),
                _ => continue,
            };

            if action.drop_bomb && self.try_place_bomb(id, now) {
                if let ControlPolicy::Bot(bot) = &mut self.controls[id] {
                    bot.note_bomb_placed(self.tick_count);
                }
            }
            if let Some(dir) = action.heading {
                if self.apply_move(id, dir, now) == MoveResult::Blocked {
                    if let ControlPolicy::Bot(bot) = &mut self.controls[id] {
                        bot.force_reconsider(
                            &self.board,
                            &self.entities[id],
                            &self.entities[1 - id],
                            &self.config,
                            &mut self.rng,
                        );
                    }
                }
            }
        }
    }

    /// Attempts a bomb placement at the entity's current cell. Capacity
    /// and cell-occupancy violations are silently rejected: both are
    /// expected, frequent conditions.
    fn try_place_bomb(&mut self, id: usize, now: u64) -> bool {
        let entity = &self.entities[id];
        if !entity.alive || entity.active_bombs >= entity.max_bombs {
            return false;
        }
        let pos = entity.pos;
        let range = entity.blast_range;

        if !self.board.place_bomb(pos.x, pos.y, id) {
            return false;
        }
        self.bombs.push(Bomb::new(id, pos, range, now));
        self.entities[id].active_bombs += 1;
        self.bombs_placed += 1;
        info!(
            "Player {} armed a bomb at ({},{}) range {}",
            id, pos.x, pos.y, range
        );
        true
    }

    /// Executes one movement attempt for an entity, including kick
    /// handling, power-up pickup and lingering-fire damage on arrival
    fn apply_move(&mut self, id: usize, dir: Direction, now: u64) -> MoveResult {
        let target = dir.apply(&self.entities[id].pos);

        if self.entities[id].has_kick
            && self.entities[id].can_move(now, &self.config)
            && matches!(self.board.cell(target.x, target.y), Some(Cell::Bomb { .. }))
        {
            self.try_kick(target, dir);
        }

        let result = self.entities[id].try_move(dir, &self.board, now, &self.config);
        if result == MoveResult::Moved {
            self.resolve_arrival(id, now);
        }
        result
    }

    /// Shoves the bomb at `bomb_pos` one cell onward. The push only
    /// lands on an in-bounds empty cell with nobody standing on it.
    fn try_kick(&mut self, bomb_pos: Coord, dir: Direction) -> bool {
        let beyond = dir.apply(&bomb_pos);
        if !matches!(self.board.cell(beyond.x, beyond.y), Some(Cell::Empty)) {
            return false;
        }
        if self.entities.iter().any(|e| e.alive && e.pos == beyond) {
            return false;
        }
        let bomb = match self
            .bombs
            .iter_mut()
            .find(|b| !b.exploded && b.pos == bomb_pos)
        {
            Some(b) => b,
            None => return false,
        };

        bomb.pos = beyond;
        let owner = bomb.owner;
        self.board.remove_bomb(bomb_pos.x, bomb_pos.y);
        self.board.place_bomb(beyond.x, beyond.y, owner);
        true
    }

    fn resolve_arrival(&mut self, id: usize, now: u64) {
        let pos = self.entities[id].pos;

        if let Some(kind) = self.board.collect_power_up(pos.x, pos.y) {
            info!("Player {} collected {:?}", id, kind);
            self.entities[id].apply_power_up(kind, now, &self.config);
            self.scores[id] += self.config.rules.score_power_up;
        }

        // Explosion cells are walkable but damaging
        if matches!(self.board.cell(pos.x, pos.y), Some(Cell::Explosion { .. })) {
            self.damage_entity(id, now);
        }
    }

    /// Flips expired fuses, resolves their blasts in insertion order,
    /// then drops resolved bombs and frees the owners' capacity slots
    fn advance_bombs(&mut self, now: u64) {
        let fuse = self.config.timing.bomb_fuse_ms;
        for i in 0..self.bombs.len() {
            if !self.bombs[i].exploded && self.bombs[i].fuse_elapsed(now, fuse) {
                self.bombs[i].exploded = true;
                self.resolve_blast(i, now);
            }
        }

        let mut live = Vec::with_capacity(self.bombs.len());
        for bomb in std::mem::take(&mut self.bombs) {
            if bomb.exploded {
                self.entities[bomb.owner].active_bombs =
                    self.entities[bomb.owner].active_bombs.saturating_sub(1);
            } else {
                live.push(bomb);
            }
        }
        self.bombs = live;
    }

    /// Resolves one bomb's blast: center first, then each cardinal ray
    /// walks outward until blocked or absorbed. Damage is applied once
    /// per bomb after all four rays, never per propagated cell. The
    /// whole resolution is atomic within this tick.
    fn resolve_blast(&mut self, bomb_idx: usize, now: u64) {
        let owner = self.bombs[bomb_idx].owner;
        let center = self.bombs[bomb_idx].pos;
        let range = self.bombs[bomb_idx].range as i32;
        info!(
            "Bomb at ({},{}) detonating (owner {}, range {})",
            center.x, center.y, owner, range
        );

        let mut walls_destroyed = 0i32;
        self.board
            .explode(center.x, center.y, now, &self.config, &mut self.rng);

        for dir in Direction::all() {
            let (dx, dy) = dir.delta();
            for step in 1..=range {
                let x = center.x + dx * step;
                let y = center.y + dy * step;
                match self.board.explode(x, y, now, &self.config, &mut self.rng) {
                    ExplodeResult::Blocked => break,
                    ExplodeResult::WallDestroyed { .. } => {
                        // A destructible wall absorbs the hit; the ray
                        // stops here this tick
                        walls_destroyed += 1;
                        break;
                    }
                    ExplodeResult::Cleared => {}
                }
            }
        }

        if walls_destroyed > 0 {
            self.walls_destroyed += walls_destroyed as u64;
            self.scores[owner] += walls_destroyed * self.config.rules.score_wall_destroyed;
        }

        for id in 0..self.entities.len() {
            let pos = self.entities[id].pos;
            if matches!(self.board.cell(pos.x, pos.y), Some(Cell::Explosion { .. })) {
                self.damage_entity(id, now);
            }
        }
    }

    fn damage_entity(&mut self, id: usize, now: u64) {
        match self.entities[id].take_damage(now, &self.config) {
            DamageOutcome::Eliminated => {
                info!("Player {} eliminated", id);
                self.scores[1 - id] += self.config.rules.score_kill;
            }
            DamageOutcome::Respawned => {
                info!(
                    "Player {} hit, {} lives left, respawned",
                    id, self.entities[id].lives
                );
            }
            DamageOutcome::Ignored => {}
        }
    }

    fn evaluate_terminal(&mut self) {
        if self.running && self.entities.iter().any(|e| !e.alive) {
            self.running = false;
            info!(
                "Match over after {} ticks. Scores: {} - {}",
                self.tick_count, self.scores[0], self.scores[1]
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Winning entity id once the match has ended; None while running or
    /// on a draw (both eliminated in the same tick)
    pub fn winner(&self) -> Option<usize> {
        if self.running {
            return None;
        }
        match (self.entities[0].alive, self.entities[1].alive) {
            (true, false) => Some(0),
            (false, true) => Some(1),
            _ => None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn entity(&self, id: usize) -> &Entity {
        &self.entities[id]
    }

    pub fn scores(&self) -> &[i32; 2] {
        &self.scores
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Read-only snapshot for renderers and remote drivers
    pub fn snapshot(&self, now: u64) -> GameView {
        let timing = &self.config.timing;
        GameView {
            width: self.board.width,
            height: self.board.height,
            cells: self.board.cell_code_rows(),
            bombs: self
                .bombs
                .iter()
                .filter(|b| !b.exploded)
                .map(|b| BombView {
                    x: b.pos.x,
                    y: b.pos.y,
                    owner: b.owner,
                    remaining_fuse_ms: b.remaining_fuse_ms(now, timing.bomb_fuse_ms),
                })
                .collect(),
            power_ups: self
                .board
                .power_ups()
                .iter()
                .map(|p| PowerUpView {
                    x: p.pos.x,
                    y: p.pos.y,
                    kind: p.kind,
                    expires_in_ms: p.remaining_ms(now, timing.power_up_expiry_ms),
                    blinking: p.is_blinking(
                        now,
                        timing.power_up_expiry_ms,
                        timing.power_up_blink_ms,
                    ),
                })
                .collect(),
            players: self
                .entities
                .iter()
                .map(|e| PlayerView {
                    x: e.pos.x,
                    y: e.pos.y,
                    lives: e.lives,
                    active_bombs: e.active_bombs,
                    max_bombs: e.max_bombs,
                    blast_range: e.blast_range,
                    speed: e.speed,
                    facing: e.facing.as_str().to_string(),
                    alive: e.alive,
                    invincible: e.is_invincible(now),
                    cursed: e.is_cursed(now),
                    has_kick: e.has_kick,
                })
                .collect(),
            scores: self.scores.to_vec(),
            bombs_placed: self.bombs_placed,
            walls_destroyed: self.walls_destroyed,
            tick: self.tick_count,
            running: self.running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powerup::PowerUpKind;

    fn open_config() -> Config {
        let mut config = Config::default_hardcoded();
        config.board.destructible_density = 0.0;
        config
    }

    fn human_game(config: Config) -> Game {
        Game::with_seed(
            15,
            13,
            [ControlMode::Human, ControlMode::Human],
            config,
            42,
        )
        .unwrap()
    }

    #[test]
    fn test_bomb_capacity_is_enforced() {
        let mut game = human_game(open_config());

        game.handle_bomb_request(0);
        game.update(10);
        assert_eq!(game.entity(0).active_bombs, 1);
        assert_eq!(game.bombs.len(), 1);

        // Step off the bomb, then ask again at a different cell
        game.handle_directional_input(0, Direction::Right, true);
        game.update(300);
        game.handle_directional_input(0, Direction::Right, false);
        assert_eq!(game.entity(0).pos, Coord { x: 2, y: 1 });

        game.handle_bomb_request(0);
        game.update(600);
        assert_eq!(game.entity(0).active_bombs, 1, "second request rejected");
        assert_eq!(game.bombs.len(), 1);
    }

    #[test]
    fn test_capacity_slot_frees_after_detonation() {
        let mut game = human_game(open_config());

        game.handle_bomb_request(0);
        game.update(10);
        assert_eq!(game.entity(0).active_bombs, 1);

        // Walk clear of the range-2 blast before the fuse runs out
        for (dir, at) in [
            (Direction::Right, 300),
            (Direction::Right, 600),
            (Direction::Down, 900),
            (Direction::Down, 1200),
        ] {
            game.handle_directional_input(0, dir, true);
            game.update(at);
            game.handle_directional_input(0, dir, false);
        }
        assert_eq!(game.entity(0).pos, Coord { x: 3, y: 3 });

        game.update(3100);
        assert_eq!(game.bombs.len(), 0, "resolved bomb leaves the live set");
        assert_eq!(game.entity(0).active_bombs, 0);
        assert_eq!(game.entity(0).lives, 3, "player escaped the blast");

        game.handle_bomb_request(0);
        game.update(3200);
        assert_eq!(game.entity(0).active_bombs, 1, "slot is reusable");
    }

    #[test]
    fn test_placement_on_occupied_cell_is_rejected() {
        let mut config = open_config();
        config.rules.starting_max_bombs = 2;
        let mut game = human_game(config);

        game.handle_bomb_request(0);
        game.update(10);
        // Still standing on the bomb cell; a second drop there is refused
        game.handle_bomb_request(0);
        game.update(20);
        assert_eq!(game.bombs.len(), 1);
        assert_eq!(game.entity(0).active_bombs, 1);
    }

    #[test]
    fn test_kick_pushes_bomb_and_mover_follows() {
        let mut game = human_game(open_config());
        let config = game.config.clone();
        game.entities[0].apply_power_up(PowerUpKind::Kick, 0, &config);

        // Walk to (3,1), drop a bomb, step right off it
        game.handle_directional_input(0, Direction::Right, true);
        game.update(200);
        game.update(400);
        game.handle_directional_input(0, Direction::Right, false);
        assert_eq!(game.entity(0).pos, Coord { x: 3, y: 1 });

        game.handle_bomb_request(0);
        game.update(600);
        game.handle_directional_input(0, Direction::Right, true);
        game.update(800);
        game.handle_directional_input(0, Direction::Right, false);
        assert_eq!(game.entity(0).pos, Coord { x: 4, y: 1 });

        // Turn back into the bomb: it slides to (2,1), we take (3,1)
        game.handle_directional_input(0, Direction::Left, true);
        game.update(1000);
        game.handle_directional_input(0, Direction::Left, false);

        assert_eq!(game.entity(0).pos, Coord { x: 3, y: 1 });
        assert_eq!(game.board.cell(2, 1), Some(Cell::Bomb { owner: 0 }));
        assert_eq!(game.bombs[0].pos, Coord { x: 2, y: 1 });
    }

    #[test]
    fn test_move_into_bomb_without_kick_is_blocked() {
        let mut game = human_game(open_config());

        game.handle_bomb_request(0);
        game.update(10);
        game.handle_directional_input(0, Direction::Right, true);
        game.update(300);
        game.handle_directional_input(0, Direction::Right, false);
        assert_eq!(game.entity(0).pos, Coord { x: 2, y: 1 });

        game.handle_directional_input(0, Direction::Left, true);
        game.update(600);
        game.handle_directional_input(0, Direction::Left, false);
        assert_eq!(game.entity(0).pos, Coord { x: 2, y: 1 }, "bomb blocks the way back");
    }

    #[test]
    fn test_match_ends_when_an_entity_dies() {
        let mut config = open_config();
        config.rules.starting_lives = 1;
        let mut game = human_game(config);

        // Player 1 sits on its own bomb with one life
        game.handle_bomb_request(0);
        game.update(10);
        game.update(3100);

        assert!(!game.is_running());
        assert!(!game.entity(0).alive);
        assert_eq!(game.winner(), Some(1));
        assert_eq!(game.scores()[1], 50, "opponent earns the kill bonus");

        // Further updates are no-ops once the match is over
        let tick = game.tick_count();
        game.update(4000);
        assert_eq!(game.tick_count(), tick);
    }

    #[test]
    fn test_update_order_is_stable_for_simultaneous_fuses() {
        let mut config = open_config();
        config.rules.starting_max_bombs = 3;
        let mut game = human_game(config);

        // Three bombs armed on consecutive ticks, all expired by the
        // same update: resolution happens in insertion order without
        // panicking or double-freeing capacity slots
        for at in [10, 210, 410] {
            game.handle_bomb_request(0);
            game.handle_directional_input(0, Direction::Right, true);
            game.update(at);
            game.handle_directional_input(0, Direction::Right, false);
        }
        assert_eq!(game.entity(0).active_bombs, 3);

        game.update(5000);
        assert_eq!(game.entity(0).active_bombs, 0);
        assert_eq!(game.bombs.len(), 0);
    }
}
