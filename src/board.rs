// Board state machine: cell grid, live power-ups, generation and the
// level text codec
//
// The board exposes query/mutate primitives only; walking blast rays and
// deciding who takes damage is the game orchestrator's job.

use rand::Rng;

use crate::config::Config;
use crate::powerup::{PowerUp, PowerUpKind};
use crate::types::{Cell, Coord};

/// Outcome of detonating a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplodeResult {
    /// The cell is an indestructible wall; nothing happened
    Blocked,
    /// The cell was detonated and the blast may continue past it
    Cleared,
    /// A destructible wall absorbed the hit; the blast stops here
    WallDestroyed { spawned_loot: bool },
}

/// W x H grid of cells plus the set of live power-ups
#[derive(Debug, Clone)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    cells: Vec<Cell>,
    power_ups: Vec<PowerUp>,
}

impl Board {
    /// Generates a fresh arena: walled border, fixed pillar at every
    /// (even, even) interior cell, destructible walls rolled at the
    /// configured density everywhere except a clearance zone around each
    /// spawn point.
    pub fn generate<R: Rng>(
        width: i32,
        height: i32,
        spawns: &[Coord],
        config: &Config,
        rng: &mut R,
    ) -> Result<Board, String> {
        if width < config.board.min_dimension
            || width > config.board.max_dimension
            || height < config.board.min_dimension
            || height > config.board.max_dimension
        {
            return Err(format!(
                "Board dimensions {}x{} outside supported range {}..={}",
                width, height, config.board.min_dimension, config.board.max_dimension
            ));
        }
        if width % 2 == 0 || height % 2 == 0 {
            return Err(format!(
                "Board dimensions must be odd, got {}x{}",
                width, height
            ));
        }

        let mut cells = vec![Cell::Empty; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let cell = if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    Cell::Wall
                } else if x % 2 == 0 && y % 2 == 0 {
                    Cell::Wall
                } else if spawns
                    .iter()
                    .any(|s| (s.x - x).abs() + (s.y - y).abs() <= config.board.spawn_clearance)
                {
                    Cell::Empty
                } else if rng.random_bool(config.board.destructible_density) {
                    Cell::DestructibleWall
                } else {
                    Cell::Empty
                };
                cells[(y * width + x) as usize] = cell;
            }
        }

        Ok(Board {
            width,
            height,
            cells,
            power_ups: Vec::new(),
        })
    }

    fn idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Cell at (x, y), or None out of bounds
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }

    /// True iff an entity may occupy (x, y): in-bounds and the cell is
    /// empty or burning (explosion cells are walkable but damaging)
    pub fn is_valid_move(&self, x: i32, y: i32) -> bool {
        matches!(
            self.cell(x, y),
            Some(Cell::Empty) | Some(Cell::Explosion { .. })
        )
    }

    /// True iff a blast ray may enter (x, y): in-bounds and not an
    /// indestructible wall. A destructible wall still absorbs the hit,
    /// but the hit itself is legal.
    pub fn can_propagate_into(&self, x: i32, y: i32) -> bool {
        match self.cell(x, y) {
            None | Some(Cell::Wall) => false,
            _ => true,
        }
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        matches!(self.cell(x, y), Some(Cell::Wall))
    }

    pub fn is_destructible_wall(&self, x: i32, y: i32) -> bool {
        matches!(self.cell(x, y), Some(Cell::DestructibleWall))
    }

    /// Marks (x, y) as holding a bomb. Returns false if the cell cannot
    /// take one (occupied, walled, or out of bounds).
    pub fn place_bomb(&mut self, x: i32, y: i32, owner: usize) -> bool {
        match self.cell(x, y) {
            Some(Cell::Empty) | Some(Cell::Explosion { .. }) => {
                let i = self.idx(x, y);
                self.cells[i] = Cell::Bomb { owner };
                true
            }
            _ => false,
        }
    }

    /// Vacates a bomb cell. No-op unless the cell currently holds a bomb;
    /// a bomb cell overwritten by another blast has nothing left to clear.
    pub fn remove_bomb(&mut self, x: i32, y: i32) {
        if matches!(self.cell(x, y), Some(Cell::Bomb { .. })) {
            let i = self.idx(x, y);
            self.cells[i] = Cell::Empty;
        }
    }

    /// Detonates a single cell. Destructible walls are destroyed and may
    /// spawn one weighted power-up; indestructible walls are untouched.
    /// Every detonated cell becomes an explosion stamped with `now`.
    pub fn explode<R: Rng>(
        &mut self,
        x: i32,
        y: i32,
        now: u64,
        config: &Config,
        rng: &mut R,
    ) -> ExplodeResult {
        let cell = match self.cell(x, y) {
            None | Some(Cell::Wall) => return ExplodeResult::Blocked,
            Some(c) => c,
        };

        let i = self.idx(x, y);
        if cell == Cell::DestructibleWall {
            let spawned_loot = rng.random_bool(config.loot.spawn_chance);
            if spawned_loot {
                let kind = PowerUpKind::roll(rng, &config.loot);
                self.power_ups
                    .push(PowerUp::new(Coord { x, y }, kind, now));
            }
            self.cells[i] = Cell::Explosion { since: now };
            return ExplodeResult::WallDestroyed { spawned_loot };
        }

        self.cells[i] = Cell::Explosion { since: now };
        ExplodeResult::Cleared
    }

    /// Reverts explosion cells past their duration and drops uncollected
    /// power-ups past their deadline
    pub fn expire(&mut self, now: u64, config: &Config) {
        for cell in self.cells.iter_mut() {
            if let Cell::Explosion { since } = *cell {
                if now.saturating_sub(since) >= config.timing.explosion_duration_ms {
                    *cell = Cell::Empty;
                }
            }
        }
        let expiry = config.timing.power_up_expiry_ms;
        self.power_ups.retain(|p| !p.is_expired(now, expiry));
    }

    pub fn power_up_at(&self, x: i32, y: i32) -> Option<&PowerUp> {
        self.power_ups
            .iter()
            .find(|p| !p.collected && p.pos.x == x && p.pos.y == y)
    }

    /// Marks the power-up at (x, y) collected and returns its kind
    pub fn collect_power_up(&mut self, x: i32, y: i32) -> Option<PowerUpKind> {
        let found = self
            .power_ups
            .iter_mut()
            .find(|p| !p.collected && p.pos.x == x && p.pos.y == y)?;
        found.collected = true;
        let kind = found.kind;
        self.power_ups.retain(|p| !p.collected);
        Some(kind)
    }

    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    /// Row-major rows of numeric cell codes, for snapshots
    pub fn cell_code_rows(&self) -> Vec<Vec<u8>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.cells[self.idx(x, y)].code())
                    .collect()
            })
            .collect()
    }

    /// Parses the external level text format:
    /// line 1 `width,height`, line 2 `p1x,p1y,p2x,p2y`, then `height`
    /// rows of `width` comma-separated cell codes (0 empty, 1 wall,
    /// 2 destructible wall).
    ///
    /// Builds a fresh board; the caller only swaps state in on success,
    /// so a malformed file can never leave a half-loaded grid behind.
    pub fn parse_level(text: &str) -> Result<(Board, [Coord; 2]), String> {
        let mut lines = text.lines();

        let header = lines.next().ok_or("Level file is empty")?;
        let dims = parse_int_row(header, 2)
            .map_err(|e| format!("Invalid level header '{}': {}", header, e))?;
        let (width, height) = (dims[0], dims[1]);
        if width < 3 || height < 3 {
            return Err(format!("Level dimensions {}x{} too small", width, height));
        }

        let spawn_line = lines.next().ok_or("Missing spawn point line")?;
        let sp = parse_int_row(spawn_line, 4)
            .map_err(|e| format!("Invalid spawn line '{}': {}", spawn_line, e))?;
        let spawns = [
            Coord { x: sp[0], y: sp[1] },
            Coord { x: sp[2], y: sp[3] },
        ];

        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            let line = lines
                .next()
                .ok_or_else(|| format!("Expected {} rows, file ends after {}", height, row))?;
            let codes = parse_int_row(line, width as usize)
                .map_err(|e| format!("Invalid row {}: {}", row, e))?;
            for code in codes {
                cells.push(match code {
                    0 => Cell::Empty,
                    1 => Cell::Wall,
                    2 => Cell::DestructibleWall,
                    other => {
                        return Err(format!("Unknown cell code {} in row {}", other, row))
                    }
                });
            }
        }
        if lines.next().is_some() {
            return Err(format!("Trailing data after {} rows", height));
        }

        let board = Board {
            width,
            height,
            cells,
            power_ups: Vec::new(),
        };
        for (i, spawn) in spawns.iter().enumerate() {
            if !board.in_bounds(spawn.x, spawn.y) {
                return Err(format!(
                    "Spawn point {} at ({},{}) is out of bounds",
                    i + 1,
                    spawn.x,
                    spawn.y
                ));
            }
            if board.is_wall(spawn.x, spawn.y) {
                return Err(format!(
                    "Spawn point {} at ({},{}) is inside a wall",
                    i + 1,
                    spawn.x,
                    spawn.y
                ));
            }
        }

        Ok((board, spawns))
    }

    /// Encodes terrain back into the level text format. Transient cells
    /// (bombs, explosions) are persisted as empty.
    pub fn encode_level(&self, spawns: &[Coord; 2]) -> String {
        let mut out = String::new();
        out.push_str(&format!("{},{}\n", self.width, self.height));
        out.push_str(&format!(
            "{},{},{},{}\n",
            spawns[0].x, spawns[0].y, spawns[1].x, spawns[1].y
        ));
        for y in 0..self.height {
            let row: Vec<String> = (0..self.width)
                .map(|x| {
                    let code = match self.cells[self.idx(x, y)] {
                        Cell::Wall => 1,
                        Cell::DestructibleWall => 2,
                        _ => 0,
                    };
                    code.to_string()
                })
                .collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }
}

/// Parses a comma-separated row of integers, enforcing the field count
fn parse_int_row(line: &str, expected: usize) -> Result<Vec<i32>, String> {
    let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
    if fields.len() != expected {
        return Err(format!(
            "expected {} fields, found {}",
            expected,
            fields.len()
        ));
    }
    fields
        .iter()
        .map(|f| {
            f.parse::<i32>()
                .map_err(|e| format!("non-numeric token '{}': {}", f, e))
        })
        .collect()
}
