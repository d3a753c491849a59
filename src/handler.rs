// HTTP handler bindings for the arena driver API
//
// This module provides thin wrapper functions that bind Rocket HTTP routes
// to the simulation's driver contract. Handlers are responsible for:
// - Deserializing incoming JSON requests
// - Resolving the target match in the Arena registry
// - Delegating to Game methods
// - Serializing responses
//
// The server owns wall-clock time: each match carries an Instant origin
// and update() receives elapsed milliseconds, so the core never reads
// the clock itself.

use parking_lot::Mutex;
use rocket::http::Status;
use rocket::serde::json::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::bot::Difficulty;
use crate::config::Config;
use crate::game::{ControlMode, Game};
use crate::match_logger::MatchLogger;
use crate::profiler::ProfileGuard;
use crate::types::{Direction, GameView};

/// One registered match and its clock origin
struct Session {
    game: Game,
    clock: Instant,
}

/// Registry of live matches, shared across request handlers
pub struct Arena {
    config: Config,
    logger: MatchLogger,
    next_id: AtomicU64,
    games: Mutex<HashMap<u64, Session>>,
}

impl Arena {
    pub fn new(config: Config, logger: MatchLogger) -> Self {
        Arena {
            config,
            logger,
            next_id: AtomicU64::new(1),
            games: Mutex::new(HashMap::new()),
        }
    }

    fn with_session<T>(
        &self,
        id: u64,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, (Status, String)> {
        let mut games = self.games.lock();
        match games.get_mut(&id) {
            Some(session) => Ok(f(session)),
            None => Err((Status::NotFound, format!("Game {} not found", id))),
        }
    }
}

/// Request body for creating a match. `bot_tier` switches the second
/// slot to a bot of that difficulty (1-3); absent means two humans.
#[derive(Deserialize)]
pub struct NewGameRequest {
    pub width: i32,
    pub height: i32,
    pub bot_tier: Option<u8>,
}

#[derive(Deserialize)]
pub struct InputRequest {
    pub player: usize,
    pub direction: String,
    pub pressed: bool,
}

#[derive(Deserialize)]
pub struct BombRequest {
    pub player: usize,
}

#[derive(Deserialize)]
pub struct LevelRequest {
    pub text: String,
}

/// GET / endpoint
/// Returns engine metadata and configured rule defaults
#[get("/")]
pub fn index(arena: &rocket::State<Arena>) -> Json<Value> {
    Json(json!({
        "name": "bomber-arena",
        "apiversion": "1",
        "rules": {
            "bomb_fuse_ms": arena.config.timing.bomb_fuse_ms,
            "starting_lives": arena.config.rules.starting_lives,
            "board_dimensions": [
                arena.config.board.min_dimension,
                arena.config.board.max_dimension,
            ],
        },
    }))
}

/// POST /game endpoint
/// Creates a new match and returns its id
#[post("/game", format = "json", data = "<req>")]
pub fn create_game(
    arena: &rocket::State<Arena>,
    req: Json<NewGameRequest>,
) -> Result<Json<Value>, (Status, String)> {
    let second_slot = match req.bot_tier {
        None => ControlMode::Human,
        Some(tier) => {
            let difficulty =
                Difficulty::from_tier(tier).map_err(|e| (Status::BadRequest, e))?;
            ControlMode::Bot(difficulty)
        }
    };

    let game = Game::new(
        req.width,
        req.height,
        [ControlMode::Human, second_slot],
        arena.config.clone(),
    )
    .map_err(|e| (Status::BadRequest, e))?;

    let id = arena.next_id.fetch_add(1, Ordering::Relaxed);
    arena.games.lock().insert(
        id,
        Session {
            game,
            clock: Instant::now(),
        },
    );

    Ok(Json(json!({ "game_id": id })))
}

/// GET /game/<id> endpoint
/// Returns a read-only snapshot of the match
#[get("/game/<id>")]
pub fn get_state(
    arena: &rocket::State<Arena>,
    id: u64,
) -> Result<Json<GameView>, (Status, String)> {
    let view = arena.with_session(id, |session| {
        let _guard = ProfileGuard::new("snapshot");
        let now = session.clock.elapsed().as_millis() as u64;
        session.game.snapshot(now)
    })?;
    Ok(Json(view))
}

/// POST /game/<id>/input endpoint
/// Buffers a directional press or release for a human slot
#[post("/game/<id>/input", format = "json", data = "<req>")]
pub fn post_input(
    arena: &rocket::State<Arena>,
    id: u64,
    req: Json<InputRequest>,
) -> Result<Status, (Status, String)> {
    let dir = Direction::parse(&req.direction).map_err(|e| (Status::BadRequest, e))?;
    arena.with_session(id, |session| {
        session
            .game
            .handle_directional_input(req.player, dir, req.pressed);
    })?;
    Ok(Status::Ok)
}

/// POST /game/<id>/bomb endpoint
/// Requests a bomb drop for a human slot on the next tick
#[post("/game/<id>/bomb", format = "json", data = "<req>")]
pub fn post_bomb(
    arena: &rocket::State<Arena>,
    id: u64,
    req: Json<BombRequest>,
) -> Result<Status, (Status, String)> {
    arena.with_session(id, |session| {
        session.game.handle_bomb_request(req.player);
    })?;
    Ok(Status::Ok)
}

/// POST /game/<id>/tick endpoint
/// Advances the simulation by one tick and returns the new snapshot
#[post("/game/<id>/tick")]
pub fn post_tick(
    arena: &rocket::State<Arena>,
    id: u64,
) -> Result<Json<GameView>, (Status, String)> {
    let view = arena.with_session(id, |session| {
        let now = session.clock.elapsed().as_millis() as u64;
        let view = {
            let _guard = ProfileGuard::new("tick");
            session.game.update(now);
            session.game.snapshot(now)
        };
        view
    })?;

    arena.logger.log_tick(id, view.clone());
    Ok(Json(view))
}

/// POST /game/<id>/level endpoint
/// Replaces the board from level text and restarts the match on it
#[post("/game/<id>/level", format = "json", data = "<req>")]
pub fn post_level(
    arena: &rocket::State<Arena>,
    id: u64,
    req: Json<LevelRequest>,
) -> Result<Status, (Status, String)> {
    arena.with_session(id, |session| {
        let _guard = ProfileGuard::new("level_io");
        session.game.load_level(&req.text)
    })?
    .map_err(|e| (Status::BadRequest, e))?;
    Ok(Status::Ok)
}

/// GET /game/<id>/level endpoint
/// Returns the current terrain in the level text format
#[get("/game/<id>/level")]
pub fn get_level(
    arena: &rocket::State<Arena>,
    id: u64,
) -> Result<String, (Status, String)> {
    arena.with_session(id, |session| {
        let _guard = ProfileGuard::new("level_io");
        session.game.save_level()
    })
}

/// DELETE /game/<id> endpoint
/// Drops a finished (or abandoned) match from the registry
#[delete("/game/<id>")]
pub fn delete_game(arena: &rocket::State<Arena>, id: u64) -> Status {
    if arena.games.lock().remove(&id).is_some() {
        Status::Ok
    } else {
        Status::NotFound
    }
}
