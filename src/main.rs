#[macro_use]
extern crate rocket;

use log::info;
use rocket::fairing::AdHoc;
use std::env;

mod board;
mod bomb;
mod bot;
mod config;
mod entity;
mod game;
mod handler;
mod match_logger;
mod powerup;
mod profiler;
mod types;

#[launch]
fn rocket() -> _ {
    // Lots of web hosting services expect you to bind to the port specified by the `PORT`
    // environment variable. However, Rocket looks at the `ROCKET_PORT` environment variable.
    // If we find a value for `PORT`, we set `ROCKET_PORT` to that value.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Arena Server...");

    // Load configuration once at startup
    let config = config::Config::load_or_default();

    rocket::build()
        .attach(AdHoc::on_ignite("Arena Registry", |rocket| async move {
            let logger = match_logger::MatchLogger::new(
                config.debug.enabled,
                &config.debug.log_file_path,
            )
            .await;
            rocket.manage(handler::Arena::new(config, logger))
        }))
        .attach(AdHoc::on_response("Server ID Middleware", |_, res| {
            Box::pin(async move {
                res.set_raw_header("Server", "bomber-arena/engine");
            })
        }))
        .mount(
            "/",
            routes![
                handler::index,
                handler::create_game,
                handler::get_state,
                handler::post_input,
                handler::post_bomb,
                handler::post_tick,
                handler::post_level,
                handler::get_level,
                handler::delete_game,
            ],
        )
}
