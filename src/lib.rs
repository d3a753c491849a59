// Library exports for the arena simulation engine
// This allows the headless tools and integration tests to use the core logic

pub mod board;
pub mod bomb;
pub mod bot;
pub mod config;
pub mod entity;
pub mod game;
pub mod match_logger;
pub mod powerup;
pub mod profiler;
pub mod types;
