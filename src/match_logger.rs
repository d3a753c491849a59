// Match logging module for asynchronous game state logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the tick/request cycle. Each logged tick's snapshot is written to a
// JSONL file.

use log::error;
use serde::Serialize;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::GameView;

/// Represents a single match log entry
#[derive(Debug, Serialize)]
struct MatchLogEntry {
    game_id: u64,
    tick: u64,
    snapshot: GameView,
    timestamp: String,
}

/// Shared match logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct MatchLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl MatchLogger {
    /// Creates a new match logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return MatchLogger {
                file: Arc::new(Mutex::new(None)),
                enabled: false,
            };
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Match logging enabled: {}", log_file_path);
                MatchLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create match log file '{}': {}", log_file_path, e);
                MatchLogger {
                    file: Arc::new(Mutex::new(None)),
                    enabled: false,
                }
            }
        }
    }

    /// Creates a disabled match logger (no-op)
    pub fn disabled() -> Self {
        MatchLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    /// Logs one tick's snapshot asynchronously (fire-and-forget)
    /// This spawns a tokio task that writes to the file without blocking
    pub fn log_tick(&self, game_id: u64, snapshot: GameView) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();

        tokio::spawn(async move {
            Self::log_tick_internal(file_handle, game_id, snapshot).await;
        });
    }

    /// Internal async function that performs the actual file write
    async fn log_tick_internal(
        file_handle: Arc<Mutex<Option<File>>>,
        game_id: u64,
        snapshot: GameView,
    ) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            let entry = MatchLogEntry {
                game_id,
                tick: snapshot.tick,
                snapshot,
                timestamp: chrono::Utc::now().to_rfc3339(),
            };

            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write match log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush match log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize match log entry: {}", e);
                }
            }
        }
    }
}
