//! Configuration module for NoPhantoms.
//!
//! Loads configuration from environment variables.
//!
//! - `Config` - process bootstrap (database, simulated worlds, tick length)
//! - `Settings` - the reloadable snapshot read by the cache and the scheduler

mod settings;

use std::env;
use std::time::Duration;

use tracing::warn;

pub use settings::{Settings, SharedSettings, StatisticTask, WorldsBlacklist};

/// Default wall-clock length of one game tick.
const DEFAULT_TICK_MILLIS: u64 = 50;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // MongoDB
    /// Connection string. The in-memory store is used when unset.
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,

    /// Worlds loaded by the simulated server (comma-separated).
    pub worlds: Vec<String>,

    /// Wall-clock duration of one game tick.
    pub tick: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mongodb_uri = env::var("MONGODB_URI")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let worlds = env::var("WORLDS")
            .unwrap_or_else(|_| "world,world_nether,world_the_end".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let tick_millis = match env::var("TICK_MILLIS") {
            Ok(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!("Invalid TICK_MILLIS '{}', using {}", raw, DEFAULT_TICK_MILLIS);
                DEFAULT_TICK_MILLIS
            }),
            Err(_) => DEFAULT_TICK_MILLIS,
        };

        Self {
            mongodb_uri,
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "nophantoms".to_string()),
            worlds,
            tick: Duration::from_millis(tick_millis.max(1)),
        }
    }
}
