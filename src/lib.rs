//! NoPhantoms - per-player phantom opt-out.
//!
//! Players choose whether phantoms may target them. Opted-out players have
//! their "time since rest" statistic reset every night, world by world.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration and the reloadable settings snapshot
//! - `world` - Host server contract (plus an in-memory simulation)
//! - `database` - MongoDB-backed preference store
//! - `preferences` - Preference store seam and the online-player cache
//! - `scheduler` - Per-world, night-aligned rest reset jobs
//! - `cache` - Moka caches for short-lived bookkeeping
//! - `events` - Gameplay hooks (targeting, damage, join/quit)
//! - `plugins` - Command services
//! - `app` - Wiring, reload and shutdown
//! - `utils` - Utility functions

pub mod app;
pub mod cache;
pub mod config;
pub mod database;
pub mod events;
pub mod plugins;
pub mod preferences;
pub mod scheduler;
pub mod utils;
pub mod world;
