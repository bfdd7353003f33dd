//! NoPhantoms entry point.
//!
//! Runs the plugin against the simulated server, with MongoDB as the
//! preference store when `MONGODB_URI` is set.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nophantoms::app::{self, AppState};
use nophantoms::config::{Config, Settings};
use nophantoms::database::{Database, PreferenceRepo};
use nophantoms::preferences::{MemoryPreferenceStore, PreferenceStore};
use nophantoms::world::{SimulatedServer, WorldId};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nophantoms=info,mongodb=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting NoPhantoms...");

    // Load configuration
    let config = Config::from_env();
    let settings = Settings::from_env();
    info!("Configuration loaded successfully");
    info!("Default phantoms enabled: {}", settings.default_enabled);

    // Preference store
    let store: Arc<dyn PreferenceStore> = match &config.mongodb_uri {
        Some(uri) => {
            info!("Connecting to MongoDB...");
            let db = Database::connect(uri, &config.mongodb_database).await?;
            Arc::new(PreferenceRepo::new(&db))
        }
        None => {
            warn!("MONGODB_URI not set, preferences will not survive a restart");
            Arc::new(MemoryPreferenceStore::new())
        }
    };

    // Host server
    let server = Arc::new(SimulatedServer::new());
    for name in &config.worlds {
        server.add_world(WorldId::new(name.as_str()), 0);
    }
    info!("Simulated worlds: {:?}", config.worlds);
    let clock = server.clone().spawn_clock(config.tick);

    let state = AppState::new(server, store, settings, config.tick);
    app::run(&state).await?;

    clock.abort();
    Ok(())
}
