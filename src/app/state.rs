//! Shared application state.
//!
//! Builds every component once and owns the reload/shutdown lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{Settings, SharedSettings};
use crate::events::PhantomListener;
use crate::plugins::{NoPhantomsCommand, PhantomStats};
use crate::preferences::{PreferenceCache, PreferenceStore};
use crate::scheduler::{ReloadSummary, TokioTimer, WorldScheduler};
use crate::world::Server;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Current settings snapshot.
    pub settings: SharedSettings,

    /// Host game server.
    pub server: Arc<dyn Server>,

    /// Player preferences with online-player caching.
    pub preferences: Arc<PreferenceCache>,

    /// Per-world rest reset jobs.
    pub scheduler: Arc<WorldScheduler>,

    /// Gameplay event hooks.
    pub listener: PhantomListener,

    /// `/nophantoms` command service.
    pub command: NoPhantomsCommand,

    /// Status and statistics queries.
    pub stats: PhantomStats,
}

impl AppState {
    /// Create a new application state.
    pub fn new<S>(
        server: Arc<S>,
        store: Arc<dyn PreferenceStore>,
        settings: Settings,
        tick: Duration,
    ) -> Self
    where
        S: Server + 'static,
    {
        let preferences = Arc::new(PreferenceCache::new(store, server.clone(), &settings));
        let server: Arc<dyn Server> = server;
        let settings = SharedSettings::new(settings);

        let scheduler = Arc::new(WorldScheduler::new(
            server.clone(),
            preferences.clone(),
            Arc::new(TokioTimer::new(tick)),
        ));
        let listener = PhantomListener::new(server.clone(), preferences.clone(), settings.clone());
        let command = NoPhantomsCommand::new(server.clone(), preferences.clone(), settings.clone());
        let stats = PhantomStats::new(server.clone(), preferences.clone(), settings.clone());

        Self {
            settings,
            server,
            preferences,
            scheduler,
            listener,
            command,
            stats,
        }
    }

    /// Install `settings` and reschedule every world.
    pub async fn apply(&self, settings: Settings) -> ReloadSummary {
        let settings = Arc::new(settings);
        self.settings.replace(Arc::clone(&settings));
        self.preferences.apply_settings(&settings);
        self.scheduler.reload(&settings).await
    }

    /// Re-read `.env` and the environment, then apply.
    pub async fn reload(&self) -> ReloadSummary {
        dotenvy::dotenv_override().ok();
        let settings = Settings::from_env();
        info!("Settings reloaded");
        self.apply(settings).await
    }

    /// Cancel every job and drop cached state.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        self.preferences.clear();
        self.command.clear_cooldowns();
        info!("Shutdown complete");
    }
}
