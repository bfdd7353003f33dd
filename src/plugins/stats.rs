//! Read-only phantom statistics for status displays (scoreboards, tab
//! lists, chat placeholders).

use std::sync::Arc;

use tracing::debug;

use crate::config::SharedSettings;
use crate::preferences::{PreferenceCache, PreferenceError};
use crate::scheduler::is_eligible;
use crate::world::{Server, UserId};

/// Online players split by preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub enabled: u64,
    pub disabled: u64,
}

impl Totals {
    pub fn online(&self) -> u64 {
        self.enabled + self.disabled
    }

    /// Whole percent of online players with phantoms enabled, rounded down.
    /// `0` with nobody online.
    pub fn percentage_enabled(&self) -> u64 {
        percentage(self.enabled, self.online())
    }

    /// Whole percent of online players with phantoms disabled, rounded down.
    /// `0` with nobody online.
    pub fn percentage_disabled(&self) -> u64 {
        percentage(self.disabled, self.online())
    }
}

fn percentage(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    part * 100 / total
}

#[derive(Clone)]
pub struct PhantomStats {
    server: Arc<dyn Server>,
    preferences: Arc<PreferenceCache>,
    settings: SharedSettings,
}

impl PhantomStats {
    pub fn new(
        server: Arc<dyn Server>,
        preferences: Arc<PreferenceCache>,
        settings: SharedSettings,
    ) -> Self {
        Self {
            server,
            preferences,
            settings,
        }
    }

    /// Whether phantoms are enabled for `user`.
    pub async fn enabled(&self, user: &UserId) -> Result<bool, PreferenceError> {
        self.preferences.resolve(user).await
    }

    /// Status of a player looked up by the display; `None` when offline.
    pub async fn status_of(&self, user: &UserId) -> Result<Option<bool>, PreferenceError> {
        if !self.server.is_online(user) {
            return Ok(None);
        }
        self.enabled(user).await.map(Some)
    }

    /// Whether the world `user` is in takes part in the mechanic; `None`
    /// when offline.
    pub fn world_enabled(&self, user: &UserId) -> Option<bool> {
        let world = self.server.world_of(user)?;
        Some(is_eligible(&world, &self.settings.current().worlds_blacklist))
    }

    /// Count every online player by preference.
    pub async fn totals(&self) -> Result<Totals, PreferenceError> {
        let mut totals = Totals::default();
        for world in self.server.worlds() {
            let players = match self.server.players_in(&world) {
                Ok(players) => players,
                Err(e) => {
                    debug!("Skipping world {} in totals: {}", world, e);
                    continue;
                }
            };
            for user in players {
                if self.preferences.resolve(&user).await? {
                    totals.enabled += 1;
                } else {
                    totals.disabled += 1;
                }
            }
        }
        Ok(totals)
    }
}

impl std::fmt::Debug for PhantomStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhantomStats").finish_non_exhaustive()
    }
}
