//! Coherent in-memory view of player preferences.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, info};

use super::store::{DISABLED_SENTINEL, PreferenceStore, StoreError};
use crate::config::Settings;
use crate::world::{Presence, UserId};

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Answers "are phantoms enabled for this player" backed by a
/// [`PreferenceStore`].
///
/// Only connected players are cached on read. Writes go to the store
/// first and reach the map only once the store accepted them, so the map
/// never claims a value the store does not hold.
pub struct PreferenceCache {
    store: Arc<dyn PreferenceStore>,
    presence: Arc<dyn Presence>,
    /// Per-player value, lock-free per key
    entries: DashMap<UserId, bool>,
    default_enabled: AtomicBool,
    debug_mode: AtomicBool,
}

impl PreferenceCache {
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        presence: Arc<dyn Presence>,
        settings: &Settings,
    ) -> Self {
        Self {
            store,
            presence,
            entries: DashMap::new(),
            default_enabled: AtomicBool::new(settings.default_enabled),
            debug_mode: AtomicBool::new(settings.debug_mode),
        }
    }

    /// Whether phantoms are enabled for `user`.
    ///
    /// Cache hit returns immediately. On a miss the store is read and the
    /// result cached if the player is online. Store failures are returned
    /// as-is and nothing is cached.
    pub async fn resolve(&self, user: &UserId) -> Result<bool, PreferenceError> {
        if let Some(cached) = self.entries.get(user) {
            return Ok(*cached);
        }

        let enabled = self.read_through(user).await?;

        if self.presence.is_online(user) {
            // A concurrent write-through wins over this (possibly older) read.
            return Ok(*self.entries.entry(*user).or_insert(enabled));
        }
        Ok(enabled)
    }

    /// Persist a new value, then cache it.
    pub async fn set_preference(&self, user: &UserId, enabled: bool) -> Result<(), PreferenceError> {
        let value = if enabled {
            None
        } else {
            Some(DISABLED_SENTINEL.to_string())
        };
        self.store.set(user, value).await?;
        self.entries.insert(*user, enabled);

        if self.debug_mode.load(Ordering::Acquire) {
            info!("Updated phantoms for {}: {}", user, enabled);
        } else {
            debug!("Updated phantoms for {}: {}", user, enabled);
        }
        Ok(())
    }

    /// Player joined: load and cache their value from the store.
    pub async fn on_connect(&self, user: &UserId) -> Result<bool, PreferenceError> {
        // An entry left by an offline write may be stale by now.
        self.entries.remove(user);
        let enabled = self.read_through(user).await?;
        Ok(*self.entries.entry(*user).or_insert(enabled))
    }

    /// Player left: forget their value.
    pub fn on_disconnect(&self, user: &UserId) {
        self.entries.remove(user);
    }

    /// Adopt a new settings snapshot.
    ///
    /// Cached values derived from the old default are dropped when the
    /// default changes.
    pub fn apply_settings(&self, settings: &Settings) {
        let previous = self
            .default_enabled
            .swap(settings.default_enabled, Ordering::AcqRel);
        self.debug_mode.store(settings.debug_mode, Ordering::Release);

        if previous != settings.default_enabled {
            let dropped = self.entries.len();
            self.entries.clear();
            info!(
                "Default changed to {}, dropped {} cached preferences",
                settings.default_enabled, dropped
            );
        }
    }

    /// Cached value without touching the store.
    pub fn cached(&self, user: &UserId) -> Option<bool> {
        self.entries.get(user).map(|v| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    async fn read_through(&self, user: &UserId) -> Result<bool, PreferenceError> {
        let flag = self.store.get(user).await?;
        let enabled = match flag.as_deref() {
            Some(DISABLED_SENTINEL) => false,
            _ => self.default_enabled.load(Ordering::Acquire),
        };
        debug!("Preference read-through for {}: {}", user, enabled);
        Ok(enabled)
    }
}

impl std::fmt::Debug for PreferenceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceCache")
            .field("entry_count", &self.entries.len())
            .field("default_enabled", &self.default_enabled.load(Ordering::Relaxed))
            .finish()
    }
}
