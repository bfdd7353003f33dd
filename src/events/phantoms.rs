//! Phantom event handlers.
//!
//! Players who opted out are neither targeted nor hurt by phantoms, and
//! cannot hurt phantoms either.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{Entity, EntityKind, Verdict};
use crate::config::SharedSettings;
use crate::preferences::{PreferenceCache, PreferenceError};
use crate::scheduler::is_eligible;
use crate::world::{Server, UserId, WorldId};

/// Handles phantom-related gameplay events.
#[derive(Clone)]
pub struct PhantomListener {
    server: Arc<dyn Server>,
    preferences: Arc<PreferenceCache>,
    settings: SharedSettings,
}

impl PhantomListener {
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

    /// A mob picked a target.
    pub async fn on_target(&self, mob: &Entity, target: &Entity) -> Verdict {
        if mob.kind != EntityKind::Phantom {
            return Verdict::Allow;
        }
        let EntityKind::Player(user) = target.kind else {
            return Verdict::Allow;
        };
        if !self.is_eligible(&target.world) {
            return Verdict::Allow;
        }
        self.verdict_for(&user).await
    }

    /// An entity damaged another.
    pub async fn on_damage(&self, damager: &Entity, victim: &Entity) -> Verdict {
        if !self.is_eligible(&damager.world) {
            return Verdict::Allow;
        }
        match (damager.kind, victim.kind) {
            // Player attacking phantom, or phantom attacking player
            (EntityKind::Player(user), EntityKind::Phantom)
            | (EntityKind::Phantom, EntityKind::Player(user)) => self.verdict_for(&user).await,
            _ => Verdict::Allow,
        }
    }

    /// Player joined: cache their preference and clear the rest counter
    /// of opted-out players straight away.
    pub async fn on_join(&self, user: &UserId) -> Result<bool, PreferenceError> {
        let enabled = self.preferences.on_connect(user).await?;

        if !enabled
            && let Some(world) = self.server.world_of(user)
            && self.is_eligible(&world)
            && let Err(e) = self.server.set_time_since_rest(user, 0)
        {
            debug!("Could not reset rest statistic for {}: {}", user, e);
        }
        Ok(enabled)
    }

    /// Player left.
    pub fn on_quit(&self, user: &UserId) {
        self.preferences.on_disconnect(user);
    }

    fn is_eligible(&self, world: &WorldId) -> bool {
        is_eligible(world, &self.settings.current().worlds_blacklist)
    }

    async fn verdict_for(&self, user: &UserId) -> Verdict {
        match self.preferences.resolve(user).await {
            Ok(true) => Verdict::Allow,
            Ok(false) => Verdict::Cancel,
            Err(e) => {
                warn!("Failed to resolve preference for {}, allowing: {}", user, e);
                Verdict::Allow
            }
        }
    }
}
