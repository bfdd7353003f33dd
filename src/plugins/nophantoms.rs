//! `/nophantoms` command service.
//!
//! Argument parsing and permission checks happen before this point; the
//! service receives an already-routed request and returns what happened.
//! Rendering the outcome for the sender is up to the caller.

use std::sync::Arc;
use std::time::Duration;

use moka::Expiry;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheConfig, TypedCache};
use crate::config::SharedSettings;
use crate::preferences::{PreferenceCache, PreferenceError};
use crate::scheduler::is_eligible;
use crate::utils::format_duration_short;
use crate::world::{Server, UserId};

/// Rest statistic given to players who re-enable phantoms: one real hour
/// (three in-game days), past the threshold where phantoms start spawning.
pub const ENABLED_REST_TICKS: u32 = 72_000;

/// Who ran the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Console,
    Player(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Toggle,
    Enable,
    Disable,
}

/// A routed edit request.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub sender: Sender,
    /// `None` edits the sender. Only this form is subject to the cooldown.
    pub target: Option<UserId>,
    pub action: Action,
    /// Skip the cooldown (e.g. `pp.nophantoms.bypass`).
    pub bypass_cooldown: bool,
    /// Per-sender cooldown granted by a permission, replacing the default.
    pub cooldown_override: Option<Duration>,
}

impl EditRequest {
    pub fn own(user: UserId, action: Action) -> Self {
        Self {
            sender: Sender::Player(user),
            target: None,
            action,
            bypass_cooldown: false,
            cooldown_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Changed {
        target: UserId,
        enabled: bool,
        /// The target is someone else and is online.
        notify_target: bool,
    },
    OnCooldown {
        remaining: Duration,
        /// e.g. `9m 58s`
        display: String,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("console must specify a player")]
    ConsoleNeedsTarget,

    #[error(transparent)]
    Preference(#[from] PreferenceError),
}

/// A running cooldown.
#[derive(Debug, Clone, Copy)]
struct Cooldown {
    expires_at: Instant,
    length: Duration,
}

/// Keeps each cooldown in the cache for exactly its own length.
struct CooldownExpiry;

impl Expiry<UserId, Cooldown> for CooldownExpiry {
    fn expire_after_create(
        &self,
        _user: &UserId,
        cooldown: &Cooldown,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(cooldown.length)
    }

    fn expire_after_update(
        &self,
        _user: &UserId,
        cooldown: &Cooldown,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(cooldown.length)
    }
}

/// Reads and edits player preferences on behalf of commands.
#[derive(Clone)]
pub struct NoPhantomsCommand {
    server: Arc<dyn Server>,
    preferences: Arc<PreferenceCache>,
    settings: SharedSettings,
    /// Player -> running cooldown
    cooldowns: TypedCache<UserId, Cooldown>,
}

impl NoPhantomsCommand {
    pub fn new(
        server: Arc<dyn Server>,
        preferences: Arc<PreferenceCache>,
        settings: SharedSettings,
    ) -> Self {
        Self {
            server,
            preferences,
            settings,
            cooldowns: TypedCache::with_expiry(
                "command_cooldowns",
                CacheConfig::cooldowns(),
                CooldownExpiry,
            ),
        }
    }

    /// Whether phantoms are enabled for `target`.
    pub async fn get(&self, target: &UserId) -> Result<bool, CommandError> {
        Ok(self.preferences.resolve(target).await?)
    }

    /// Toggle, enable or disable phantoms for the request's target.
    pub async fn edit(&self, request: EditRequest) -> Result<Outcome, CommandError> {
        let (target, own) = match (request.sender, request.target) {
            (Sender::Player(sender), Some(target)) => (target, sender == target),
            (Sender::Player(sender), None) => (sender, true),
            (Sender::Console, Some(target)) => (target, false),
            (Sender::Console, None) => return Err(CommandError::ConsoleNeedsTarget),
        };

        // Cooldown only applies to the form without a target
        let cooldown = match request.target {
            None if !request.bypass_cooldown => Some(
                request
                    .cooldown_override
                    .unwrap_or(self.settings.current().command_cooldown),
            ),
            _ => None,
        };
        if cooldown.is_some()
            && let Some(remaining) = self.cooldown_remaining(&target)
        {
            return Ok(Outcome::OnCooldown {
                remaining,
                display: format_duration_short(remaining),
            });
        }

        let enabled = match request.action {
            Action::Toggle => !self.preferences.resolve(&target).await?,
            Action::Enable => true,
            Action::Disable => false,
        };
        self.preferences.set_preference(&target, enabled).await?;

        // Only a successful edit uses up the cooldown
        if let Some(length) = cooldown {
            self.start_cooldown(&target, length);
        }

        // Apply right away for online players
        if let Some(world) = self.server.world_of(&target)
            && is_eligible(&world, &self.settings.current().worlds_blacklist)
        {
            let ticks = if enabled { ENABLED_REST_TICKS } else { 0 };
            if let Err(e) = self.server.set_time_since_rest(&target, ticks) {
                debug!("Could not update rest statistic for {}: {}", target, e);
            }
        }

        Ok(Outcome::Changed {
            target,
            enabled,
            notify_target: !own && self.server.is_online(&target),
        })
    }

    /// Forget every running cooldown.
    pub fn clear_cooldowns(&self) {
        self.cooldowns.invalidate_all();
        debug!("Cleared cache {}", self.cooldowns.name());
    }

    /// Time left on the user's running cooldown.
    fn cooldown_remaining(&self, user: &UserId) -> Option<Duration> {
        let now = Instant::now();
        self.cooldowns
            .get(user)
            .filter(|cooldown| cooldown.expires_at > now)
            .map(|cooldown| cooldown.expires_at - now)
    }

    fn start_cooldown(&self, user: &UserId, length: Duration) {
        if length.is_zero() {
            return;
        }
        self.cooldowns.insert(
            *user,
            Cooldown {
                expires_at: Instant::now() + length,
                length,
            },
        );
    }
}
