//! Host server contract.
//!
//! The game server owns worlds, their clocks and the connected players.
//! Everything else in the crate talks to it through the traits below.
//!
//! ## Day/night
//!
//! Each world exposes a time of day in `[0, 24000)` ticks:
//! - `0..12000` is day
//! - `12000..24000` is night

mod simulated;

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

pub use simulated::SimulatedServer;

/// Stable identity of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a fresh random identity.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// World name as the server knows it (e.g. `world_nether`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(pub String);

impl WorldId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorldId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Errors reported by the host server.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("world '{0}' does not exist")]
    UnknownWorld(WorldId),

    #[error("player {0} is not connected")]
    UnknownPlayer(UserId),
}

/// Answers whether a player is currently connected.
pub trait Presence: Send + Sync {
    fn is_online(&self, user: &UserId) -> bool;
}

/// The game server as seen by the scheduler and the gameplay hooks.
///
/// Implementations must be thread-safe; calls may come from periodic
/// world jobs and from player events at the same time.
pub trait Server: Presence {
    /// All currently loaded worlds.
    fn worlds(&self) -> Vec<WorldId>;

    /// Current time of day of a world, in ticks.
    fn world_time(&self, world: &WorldId) -> Result<u64, HostError>;

    /// Players currently connected to a world.
    fn players_in(&self, world: &WorldId) -> Result<Vec<UserId>, HostError>;

    /// The world a connected player is in.
    fn world_of(&self, user: &UserId) -> Option<WorldId>;

    /// Overwrite the player's "time since rest" statistic.
    fn set_time_since_rest(&self, user: &UserId, ticks: u32) -> Result<(), HostError>;
}
