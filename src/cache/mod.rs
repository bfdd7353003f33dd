//! Cache module - Small typed caches using Moka.
//!
//! Used for short-lived bookkeeping that is allowed to expire on its own,
//! such as command cooldowns. Player preferences do NOT live here: they
//! need explicit invalidation, see `crate::preferences`.
//!
//! ## Usage
//!
//! ```ignore
//! let sessions: TypedCache<UserId, Session> =
//!     TypedCache::new("sessions", CacheConfig::with_capacity(10_000));
//!
//! // Each entry lives as long as its own cooldown
//! let cooldowns: TypedCache<UserId, Cooldown> =
//!     TypedCache::with_expiry("command_cooldowns", CacheConfig::cooldowns(), CooldownExpiry);
//!
//! cooldowns.insert(user, cooldown);
//! let running = cooldowns.get(&user);
//! ```

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::TypedCache;
