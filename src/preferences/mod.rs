//! Player preferences.
//!
//! - `PreferenceStore` - durable source of truth (one flag per player)
//! - `PreferenceCache` - coherent in-memory view for connected players
//!
//! ## Usage
//!
//! ```ignore
//! let cache = PreferenceCache::new(store, server, &settings);
//!
//! // Player joined
//! cache.on_connect(&user).await?;
//!
//! // Gameplay hook
//! if !cache.resolve(&user).await? {
//!     // phantoms disabled for this player
//! }
//! ```

mod cache;
mod store;

pub use cache::{PreferenceCache, PreferenceError};
pub use store::{DISABLED_SENTINEL, MemoryPreferenceStore, PREFERENCE_KEY, PreferenceStore, StoreError};
