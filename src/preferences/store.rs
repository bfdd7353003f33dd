//! Persistent preference storage seam.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::world::UserId;

/// Schema key the flag is stored under.
pub const PREFERENCE_KEY: &str = "pp_no-phantoms";

/// Stored value meaning "phantoms disabled for this player".
pub const DISABLED_SENTINEL: &str = "true";

/// Failure of the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Durable mapping from player to an optional flag string.
///
/// Each call is atomic and authoritative; callers never coordinate.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, user: &UserId) -> Result<Option<String>, StoreError>;

    /// `None` clears the flag.
    async fn set(&self, user: &UserId, value: Option<String>) -> Result<(), StoreError>;
}

/// Process-local store, used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    rows: DashMap<UserId, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, user: &UserId) -> Result<Option<String>, StoreError> {
        Ok(self.rows.get(user).map(|v| v.clone()))
    }

    async fn set(&self, user: &UserId, value: Option<String>) -> Result<(), StoreError> {
        match value {
            Some(v) => {
                self.rows.insert(*user, v);
            }
            None => {
                self.rows.remove(user);
            }
        }
        Ok(())
    }
}
