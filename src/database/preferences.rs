//! Preference repository.
//!
//! MongoDB-backed [`PreferenceStore`]. A cleared flag is a deleted
//! document, so the collection only holds players who opted out.

use async_trait::async_trait;
use mongodb::Collection;
use mongodb::bson::doc;
use tracing::debug;

use super::Database;
use super::models::EntityData;
use crate::preferences::{PREFERENCE_KEY, PreferenceStore, StoreError};
use crate::world::UserId;

/// Repository for per-player preference flags.
#[derive(Clone)]
pub struct PreferenceRepo {
    collection: Collection<EntityData>,
}

impl PreferenceRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("entity_data"),
        }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepo {
    async fn get(&self, user: &UserId) -> Result<Option<String>, StoreError> {
        let filter = doc! { "user_id": user.to_string(), "key": PREFERENCE_KEY };
        let row = self
            .collection
            .find_one(filter)
            .await
            .map_err(StoreError::backend)?;

        debug!("DB get preference for {}: {:?}", user, row.as_ref().map(|r| &r.value));
        Ok(row.map(|r| r.value))
    }

    async fn set(&self, user: &UserId, value: Option<String>) -> Result<(), StoreError> {
        let filter = doc! { "user_id": user.to_string(), "key": PREFERENCE_KEY };

        match value {
            Some(value) => {
                let row = EntityData::new(user, PREFERENCE_KEY, value);
                let options = mongodb::options::ReplaceOptions::builder()
                    .upsert(true)
                    .build();

                self.collection
                    .replace_one(filter, &row)
                    .with_options(options)
                    .await
                    .map_err(StoreError::backend)?;
                debug!("Saved preference for {}", user);
            }
            None => {
                let result = self
                    .collection
                    .delete_one(filter)
                    .await
                    .map_err(StoreError::backend)?;
                debug!("Cleared preference for {}: {}", user, result.deleted_count > 0);
            }
        }
        Ok(())
    }
}
