//! Per-player key/value row.
//!
//! One document per (player, key), mirroring the `entity data` table the
//! plugin's data layer exposes.

use serde::{Deserialize, Serialize};

use crate::world::UserId;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityData {
    /// Player UUID, hyphenated.
    pub user_id: String,
    /// Schema key (e.g. `pp_no-phantoms`).
    pub key: String,
    pub value: String,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl EntityData {
    pub fn new(user: &UserId, key: &str, value: String) -> Self {
        Self {
            user_id: user.to_string(),
            key: key.to_string(),
            value,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_identity_and_time() {
        let user = UserId::random();
        let before = chrono::Utc::now().timestamp();
        let row = EntityData::new(&user, "pp_no-phantoms", "true".to_string());

        assert_eq!(row.user_id, user.to_string());
        assert_eq!(row.key, "pp_no-phantoms");
        assert!(row.updated_at >= before);
    }
}
