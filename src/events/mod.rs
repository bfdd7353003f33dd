//! Gameplay event hooks.
//!
//! The host forwards the events below; each handler answers with a
//! [`Verdict`] or updates the preference cache.
//!
//! - `phantoms` - targeting/damage suppression, join/quit lifecycle

pub mod phantoms;

use crate::world::{UserId, WorldId};

pub use phantoms::PhantomListener;

/// What kind of entity takes part in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player(UserId),
    Phantom,
    Other,
}

/// An entity and the world it is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub world: WorldId,
}

impl Entity {
    pub fn new(kind: EntityKind, world: impl Into<WorldId>) -> Self {
        Self {
            kind,
            world: world.into(),
        }
    }
}

/// Whether the host should let an event through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Cancel,
}
