//! Database models.

mod entity_data;

pub use entity_data::EntityData;
