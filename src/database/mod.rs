//! Database module exports.

mod models;
mod mongo;
mod preferences;

pub use mongo::Database;
pub use preferences::PreferenceRepo;
