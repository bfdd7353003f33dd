//! Command handlers.
//!
//! Add new commands by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_command;` below
//! 3. Wiring the service into `AppState`

pub mod nophantoms;
pub mod stats;

pub use nophantoms::NoPhantomsCommand;
pub use stats::{PhantomStats, Totals};
