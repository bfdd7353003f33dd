//! Plugin lifecycle: wiring, reload and shutdown.

pub mod runtime;
pub mod state;

pub use runtime::run;
pub use state::AppState;
