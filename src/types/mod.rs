//! Shared engine types.

mod estimates;
pub use estimates::*;

mod state;
pub use state::*;

mod transaction;
pub use transaction::*;
