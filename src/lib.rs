//! # txgas
//!
//! Gas fee input engine for wallet transaction editing: reconciles live gas
//! estimates, the transaction record, and the user's overrides into one
//! derived fee state, validates it, and routes fee changes back through the
//! host's transaction store.

pub mod config;
pub mod constants;
pub mod cost;
pub mod engine;
pub mod error;
pub mod feed;
pub mod fields;
pub mod mutation;
pub mod serde;
pub mod store;
pub mod types;
pub mod units;
pub mod validation;
