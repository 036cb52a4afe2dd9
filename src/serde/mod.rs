//! Serde helpers.

pub mod gwei;
