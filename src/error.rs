//! Engine error types.
use alloy::primitives::utils::UnitsError;
use thiserror::Error;

/// Errors surfaced by the fee engine.
///
/// The derivation pipeline itself is total: absent or zero inputs resolve to
/// zero instead of failing. The only fallible edges are quantity conversion at
/// the text boundary and persistence through the host's transaction store.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A quantity string could not be converted between wei and gwei.
    #[error(transparent)]
    Units(#[from] UnitsError),
    /// A quantity string parsed to a negative amount.
    #[error("negative quantity: {0}")]
    NegativeQuantity(String),
    /// The host transaction store rejected a patch.
    #[error("transaction store rejected the update")]
    Store(#[source] eyre::Report),
}
