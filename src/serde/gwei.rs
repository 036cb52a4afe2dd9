//! Estimate feeds and user input carry fee values as decimal gwei strings
//! (e.g. `"1.5"`), while the engine computes in integer wei. This helper
//! (de)serializes [`U256`] wei fields through that string representation.

use crate::units;
use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serializer, de::Error};

/// Serializes a wei amount as a decimal gwei string.
pub fn serialize<S>(wei: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&units::format_gwei(*wei))
}

/// Deserializes a decimal gwei string into wei.
pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    units::parse_gwei(&s).map_err(D::Error::custom)
}

/// Like the parent module, for optional fields.
pub mod opt {
    use super::*;

    /// Serializes an optional wei amount as a decimal gwei string.
    pub fn serialize<S>(wei: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match wei {
            Some(wei) => super::serialize(wei, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional decimal gwei string into wei.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| units::parse_gwei(&s).map_err(D::Error::custom))
            .transpose()
    }
}
