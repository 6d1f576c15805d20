//! Serde helpers for [`SnowflakeId`].
//!
//! With the `serde` feature, [`SnowflakeId`] serializes as its native `u64`.
//! Use [`as_string`] for formats whose consumers cannot hold a 64-bit integer
//! losslessly, such as JSON read by JavaScript.
//!
//! [`SnowflakeId`]: crate::id::SnowflakeId

pub mod as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::id::SnowflakeId;

    /// Serialize a snowflake ID as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize a snowflake ID from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a decimal `u64`, or has the reserved bit set
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
