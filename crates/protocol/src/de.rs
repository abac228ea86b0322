//! Lenient field decoding for peer-built JSON.

use serde::{Deserialize, Deserializer};

/// Decodes an explicit `null` as `T::default()`.
///
/// `#[serde(default)]` only covers absent keys; extensions routinely send
/// `null` for attributes the page does not carry.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
