use serde::{Deserialize, Deserializer};

/// Reads `null` as the type's default. `#[serde(default)]` only covers a
/// missing field, and oracle answers use `null` just as often.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
