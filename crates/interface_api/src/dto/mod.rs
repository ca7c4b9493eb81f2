//! Request/response data transfer objects

pub mod student;
pub mod payment;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field from an explicit `null`
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: absent
/// gives `None`, `null` gives `Some(None)`, a value gives `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
