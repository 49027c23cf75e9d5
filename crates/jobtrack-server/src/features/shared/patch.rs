//! Partial-update helpers
//!
//! PATCH bodies distinguish a field that was left out from one explicitly set
//! to `null`. Nullable columns use `Option<Option<T>>` with
//! [`deserialize_nullable`]:
//!
//! - field absent: `None` (leave unchanged)
//! - `"field": null`: `Some(None)` (clear)
//! - `"field": value`: `Some(Some(value))`

use serde::{Deserialize, Deserializer};

pub fn deserialize_nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
