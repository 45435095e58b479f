//! Forgiving field deserializers.
//!
//! `#[serde(default)]` only covers absent keys. These helpers also turn an
//! explicit `null` or a value of the wrong type or range into the field's
//! default, so one odd field never rejects a whole slide.

use crate::types::DEFAULT_FONT_SIZE;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A string, or `""` for anything else.
pub(crate) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// A boolean, or `false` for anything else.
pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// A whole non-negative number that fits in `u32`, or 0.
pub(crate) fn level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let level = Value::deserialize(deserializer)?
        .as_f64()
        .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32)
        .unwrap_or(0);
    Ok(level)
}

/// A positive font size in points, or [`DEFAULT_FONT_SIZE`].
pub(crate) fn font_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let size = Value::deserialize(deserializer)?
        .as_f64()
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(DEFAULT_FONT_SIZE);
    Ok(size)
}

/// A whole number that fits in `i32`, or 0.
pub(crate) fn offset<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let offset = Value::deserialize(deserializer)?
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(0);
    Ok(offset)
}

/// `null` becomes the type's default; anything else deserializes normally.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
