//! Validation of individual settings read from an untyped host configuration, such as the
//! arrays passed in from JavaScript. Every missing or mistyped setting is an error naming
//! the entry and the setting; nothing is replaced by a default.

use crate::bitmap::{KioskBitmap, Pixels};
use crate::error::KioskError;

#[inline]
fn invalid(entry: &str, setting: &'static str) -> KioskError {
    KioskError::InvalidSetting {
        entry: entry.to_string(),
        setting,
    }
}

/// Requires a non-blank string.
pub(crate) fn required_text(
    value: Option<String>,
    entry: &str,
    setting: &'static str,
) -> Result<String, KioskError> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| invalid(entry, setting))
}

/// Requires a boolean. Strings such as `"false"` are refused rather than coerced.
pub(crate) fn required_flag(
    value: Option<bool>,
    entry: &str,
    setting: &'static str,
) -> Result<bool, KioskError> {
    value.ok_or_else(|| invalid(entry, setting))
}

/// Requires a whole number of pixels between 1 and [KioskBitmap::MAX_DIMENSION].
pub(crate) fn required_size(
    value: Option<f64>,
    entry: &str,
    setting: &'static str,
) -> Result<Pixels, KioskError> {
    match value {
        Some(size)
            if size.fract() == 0.0
                && size >= 1.0
                && size <= f64::from(KioskBitmap::MAX_DIMENSION) =>
        {
            Ok(size as Pixels)
        }
        _ => Err(invalid(entry, setting)),
    }
}
