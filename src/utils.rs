use crate::error::{DiscoveryError, Result};

/// Parses a boolean setting or attribute value.
///
/// Only the exact lexical forms `true` and `false` are accepted. Anything else,
/// including `1`, `yes` or `TRUE`, is a configuration error naming `key`.
pub fn parse_bool_exact(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DiscoveryError::config(format!(
            "Failed to parse value [{}] for [{}], expected [true] or [false]",
            other, key
        ))),
    }
}

/// Like [`parse_bool_exact`], with a default for missing values.
pub fn parse_bool_or(key: &str, value: Option<&str>, default: bool) -> Result<bool> {
    match value {
        Some(value) => parse_bool_exact(key, value),
        None => Ok(default),
    }
}
