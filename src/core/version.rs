//! Version identifier normalization
//!
//! Versions are opaque: no semver parsing or ordering happens here. The only
//! rule is that leading `v`s are dropped, so `v1.17.1` and `1.17.1` name the
//! same download and the same install directory. Normalizing twice is a no-op.

use crate::error::{Error, Result};

/// Strip leading `v`s and reject what remains if it is empty.
pub fn normalize(version: &str) -> Result<String> {
    let version = version.trim_start_matches('v');
    if version.is_empty() {
        return Err(Error::EmptyVersion);
    }
    Ok(version.to_string())
}

/// Format a normalized version for display (`1.17.1` -> `v1.17.1`).
pub fn display(version: &str) -> String {
    format!("v{}", version)
}
