//! Settings for loading and exporting levels.
//!
//! Both structs deserialize with missing fields filled from their defaults,
//! so a host can keep them in its own config files.

use crate::error::WriteError;
use crate::version::Version;
use serde::{Deserialize, Serialize};

/// Settings for [`Level::from_bytes_with`](crate::Level::from_bytes_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Inflate the four streams on the rayon thread pool.
    pub parallel: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions { parallel: true }
    }
}

/// Settings for [`Level::export`](crate::Level::export).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Raw version to write. Defaults to the level's own version.
    pub version: Option<u16>,
    /// Deflate the four streams on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            version: None,
            parallel: true,
        }
    }
}

impl ExportOptions {
    /// Export options targeting a version.
    #[must_use]
    pub fn for_version(version: Version) -> Self {
        ExportOptions {
            version: Some(version.raw()),
            ..ExportOptions::default()
        }
    }

    /// Resolves the version to write, falling back to `current`.
    ///
    /// # Errors
    /// Errors if the configured version isn't a recognized one.
    pub fn resolve_version(&self, current: Version) -> Result<Version, WriteError> {
        match self.version {
            None => Ok(current),
            Some(raw) => Version::try_from(raw).map_err(WriteError::UnsupportedVersion),
        }
    }
}
