//! The optional TOML settings file.
//!
//! ```toml
//! [catalog]
//! source = "vendor/win32json"
//! branch = "10.0.19041.202-preview"
//! sha = "7164f4ce9fe17b7c5da3473eed26886753ce1173"
//! remote = "https://github.com/marlersoft/win32json"
//!
//! [output]
//! dir = "canonical"
//! ```
//!
//! Every key is optional. Relative paths are taken from the directory that
//! holds the file.

use std::fs;
use std::path::{Path, PathBuf};

use apicanon_core::CatalogConfig;
use serde::Deserialize;
use tracing::debug;

/// Where `emit` writes when neither a flag nor the config file says otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Resolved settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Location and pinned revision of the metadata checkout.
    pub catalog: CatalogConfig,
    /// Where canonical documents go.
    pub output: OutputSettings,
}

/// The `[output]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Output directory for `emit`.
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read a settings file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read config file {}: {err}", path.display()))?;
        let mut settings = Self::from_toml(&contents)
            .map_err(|err| format!("Failed to parse config file {}: {err}", path.display()))?;

        if let Some(base) = path.parent() {
            settings.catalog.source = base.join(&settings.catalog.source);
            settings.output.dir = base.join(&settings.output.dir);
        }

        debug!(config = %path.display(), "Loaded settings file.");
        Ok(settings)
    }
}
