use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    magic::{
        CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENV_SCAN_CONFIG_PATH, OLD_MANGLING_MARKER,
        SWIFT_ENTRY_POINT_PREFIXES,
    },
    utils::error::{DyError, DyResult},
};

/// Options controlling how a symbol table is turned into an inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Abort the scan on the first classification failure instead of
    /// recording it as a diagnostic.
    pub strict: bool,

    /// Skip decoded functions whose member name is privatized.
    pub skip_privatized: bool,

    /// Only symbols starting with one of these prefixes are decoded.
    pub entry_point_prefixes: Vec<String>,

    /// If any symbol of the image starts with this marker, the whole image is
    /// decoded with the older mangling scheme.
    pub old_mangling_marker: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            strict: false,
            skip_privatized: true,
            entry_point_prefixes: SWIFT_ENTRY_POINT_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
            old_mangling_marker: OLD_MANGLING_MARKER.to_string(),
        }
    }
}

impl ScanOptions {
    /// Get the default path to the scan configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_SCAN_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();

        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                path.push(appdata);
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                path.push(xdg_config_home);
            } else if let Ok(home) = std::env::var("HOME") {
                path.push(home);
                path.push(".config");
            } else {
                // Fallback to current directory if HOME is not set
            }
        }

        path.push(CONFIG_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        path
    }

    /// Load options from the default path, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default() -> DyResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from_toml(&path)
        } else {
            log::debug!(
                "no scan configuration at `{}`, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(toml_str: &str, file: &str) -> DyResult<Self> {
        toml::from_str(toml_str).map_err(|e| DyError::ConfigParseError {
            source: e,
            file: file.to_string(),
        })
    }

    /// Load ScanOptions from a TOML file.
    pub fn load_from_toml(path: &Path) -> DyResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml_str, &path.display().to_string())
    }

    /// Save ScanOptions to a TOML file.
    pub fn save_to_toml(&self, path: &Path) -> DyResult<()> {
        let toml_str = toml::to_string(self).map_err(|e| DyError::ConfigSerializeError {
            source: e,
            file: path.display().to_string(),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Returns `true` if `symbol` should be handed to the decoder.
    pub fn is_entry_point(&self, symbol: &str) -> bool {
        !symbol.is_empty()
            && self
                .entry_point_prefixes
                .iter()
                .any(|prefix| symbol.starts_with(prefix.as_str()))
    }

    /// Returns `true` if any of `symbols` marks the image as using the older
    /// mangling scheme.
    pub fn uses_old_mangling<'a>(&self, mut symbols: impl Iterator<Item = &'a str>) -> bool {
        symbols.any(|symbol| symbol.starts_with(self.old_mangling_marker.as_str()))
    }
}
