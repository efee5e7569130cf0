//! User settings.
//!
//! # Storage layout
//!
//! ```text
//! ~/.texforge/
//!   config.yaml
//! ```
//!
//! Every function has an `_at(home)` form taking an explicit home directory
//! and a convenience form that uses `dirs::home_dir()`. Tests use `_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default template directory, relative to the working directory.
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// Environment variable overriding the template directory.
pub const TEMPLATE_DIR_ENV: &str = "TEXFORGE_TEMPLATE_DIR";

pub const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 120;

fn default_engines() -> Vec<String> {
    ["tectonic", "xelatex", "pdflatex"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_timeout() -> u64 {
    DEFAULT_COMPILE_TIMEOUT_SECS
}

/// Contents of `config.yaml`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,

    /// Engines tried in order when compiling with fallback.
    #[serde(default = "default_engines")]
    pub engines: Vec<String>,

    #[serde(default = "default_timeout")]
    pub compile_timeout_secs: u64,

    /// Project root that holds `assets/`. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            template_dir: None,
            engines: default_engines(),
            compile_timeout_secs: DEFAULT_COMPILE_TIMEOUT_SECS,
            assets_root: None,
        }
    }
}

impl Settings {
    /// Pick the template directory: `flag`, then `env`, then the settings
    /// file, then `./templates`.
    pub fn template_dir(&self, flag: Option<&Path>, env: Option<&str>) -> PathBuf {
        if let Some(dir) = flag {
            return dir.to_path_buf();
        }
        if let Some(dir) = env.filter(|s| !s.trim().is_empty()) {
            return PathBuf::from(dir);
        }
        self.template_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_DIR))
    }

    pub fn assets_root(&self) -> PathBuf {
        self.assets_root.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// `<home>/.texforge/config.yaml`. Pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".texforge").join("config.yaml")
}

/// Load settings, falling back to defaults when the file does not exist.
pub fn load_at(home: &Path) -> Result<Settings, ConfigError> {
    let path = settings_path_at(home);
    if !path.exists() {
        tracing::debug!("no settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, ConfigError> {
    load_at(&home()?)
}

/// Write settings through a temp file and rename.
pub fn save_at(home: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let path = settings_path_at(home);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    let tmp_path = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| ConfigError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, &path).map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(settings: &Settings) -> Result<(), ConfigError> {
    save_at(&home()?, settings)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
