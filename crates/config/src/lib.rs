//! User directory configuration for emufs
//!
//! Derives the emulator's data directories from platform conventions and
//! applies user overrides persisted in `paths.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;
pub mod platform;

pub use paths::{install_user_paths, user_path, user_paths, UserPath, UserPaths};
pub use platform::{BaseDirs, DirectoryResolver, NativeResolver, WindowsResolver, XdgResolver, XdgVar};

/// Name of the override file inside the config directory
pub const OVERRIDES_FILE: &str = "paths.json";

/// Errors in configuration handling
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed override file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("home directory not found: HOME is unset and the current user has no password entry")]
    HomeNotFound,

    #[error("roaming application data directory not found")]
    AppDataNotFound,

    #[error("user directory {var} must be absolute, got {path:?}")]
    RelativeUserDir { var: &'static str, path: PathBuf },

    #[error("unknown path category: {0}")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Per-category directory overrides persisted as JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathOverrides {
    pub paths: BTreeMap<UserPath, String>,
}

impl PathOverrides {
    /// Location of the override file for a registry
    pub fn default_path(user_paths: &UserPaths) -> PathBuf {
        Path::new(user_paths.get(UserPath::ConfigDir)).join(OVERRIDES_FILE)
    }

    /// Load overrides; a missing file means no overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No path overrides at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        debug!("Reading path overrides from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let overrides = serde_json::from_str(&content)?;
        Ok(overrides)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        debug!("Writing path overrides to {:?}", path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn insert(&mut self, path: UserPath, dir: impl Into<String>) {
        self.paths.insert(path, dir.into());
    }

    /// Apply every override to `user_paths`, root and user directory first so
    /// their cascade does not clobber more specific entries.
    ///
    /// Returns the number of overrides accepted.
    pub fn apply(&self, user_paths: &mut UserPaths) -> usize {
        let mut applied = 0;
        for (path, dir) in &self.paths {
            if user_paths.set(*path, dir) {
                applied += 1;
            } else {
                warn!("Ignoring override for {}: {} is not a directory", path, dir);
            }
        }
        applied
    }
}

/// Derive the registry for this machine and apply the overrides file found
/// in its config directory
pub fn load_user_paths(resolver: &impl DirectoryResolver) -> Result<UserPaths> {
    let mut user_paths = UserPaths::resolve(resolver)?;
    let overrides = PathOverrides::load_from(&PathOverrides::default_path(&user_paths))?;
    let applied = overrides.apply(&mut user_paths);
    if applied > 0 {
        info!("Applied {} path override(s)", applied);
    }
    Ok(user_paths)
}
