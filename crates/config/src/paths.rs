//! User directory registry

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{OnceLock, PoisonError, RwLock};

use emufs_fs::{create_dirs, is_directory, DIR_SEP};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::platform::{DirectoryResolver, NativeResolver};
use crate::{ConfigError, Result};

/// Application data directory name under the platform data roots
pub const EMU_DATA_DIR: &str = "emufs";
/// Portable user directory next to the executable
pub const USERDATA_DIR: &str = "user";
pub const CONFIG_DIR: &str = "config";
pub const CACHE_DIR: &str = "cache";
pub const SDMC_DIR: &str = "sdmc";
pub const NAND_DIR: &str = "nand";
pub const LOAD_DIR: &str = "load";
pub const DUMP_DIR: &str = "dump";
pub const SCREENSHOTS_DIR: &str = "screenshots";
pub const SHADER_DIR: &str = "shader";
pub const SYSDATA_DIR: &str = "sysdata";
pub const KEYS_DIR: &str = "keys";
pub const LOG_DIR: &str = "log";

/// Directory read by external key tooling, under the home directory
pub const EXTERNAL_KEYS_DIR: &str = ".switch";

/// Logical directories the emulator needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserPath {
    RootDir,
    UserDir,
    ConfigDir,
    CacheDir,
    SdmcDir,
    NandDir,
    LoadDir,
    DumpDir,
    ScreenshotsDir,
    ShaderDir,
    SysDataDir,
    KeysDir,
    LogDir,
}

impl UserPath {
    pub const ALL: [UserPath; 13] = [
        UserPath::RootDir,
        UserPath::UserDir,
        UserPath::ConfigDir,
        UserPath::CacheDir,
        UserPath::SdmcDir,
        UserPath::NandDir,
        UserPath::LoadDir,
        UserPath::DumpDir,
        UserPath::ScreenshotsDir,
        UserPath::ShaderDir,
        UserPath::SysDataDir,
        UserPath::KeysDir,
        UserPath::LogDir,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserPath::RootDir => "root_dir",
            UserPath::UserDir => "user_dir",
            UserPath::ConfigDir => "config_dir",
            UserPath::CacheDir => "cache_dir",
            UserPath::SdmcDir => "sdmc_dir",
            UserPath::NandDir => "nand_dir",
            UserPath::LoadDir => "load_dir",
            UserPath::DumpDir => "dump_dir",
            UserPath::ScreenshotsDir => "screenshots_dir",
            UserPath::ShaderDir => "shader_dir",
            UserPath::SysDataDir => "sys_data_dir",
            UserPath::KeysDir => "keys_dir",
            UserPath::LogDir => "log_dir",
        }
    }

    /// Subdirectory name under the user directory, for categories that
    /// always live there
    pub fn subdirectory(self) -> Option<&'static str> {
        match self {
            UserPath::SdmcDir => Some(SDMC_DIR),
            UserPath::NandDir => Some(NAND_DIR),
            UserPath::LoadDir => Some(LOAD_DIR),
            UserPath::DumpDir => Some(DUMP_DIR),
            UserPath::ScreenshotsDir => Some(SCREENSHOTS_DIR),
            UserPath::ShaderDir => Some(SHADER_DIR),
            UserPath::SysDataDir => Some(SYSDATA_DIR),
            UserPath::KeysDir => Some(KEYS_DIR),
            UserPath::LogDir => Some(LOG_DIR),
            UserPath::RootDir | UserPath::UserDir | UserPath::ConfigDir | UserPath::CacheDir => {
                None
            }
        }
    }
}

impl fmt::Display for UserPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        UserPath::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized || p.as_str().trim_end_matches("_dir") == normalized)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

/// Render a directory with exactly one trailing separator
fn dir_string(path: &Path) -> String {
    let mut dir = path.to_string_lossy().into_owned();
    if !dir.ends_with(|c: char| c == '/' || c == '\\') {
        dir.push(DIR_SEP);
    }
    dir
}

/// Category to directory mapping.
///
/// Every category has a non-empty entry ending in a separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPaths {
    paths: BTreeMap<UserPath, String>,
    home: Option<PathBuf>,
    portable: bool,
}

impl UserPaths {
    /// Derive every category from the resolver's base directories
    pub fn resolve(resolver: &impl DirectoryResolver) -> Result<Self> {
        let base = resolver.base_dirs()?;

        let mut paths = BTreeMap::new();
        paths.insert(UserPath::RootDir, dir_string(&base.root_dir));
        paths.insert(UserPath::UserDir, dir_string(&base.user_dir));
        paths.insert(UserPath::ConfigDir, dir_string(&base.config_dir));
        paths.insert(UserPath::CacheDir, dir_string(&base.cache_dir));

        let mut user_paths = Self {
            paths,
            home: resolver.home_dir().ok(),
            portable: base.portable,
        };
        user_paths.derive_from_user_dir(false);

        debug!("User directory set to {}", user_paths.get(UserPath::UserDir));
        Ok(user_paths)
    }

    /// Recompute the categories that live under the user directory
    fn derive_from_user_dir(&mut self, include_config_and_cache: bool) {
        let user_dir = self.get(UserPath::UserDir).to_string();

        if include_config_and_cache {
            self.paths
                .insert(UserPath::ConfigDir, format!("{user_dir}{CONFIG_DIR}{DIR_SEP}"));
            self.paths
                .insert(UserPath::CacheDir, format!("{user_dir}{CACHE_DIR}{DIR_SEP}"));
        }

        for path in UserPath::ALL {
            if let Some(name) = path.subdirectory() {
                self.paths.insert(path, format!("{user_dir}{name}{DIR_SEP}"));
            }
        }
    }

    pub fn get(&self, path: UserPath) -> &str {
        self.paths.get(&path).map(String::as_str).unwrap_or_default()
    }

    /// Point a category at an existing directory.
    ///
    /// Rejected (logged, previous value kept) unless `new_path` is a
    /// directory. Moving the root or user directory recomputes everything
    /// that lives under it.
    pub fn set(&mut self, path: UserPath, new_path: &str) -> bool {
        if !is_directory(new_path) {
            error!("Invalid path specified {}", new_path);
            return false;
        }

        let value = dir_string(Path::new(new_path));
        debug!("{} set to {}", path, value);

        match path {
            UserPath::RootDir => {
                self.paths.insert(UserPath::RootDir, value.clone());
                self.paths.insert(UserPath::UserDir, value);
                self.derive_from_user_dir(true);
            }
            UserPath::UserDir => {
                self.paths.insert(UserPath::UserDir, value);
                self.derive_from_user_dir(true);
            }
            other => {
                self.paths.insert(other, value);
            }
        }
        true
    }

    /// Data lives next to the executable
    pub fn is_portable(&self) -> bool {
        self.portable
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserPath, &str)> {
        self.paths.iter().map(|(path, dir)| (*path, dir.as_str()))
    }

    /// Registered content directory inside the NAND
    pub fn nand_registration_dir(&self, system: bool) -> String {
        let partition = if system { "system" } else { "user" };
        format!(
            "{}{partition}{DIR_SEP}Contents{DIR_SEP}registered{DIR_SEP}",
            self.get(UserPath::NandDir)
        )
    }

    /// `~/.switch`, where external key tooling keeps its key files
    pub fn external_keys_dir(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join(EXTERNAL_KEYS_DIR))
    }

    /// Create every registered directory except the executable directory
    pub fn create_all(&self) -> bool {
        self.iter()
            .filter(|(path, _)| *path != UserPath::RootDir)
            .fold(true, |ok, (_, dir)| create_dirs(dir) && ok)
    }
}

static USER_PATHS: OnceLock<RwLock<UserPaths>> = OnceLock::new();

fn registry() -> &'static RwLock<UserPaths> {
    USER_PATHS.get_or_init(|| {
        let paths = UserPaths::resolve(&NativeResolver::from_env())
            .unwrap_or_else(|e| panic!("Unable to derive user directories: {e}"));
        RwLock::new(paths)
    })
}

/// Install a pre-built registry as the process-wide one.
///
/// Fails, handing the registry back, if the global registry was already
/// initialised.
pub fn install_user_paths(paths: UserPaths) -> std::result::Result<(), UserPaths> {
    USER_PATHS
        .set(RwLock::new(paths))
        .map_err(|lock| lock.into_inner().unwrap_or_else(PoisonError::into_inner))
}

/// Directory for `path` from the process-wide registry.
///
/// The registry is derived from the environment on first use; a missing home
/// directory aborts the process. A non-empty `override_path` is applied first
/// with the rules of [`UserPaths::set`].
pub fn user_path(path: UserPath, override_path: Option<&str>) -> String {
    let lock = registry();

    if let Some(new_path) = override_path.filter(|p| !p.is_empty()) {
        lock.write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(path, new_path);
    }

    lock.read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(path)
        .to_string()
}

/// Copy of the process-wide registry
pub fn user_paths() -> UserPaths {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
