//! Platform directory resolvers
//!
//! A resolver answers one question: where do the user data, config and cache
//! roots live on this machine. Both resolvers are plain data so they can be
//! built by hand in tests; [`NativeResolver`] picks the one for the target.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use emufs_fs::is_directory;
use tracing::info;

use crate::paths::{CACHE_DIR, CONFIG_DIR, EMU_DATA_DIR, USERDATA_DIR};
use crate::{ConfigError, Result};

#[cfg(not(windows))]
pub type NativeResolver = XdgResolver;
#[cfg(windows)]
pub type NativeResolver = WindowsResolver;

/// Resolved base directories for one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirs {
    /// Directory holding the executable
    pub root_dir: PathBuf,
    pub user_dir: PathBuf,
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// Data lives next to the executable
    pub portable: bool,
}

impl BaseDirs {
    fn portable(root_dir: &Path, user_dir: PathBuf) -> Self {
        Self {
            root_dir: root_dir.to_path_buf(),
            config_dir: user_dir.join(CONFIG_DIR),
            cache_dir: user_dir.join(CACHE_DIR),
            user_dir,
            portable: true,
        }
    }
}

pub trait DirectoryResolver {
    fn base_dirs(&self) -> Result<BaseDirs>;

    fn home_dir(&self) -> Result<PathBuf>;
}

/// Directory holding the running executable, or `.` if unknown
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Look for `<root>/user` and use it when present
fn portable_user_dir(root_dir: &Path) -> Option<PathBuf> {
    let user_dir = root_dir.join(USERDATA_DIR);
    if is_directory(&user_dir) {
        info!("Using the local user directory {}", user_dir.display());
        Some(user_dir)
    } else {
        None
    }
}

/// XDG base directory variables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XdgVar {
    Data,
    Config,
    Cache,
}

impl XdgVar {
    pub fn env_name(self) -> &'static str {
        match self {
            XdgVar::Data => "XDG_DATA_HOME",
            XdgVar::Config => "XDG_CONFIG_HOME",
            XdgVar::Cache => "XDG_CACHE_HOME",
        }
    }

    /// Location under `$HOME` when the variable is unset
    pub fn fallback(self) -> &'static str {
        match self {
            XdgVar::Data => ".local/share",
            XdgVar::Config => ".config",
            XdgVar::Cache => ".cache",
        }
    }
}

/// POSIX layout following the XDG Base Directory Specification
#[derive(Debug, Clone, Default)]
pub struct XdgResolver {
    root_dir: PathBuf,
    home: Option<PathBuf>,
    data_home: Option<OsString>,
    config_home: Option<OsString>,
    cache_home: Option<OsString>,
}

impl XdgResolver {
    /// Resolver with nothing but an executable directory; add the rest with
    /// the `with_*` builders
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Read `HOME` (falling back to the password database) and the XDG
    /// variables from the process environment
    pub fn from_env() -> Self {
        let var = |v: XdgVar| std::env::var_os(v.env_name()).filter(|value| !value.is_empty());
        Self {
            root_dir: executable_dir(),
            home: dirs::home_dir(),
            data_home: var(XdgVar::Data),
            config_home: var(XdgVar::Config),
            cache_home: var(XdgVar::Cache),
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_var(mut self, var: XdgVar, value: impl Into<OsString>) -> Self {
        let value = Some(value.into());
        match var {
            XdgVar::Data => self.data_home = value,
            XdgVar::Config => self.config_home = value,
            XdgVar::Cache => self.cache_home = value,
        }
        self
    }

    fn var(&self, var: XdgVar) -> Option<&OsString> {
        match var {
            XdgVar::Data => self.data_home.as_ref(),
            XdgVar::Config => self.config_home.as_ref(),
            XdgVar::Cache => self.cache_home.as_ref(),
        }
    }

    /// Value of an XDG variable, or its default under the home directory
    pub fn user_directory(&self, var: XdgVar) -> Result<PathBuf> {
        let dir = match self.var(var) {
            Some(value) => PathBuf::from(value),
            None => self.home_dir()?.join(var.fallback()),
        };

        if !dir.is_absolute() {
            return Err(ConfigError::RelativeUserDir {
                var: var.env_name(),
                path: dir,
            });
        }
        Ok(dir)
    }
}

impl DirectoryResolver for XdgResolver {
    fn base_dirs(&self) -> Result<BaseDirs> {
        if let Some(user_dir) = portable_user_dir(&self.root_dir) {
            return Ok(BaseDirs::portable(&self.root_dir, user_dir));
        }

        Ok(BaseDirs {
            root_dir: self.root_dir.clone(),
            user_dir: self.user_directory(XdgVar::Data)?.join(EMU_DATA_DIR),
            config_dir: self.user_directory(XdgVar::Config)?.join(EMU_DATA_DIR),
            cache_dir: self.user_directory(XdgVar::Cache)?.join(EMU_DATA_DIR),
            portable: false,
        })
    }

    fn home_dir(&self) -> Result<PathBuf> {
        self.home.clone().ok_or(ConfigError::HomeNotFound)
    }
}

/// Windows layout: exe-relative `user` directory, else roaming app data
#[derive(Debug, Clone, Default)]
pub struct WindowsResolver {
    root_dir: PathBuf,
    roaming_app_data: Option<PathBuf>,
    profile: Option<PathBuf>,
}

impl WindowsResolver {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self {
            root_dir: executable_dir(),
            roaming_app_data: dirs::data_dir(),
            profile: dirs::home_dir(),
        }
    }

    pub fn with_roaming_app_data(mut self, dir: impl Into<PathBuf>) -> Self {
        self.roaming_app_data = Some(dir.into());
        self
    }

    pub fn with_profile(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile = Some(dir.into());
        self
    }
}

impl DirectoryResolver for WindowsResolver {
    fn base_dirs(&self) -> Result<BaseDirs> {
        if let Some(user_dir) = portable_user_dir(&self.root_dir) {
            return Ok(BaseDirs::portable(&self.root_dir, user_dir));
        }

        let roaming = self
            .roaming_app_data
            .as_ref()
            .ok_or(ConfigError::AppDataNotFound)?;
        let user_dir = roaming.join(EMU_DATA_DIR);
        Ok(BaseDirs {
            root_dir: self.root_dir.clone(),
            config_dir: user_dir.join(CONFIG_DIR),
            cache_dir: user_dir.join(CACHE_DIR),
            user_dir,
            portable: false,
        })
    }

    fn home_dir(&self) -> Result<PathBuf> {
        self.profile.clone().ok_or(ConfigError::HomeNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xdg_fallbacks_under_home() {
        let resolver = XdgResolver::new("/nonexistent/bin").with_home("/home/tester");

        assert_eq!(
            resolver.user_directory(XdgVar::Data).unwrap(),
            PathBuf::from("/home/tester/.local/share")
        );
        assert_eq!(
            resolver.user_directory(XdgVar::Config).unwrap(),
            PathBuf::from("/home/tester/.config")
        );
        assert_eq!(
            resolver.user_directory(XdgVar::Cache).unwrap(),
            PathBuf::from("/home/tester/.cache")
        );
    }

    #[test]
    fn test_xdg_variable_wins_over_home() {
        let resolver = XdgResolver::new("/nonexistent/bin")
            .with_home("/home/tester")
            .with_var(XdgVar::Config, "/etc/xdg-override");

        assert_eq!(
            resolver.user_directory(XdgVar::Config).unwrap(),
            PathBuf::from("/etc/xdg-override")
        );
    }

    #[test]
    fn test_xdg_missing_home_is_an_error() {
        let resolver = XdgResolver::new("/nonexistent/bin");

        assert!(matches!(
            resolver.user_directory(XdgVar::Data),
            Err(ConfigError::HomeNotFound)
        ));
        assert!(resolver.base_dirs().is_err());
    }

    #[test]
    fn test_xdg_relative_value_is_rejected() {
        let resolver = XdgResolver::new("/nonexistent/bin")
            .with_home("/home/tester")
            .with_var(XdgVar::Cache, "relative/cache");

        match resolver.user_directory(XdgVar::Cache) {
            Err(ConfigError::RelativeUserDir { var, .. }) => assert_eq!(var, "XDG_CACHE_HOME"),
            other => panic!("Expected RelativeUserDir, got {:?}", other),
        }
    }

    #[test]
    fn test_windows_requires_app_data() {
        let resolver = WindowsResolver::new("/nonexistent/bin");
        assert!(matches!(
            resolver.base_dirs(),
            Err(ConfigError::AppDataNotFound)
        ));
    }
}
