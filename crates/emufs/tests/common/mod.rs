//! Common test utilities for emufs integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Test environment with isolated home and XDG directories
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub data_home: PathBuf,
    pub config_home: PathBuf,
    pub cache_home: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let data_home = temp_dir.path().join("data");
        let config_home = temp_dir.path().join("config");
        let cache_home = temp_dir.path().join("cache");

        Ok(Self {
            temp_dir,
            data_home,
            config_home,
            cache_home,
        })
    }

    /// `$XDG_DATA_HOME/emufs`
    pub fn user_dir(&self) -> PathBuf {
        self.data_home.join("emufs")
    }

    /// `$XDG_CONFIG_HOME/emufs`
    pub fn config_dir(&self) -> PathBuf {
        self.config_home.join("emufs")
    }

    /// Path to a scratch location inside the temp directory
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Create a command with environment variables set to use the test environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_emufs"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("XDG_DATA_HOME", &self.data_home);
        cmd.env("XDG_CONFIG_HOME", &self.config_home);
        cmd.env("XDG_CACHE_HOME", &self.cache_home);
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}
