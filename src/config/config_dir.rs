use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

/// Overrides every other lookup location when set.
pub const CONFIG_PATH_ENV: &str = "SCHOOLHUB_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";

fn local_config() -> PathBuf {
    PathBuf::from(".").join(CONFIG_FILE_NAME)
}

fn user_config_dir(home: OsString) -> PathBuf {
    let base = PathBuf::from(home);
    if cfg!(windows) {
        base.join(crate::APPLICATION_NAME)
    } else {
        base.join(".config").join(crate::APPLICATION_NAME)
    }
}

/// Lookup order: explicit override, per-user file (release builds only), then
/// the working directory.
fn candidates(explicit: Option<OsString>, home: Option<OsString>, use_local: bool) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(path));
    }
    if !use_local {
        if let Some(home) = home {
            paths.push(user_config_dir(home).join(CONFIG_FILE_NAME));
        }
    }
    paths.push(local_config());
    paths
}

fn home_var() -> Option<OsString> {
    if cfg!(windows) {
        std::env::var_os("APPDATA")
    } else {
        std::env::var_os("HOME")
    }
}

pub fn find_config_file(use_local: bool) -> PathBuf {
    let paths = candidates(std::env::var_os(CONFIG_PATH_ENV), home_var(), use_local);
    first_existing(&paths).unwrap_or_else(local_config)
}

fn first_existing(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|p| p.is_file()).cloned()
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let filename = find_config_file(use_local);
    tracing::trace!("config candidate: {}", filename.display());

    if !filename.is_file() {
        return Err(ConfigError::ConfigNotFound);
    }
    read_config_at(&filename)
}

pub fn read_config_at(filename: &Path) -> ConfigResult<Vec<u8>> {
    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());
    Ok(fs::read(filename)?)
}
