//! Config file location.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// File name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the config directory.
const CONFIG_DIR_ENV: &str = "TVMETA_CONFIG_DIR";

/// Subdirectory under the user config home.
const APP_DIR: &str = "tvmeta";

/// Resolves the config file path.
///
/// The directory is the first of:
///
/// - `dir` (`--dir`)
/// - `$TVMETA_CONFIG_DIR`
/// - `$XDG_CONFIG_HOME/tvmeta`
/// - `$HOME/.config/tvmeta`
///
/// Empty environment variables are ignored.
///
/// # Errors
///
/// Returns an error if none of the above is available.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    config_path_with(dir, std::env::var_os)
}

fn config_path_with(
    dir: Option<&PathBuf>,
    env: impl Fn(&'static str) -> Option<OsString>,
) -> Result<PathBuf> {
    let var = |key: &'static str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);

    let base = if let Some(d) = dir {
        d.clone()
    } else if let Some(d) = var(CONFIG_DIR_ENV) {
        d
    } else if let Some(xdg) = var("XDG_CONFIG_HOME") {
        xdg.join(APP_DIR)
    } else {
        var("HOME")
            .context("cannot locate config: set --dir, TVMETA_CONFIG_DIR, XDG_CONFIG_HOME or HOME")?
            .join(".config")
            .join(APP_DIR)
    };
    Ok(base.join(CONFIG_FILE))
}
