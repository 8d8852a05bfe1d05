//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no command-line root is given.
pub const ROOT_ENV_VAR: &str = "CHORDBOARD_ROOT";

/// Database filename inside the root folder.
pub const DATABASE_FILENAME: &str = "chordboard.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `CHORDBOARD_ROOT` environment variable
/// 3. `root_folder` key in the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Create the root folder if it does not exist yet.
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Database path inside the root folder.
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILENAME)
}

/// Get configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("chordboard").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/chordboard/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("chordboard"))
        .unwrap_or_else(|| PathBuf::from("./chordboard_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_takes_priority() {
        let root = resolve_root_folder(Some("/tmp/cb-test-root"));
        assert_eq!(root, PathBuf::from("/tmp/cb-test-root"));
    }

    #[test]
    fn default_root_is_not_empty() {
        let root = default_root_folder();
        assert!(!root.as_os_str().is_empty());
    }

    #[test]
    fn database_path_appends_filename() {
        let db = database_path(Path::new("/data/cb"));
        assert_eq!(db, PathBuf::from("/data/cb/chordboard.db"));
    }

    #[test]
    fn ensure_root_folder_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("root");
        ensure_root_folder(&root).unwrap();
        assert!(root.is_dir());
    }
}
