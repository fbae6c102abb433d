//! Configuration module for med-aggregator
//!
//! Settings come from a YAML file (when one is found) overlaid with
//! environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "MEDAGG_SETTINGS_PATH";

/// Load settings from the first settings file found, or defaults.
///
/// Returns the file that was used so the caller can report it once logging
/// is set up.
pub fn load() -> Result<(Settings, Option<PathBuf>)> {
    let path = find_settings_file();
    let settings = load_from(path.as_deref())?;
    Ok((settings, path))
}

/// Load settings from a file (or defaults) and overlay the environment
pub fn load_from(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    settings.merge_env();
    Ok(settings)
}

/// Candidate settings locations, in lookup order
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        paths.push(PathBuf::from(path));
    }
    paths.push(PathBuf::from("settings.yml"));
    paths.push(PathBuf::from("config/settings.yml"));
    paths.push(PathBuf::from("/etc/med-aggregator/settings.yml"));
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("med-aggregator/settings.yml"));
    }
    paths
}

fn find_settings_file() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_paths_include_local_file() {
        let paths = candidate_paths();
        assert!(paths.contains(&PathBuf::from("settings.yml")));
        assert!(paths.contains(&PathBuf::from("/etc/med-aggregator/settings.yml")));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("medagg-{}.yml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "limiter:\n  requests: 7\n").unwrap();

        let settings = load_from(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.limiter.requests, 7);
        assert_eq!(settings.limiter.period, 3600);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("medagg-{}.yml", uuid::Uuid::new_v4()));
        assert!(load_from(Some(&path)).is_err());
    }
}
