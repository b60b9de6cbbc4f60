//! Directory configuration.
//!
//! Precedence: command line flags (and their `LCA_*` environment fallbacks),
//! then the nearest `lca.toml` found searching upward from the current
//! directory, then defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "lca.toml";

/// Store directory used when nothing else is configured, relative to the
/// project directory.
pub const DEFAULT_STORE_DIR: &str = ".lca";

/// Contents of `lca.toml`. Relative paths are relative to the file itself.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub project_dir: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub project_dir: PathBuf,
    pub store_dir: PathBuf,
    pub config_file: Option<PathBuf>,
}

fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn read_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid {}", path.display()))
}

pub fn resolve(
    project_dir: Option<PathBuf>,
    store_dir: Option<PathBuf>,
    cwd: &Path,
) -> Result<Paths> {
    let config_file = find_config(cwd);
    let file_config = match &config_file {
        Some(path) => {
            log::debug!("Using {}", path.display());
            read_config(path)?
        }
        None => FileConfig::default(),
    };
    let config_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(cwd);

    let project_dir = match project_dir {
        Some(dir) => cwd.join(dir),
        None => file_config
            .project_dir
            .map_or_else(|| cwd.to_path_buf(), |dir| config_dir.join(dir)),
    };
    let store_dir = match store_dir {
        Some(dir) => cwd.join(dir),
        None => file_config
            .store_dir
            .map_or_else(|| project_dir.join(DEFAULT_STORE_DIR), |dir| config_dir.join(dir)),
    };

    Ok(Paths {
        project_dir,
        store_dir,
        config_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = resolve(None, None, dir.path()).unwrap();
        assert_eq!(paths.project_dir, dir.path());
        assert_eq!(paths.store_dir, dir.path().join(".lca"));
        assert_eq!(paths.config_file, None);
    }

    #[test]
    fn config_file_is_found_upward_and_relative_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "project_dir = \"site\"\nstore_dir = \"state\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let paths = resolve(None, None, &nested).unwrap();
        assert_eq!(paths.project_dir, dir.path().join("site"));
        assert_eq!(paths.store_dir, dir.path().join("state"));
        assert_eq!(paths.config_file, Some(dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "store_dir = \"state\"\n").unwrap();

        let paths = resolve(Some("work".into()), Some("elsewhere".into()), dir.path()).unwrap();
        assert_eq!(paths.project_dir, dir.path().join("work"));
        assert_eq!(paths.store_dir, dir.path().join("elsewhere"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "stor_dir = \"x\"\n").unwrap();
        assert!(resolve(None, None, dir.path()).is_err());
    }
}
