use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use relgate_validate::SlotPaths;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub refs: RefsConfig,
    #[serde(default)]
    pub slots: SlotPaths,
    #[serde(default)]
    pub git: GitConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefsConfig {
    pub base: String,
    pub head: String,
}

impl Default for RefsConfig {
    fn default() -> Self {
        Self {
            base: "origin/main".to_string(),
            head: "HEAD".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub program: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self { program: "git".to_string() }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    /// An explicit path must exist; the repo-local file is optional.
    pub fn load(repo_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(anyhow!("config file {} not found", path.display()));
            }
            return Self::load_from(path);
        }
        let path = Self::config_path(repo_root);
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            return Self::load_from(&path);
        }
        Ok(Self::default())
    }

    /// Writes the default config unless one is already there. Returns the path
    /// and whether it was created.
    pub fn init(repo_root: &Path) -> Result<(PathBuf, bool)> {
        let path = Self::config_path(repo_root);
        if path.exists() {
            return Ok((path, false));
        }
        Self::default().save_to(&path)?;
        Ok((path, true))
    }

    pub fn git_program(&self) -> String {
        shellexpand::tilde(&self.git.program).to_string()
    }

    pub fn config_path(repo_root: &Path) -> PathBuf {
        repo_root.join(".relgate").join("relgate.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempdir().unwrap();
        let cfg = Config::load(dir.path(), None).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.refs.base, "origin/main");
        assert_eq!(cfg.slots.index_html, "frontend/index.html");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = Config::config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[refs]\nbase = \"upstream/release\"\n").unwrap();

        let cfg = Config::load(dir.path(), None).unwrap();
        assert_eq!(cfg.refs.base, "upstream/release");
        assert_eq!(cfg.refs.head, "HEAD");
        assert_eq!(cfg.slots.checksums, "CHECKSUMS.json");
        assert_eq!(cfg.git.program, "git");
    }

    #[test]
    fn init_round_trips_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let (path, created) = Config::init(dir.path()).unwrap();
        assert!(created);
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
        let (_, created_again) = Config::init(dir.path()).unwrap();
        assert!(!created_again);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(dir.path(), Some(missing.as_path())).is_err());
    }

    #[test]
    fn git_program_plain_name_is_untouched() {
        let mut cfg = Config::default();
        assert_eq!(cfg.git_program(), "git");
        cfg.git.program = "/usr/local/bin/git".to_string();
        assert_eq!(cfg.git_program(), "/usr/local/bin/git");
    }
}
