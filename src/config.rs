use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("stackdown"))
}

// ============================================================================
// Config
// ============================================================================

/// User defaults, read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot used when `--snapshot` is not given
    pub snapshot: Option<String>,

    /// Destroy dependents of targets without `--target-dependents`
    pub target_dependents: bool,

    /// Print JSON without `--json`
    pub json: bool,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load config from an explicit path, or from the default location
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the expanded default snapshot path
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.snapshot.as_deref().map(|raw| {
            let expanded = shellexpand::tilde(raw);
            PathBuf::from(expanded.as_ref())
        })
    }
}

/// Pick the snapshot to read: the flag (or its env var) wins over config
pub fn resolve_snapshot_path(flag: Option<&Path>, config: &Config) -> Result<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.snapshot_path())
        .context(
            "No snapshot specified. Pass --snapshot, set STACKDOWN_SNAPSHOT, \
             or set `snapshot` in config.toml",
        )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.snapshot, None);
        assert!(!config.target_dependents);
        assert!(!config.json);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "snapshot = \"/var/lib/stacks/prod.json\"\ntarget_dependents = true\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.snapshot.as_deref(), Some("/var/lib/stacks/prod.json"));
        assert!(config.target_dependents);
        assert!(!config.json);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "json = \"yes please\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_snapshot_path_expands_tilde() {
        let config = Config {
            snapshot: Some("~/stacks/dev.json".to_string()),
            ..Default::default()
        };

        let path = config.snapshot_path().unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("stacks/dev.json"));
    }

    #[test]
    fn test_resolve_snapshot_path_precedence() {
        let config = Config {
            snapshot: Some("/from/config.json".to_string()),
            ..Default::default()
        };

        assert_eq!(
            resolve_snapshot_path(Some(Path::new("/from/flag.json")), &config).unwrap(),
            PathBuf::from("/from/flag.json")
        );
        assert_eq!(
            resolve_snapshot_path(None, &config).unwrap(),
            PathBuf::from("/from/config.json")
        );
        assert!(resolve_snapshot_path(None, &Config::default()).is_err());
    }
}
