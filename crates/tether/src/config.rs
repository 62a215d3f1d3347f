//! Repository configuration and the `init` command.
//!
//! A tether repository is a directory containing `.tether/`:
//!
//! ```text
//! .tether/
//! ├── config.yaml
//! ├── dependencies.jsonl
//! ├── issues.jsonl
//! └── .gitignore
//! ```

use crate::error::{ConfigError, Error, Result};
use crate::id_generation::DEFAULT_EDGE_PREFIX;
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the tether directory
pub const TETHER_DIR_NAME: &str = ".tether";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the dependency edges data file
pub const EDGES_FILE_NAME: &str = "dependencies.jsonl";

/// Name of the issues data file
pub const ISSUES_FILE_NAME: &str = "issues.jsonl";

/// Name of the gitignore file within .tether
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Minimum edge id prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum edge id prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the tether root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

const BACKEND_JSONL: &str = "jsonl";
const BACKEND_MEMORY: &str = "memory";

/// Contents of `.tether/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TetherConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Prefix of generated edge ids (e.g. "dep" for "dep-k3v9x2ma")
    #[serde(rename = "edge-id-prefix", default = "default_edge_prefix")]
    pub edge_id_prefix: String,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Storage backend ("jsonl" or "memory")
    pub backend: String,

    /// Edges file, relative to the repository root
    pub edges_file: String,

    /// Issues file, relative to the repository root
    pub issues_file: String,
}

fn default_edge_prefix() -> String {
    DEFAULT_EDGE_PREFIX.to_string()
}

impl TetherConfig {
    /// Configuration for a fresh repository.
    pub fn new(edge_id_prefix: &str) -> Self {
        Self {
            storage: StorageConfig {
                backend: BACKEND_JSONL.to_string(),
                edges_file: format!("{TETHER_DIR_NAME}/{EDGES_FILE_NAME}"),
                issues_file: format!("{TETHER_DIR_NAME}/{ISSUES_FILE_NAME}"),
            },
            edge_id_prefix: edge_id_prefix.to_string(),
        }
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and
    /// `ConfigError::Invalid` if it is not valid YAML for this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_prefix(&config.edge_id_prefix)?;
        Ok(config)
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Invalid(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Resolve the storage section against the repository root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBackend` for an unrecognised backend name.
    pub fn storage_backend(&self, root: &Path) -> Result<StorageBackend> {
        match self.storage.backend.as_str() {
            BACKEND_JSONL => Ok(StorageBackend::Jsonl {
                edges: root.join(&self.storage.edges_file),
                issues: root.join(&self.storage.issues_file),
            }),
            BACKEND_MEMORY => Ok(StorageBackend::InMemory),
            other => Err(ConfigError::UnknownBackend(other.to_string()).into()),
        }
    }
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_PREFIX)
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created tether directory
    pub tether_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created edges file
    pub edges_file: PathBuf,
    /// Path to the created issues file
    pub issues_file: PathBuf,
    /// The prefix used for edge ids
    pub prefix: String,
}

/// Validate an edge id prefix: 2-20 lowercase ASCII letters or digits.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` describing the first violated rule.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(invalid(format!(
            "Prefix must be at least {MIN_PREFIX_LENGTH} characters"
        )));
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(invalid(format!(
            "Prefix cannot exceed {MAX_PREFIX_LENGTH} characters"
        )));
    }

    if !prefix
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(invalid(
            "Prefix must contain only lowercase letters and digits".to_string(),
        ));
    }

    Ok(())
}

fn invalid(message: String) -> Error {
    ConfigError::Invalid(message).into()
}

/// Initialize a new tether repository in `base_dir`.
///
/// # Errors
///
/// Returns an error if:
/// - `.tether/` already exists
/// - the prefix is invalid
/// - file system operations fail
pub async fn init(base_dir: &Path, prefix: Option<&str>) -> Result<InitResult> {
    let prefix = prefix.unwrap_or(DEFAULT_EDGE_PREFIX).trim();
    validate_prefix(prefix)?;

    let tether_dir = base_dir.join(TETHER_DIR_NAME);
    if tether_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(TETHER_DIR_NAME.to_string()).into());
    }

    fs::create_dir_all(&tether_dir).await?;

    let config_file = tether_dir.join(CONFIG_FILE_NAME);
    TetherConfig::new(prefix).save(&config_file).await?;

    let edges_file = tether_dir.join(EDGES_FILE_NAME);
    fs::write(&edges_file, "").await?;

    let issues_file = tether_dir.join(ISSUES_FILE_NAME);
    fs::write(&issues_file, "").await?;

    fs::write(
        tether_dir.join(GITIGNORE_FILE_NAME),
        "# Temporary files left by interrupted saves\n*.tmp\n",
    )
    .await?;

    tracing::info!(dir = %tether_dir.display(), %prefix, "Initialized tether repository");

    Ok(InitResult {
        tether_dir,
        config_file,
        edges_file,
        issues_file,
        prefix: prefix.to_string(),
    })
}

/// Find the directory containing `.tether/`, searching upwards from `start_dir`.
///
/// Returns `None` once the filesystem root or [`MAX_TRAVERSAL_DEPTH`] is reached.
pub fn find_tether_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TETHER_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    // ========== Prefix Validation Tests ==========

    #[rstest]
    #[case::default("dep")]
    #[case::short("ab")]
    #[case::digits("dep2")]
    #[case::max_length("a1b2c3d4e5f6g7h8i9j0")]
    fn valid_prefixes(#[case] prefix: &str) {
        assert!(validate_prefix(prefix).is_ok());
    }

    #[rstest]
    #[case::too_short("d")]
    #[case::too_long("abcdefghijklmnopqrstu")]
    #[case::uppercase("DEP")]
    #[case::hyphen("de-p")]
    #[case::empty("")]
    fn invalid_prefixes(#[case] prefix: &str) {
        assert!(matches!(
            validate_prefix(prefix),
            Err(Error::Config(ConfigError::Invalid(_)))
        ));
    }

    // ========== Init Tests ==========

    #[tokio::test]
    async fn init_creates_layout() {
        let dir = TempDir::new().unwrap();
        let result = init(dir.path(), None).await.unwrap();

        assert!(result.tether_dir.is_dir());
        assert!(result.edges_file.exists());
        assert!(result.issues_file.exists());
        assert_eq!(result.prefix, "dep");

        let config = TetherConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config, TetherConfig::default());
    }

    #[tokio::test]
    async fn init_twice_fails() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), Some("link")).await.unwrap();

        let err = init(dir.path(), None).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn config_uses_kebab_case_keys() {
        let yaml = serde_yaml::to_string(&TetherConfig::default()).unwrap();
        assert!(yaml.contains("edge-id-prefix: dep"));
        assert!(yaml.contains("edges-file: .tether/dependencies.jsonl"));
        assert!(yaml.contains("backend: jsonl"));
    }

    #[tokio::test]
    async fn missing_prefix_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "storage:\n  backend: memory\n  edges-file: e.jsonl\n  issues-file: i.jsonl\n",
        )
        .await
        .unwrap();

        let config = TetherConfig::load(&path).await.unwrap();
        assert_eq!(config.edge_id_prefix, "dep");
        assert_eq!(
            config.storage_backend(dir.path()).unwrap(),
            StorageBackend::InMemory
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut config = TetherConfig::default();
        config.storage.backend = "postgres".to_string();
        assert!(matches!(
            config.storage_backend(Path::new("/repo")),
            Err(Error::Config(ConfigError::UnknownBackend(name))) if name == "postgres"
        ));
    }

    #[test]
    fn jsonl_backend_paths_are_rooted() {
        let backend = TetherConfig::default()
            .storage_backend(Path::new("/repo"))
            .unwrap();
        assert_eq!(
            backend.edges_path(),
            Some(Path::new("/repo/.tether/dependencies.jsonl"))
        );
    }

    // ========== Root Discovery Tests ==========

    #[tokio::test]
    async fn find_root_from_nested_dir() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), None).await.unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_tether_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn find_root_without_repository() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_tether_root(dir.path()), None);
    }
}
