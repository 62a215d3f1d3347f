//! Application context for CLI command execution.
//!
//! [`App`] ties a repository on disk to a ready-to-use [`DependencyEngine`]:
//! it locates `.tether/`, reads the configuration, opens both stores and
//! saves them again after mutating commands.
//!
//! # Example
//!
//! ```no_run
//! use tether::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let ready = app.engine().get_actionable_issues(None, None).await?;
//!     println!("{} issues ready", ready.len());
//!     Ok(())
//! }
//! ```

use crate::config::{find_tether_root, TetherConfig, CONFIG_FILE_NAME, TETHER_DIR_NAME};
use crate::engine::DependencyEngine;
use crate::error::{ConfigError, Result};
use crate::id_generation::EdgeIdGenerator;
use crate::storage::in_memory::IssueRegistry;
use crate::storage::{create_edge_store, open_issue_registry, save_issue_registry, StorageBackend};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
pub struct App {
    engine: DependencyEngine,

    /// Shared with the engine's issue lookup
    issues: IssueRegistry,

    backend: StorageBackend,

    /// Path to the tether directory (.tether)
    tether_dir: PathBuf,

    prefix: String,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("tether_dir", &self.tether_dir)
            .field("prefix", &self.prefix)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App from `working_dir` or the nearest parent holding `.tether/`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no tether repository is found in the directory tree
    /// - the configuration cannot be loaded
    /// - the data files cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_tether_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        let tether_dir = root_dir.join(TETHER_DIR_NAME);

        let config = TetherConfig::load(&tether_dir.join(CONFIG_FILE_NAME)).await?;
        let backend = config.storage_backend(&root_dir)?;

        let mut app = Self::open(backend, &config.edge_id_prefix).await?;
        app.tether_dir = tether_dir;
        Ok(app)
    }

    /// Open both stores for `backend` and build the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the data files cannot be read.
    pub async fn open(backend: StorageBackend, prefix: &str) -> Result<Self> {
        let edges = create_edge_store(&backend).await?;
        let issues = open_issue_registry(&backend).await?;

        let engine = DependencyEngine::new(edges, Box::new(issues.clone()))
            .with_id_generator(EdgeIdGenerator::new(prefix));

        Ok(Self {
            engine,
            issues,
            backend,
            tether_dir: PathBuf::from(TETHER_DIR_NAME),
            prefix: prefix.to_string(),
        })
    }

    /// The dependency engine.
    pub fn engine(&self) -> &DependencyEngine {
        &self.engine
    }

    /// The issue registry backing the engine's lookups.
    pub fn issues(&self) -> &IssueRegistry {
        &self.issues
    }

    /// Edge id prefix from configuration.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path to the tether directory.
    pub fn tether_dir(&self) -> &Path {
        &self.tether_dir
    }

    /// Persist edges and issues.
    ///
    /// Should be called after any mutating operation. If the edge write
    /// fails, the edge store is reloaded so memory matches disk again.
    ///
    /// # Errors
    ///
    /// Returns the first write failure.
    pub async fn save(&self) -> Result<()> {
        if let Err(err) = self.engine.save().await {
            if let Err(reload_err) = self.engine.edge_store().reload().await {
                tracing::warn!(error = %reload_err, "Reload after failed save also failed");
            }
            return Err(err);
        }
        save_issue_registry(&self.issues, &self.backend).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::domain::{DependencyType, IssueId, IssueStatus, IssueSummary, Priority, ProjectId};
    use tempfile::TempDir;

    fn issue(identifier: &str) -> IssueSummary {
        IssueSummary {
            id: IssueId::new(identifier),
            identifier: identifier.to_string(),
            title: format!("Issue {identifier}"),
            status: IssueStatus::Todo,
            priority: Priority::Medium,
            estimate: None,
            project_id: ProjectId::new("p"),
        }
    }

    #[tokio::test]
    async fn app_from_initialized_directory() {
        let temp_dir = TempDir::new().unwrap();
        config::init(temp_dir.path(), Some("link")).await.unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();
        assert_eq!(app.prefix(), "link");
        assert!(app.tether_dir().ends_with(".tether"));
    }

    #[tokio::test]
    async fn app_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        config::init(temp_dir.path(), None).await.unwrap();
        let sub_dir = temp_dir.path().join("src").join("lib");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let app = App::from_directory(&sub_dir).await.unwrap();
        assert_eq!(app.prefix(), "dep");
    }

    #[tokio::test]
    async fn app_from_uninitialized_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = App::from_directory(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Not a tether repository"));
    }

    #[tokio::test]
    async fn saved_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        config::init(temp_dir.path(), None).await.unwrap();

        let app = App::from_directory(temp_dir.path()).await.unwrap();
        app.issues().upsert(issue("P-1")).await;
        app.issues().upsert(issue("P-2")).await;
        let edge = app
            .engine()
            .add_dependency(&IssueId::new("P-1"), &IssueId::new("P-2"), DependencyType::Blocks)
            .await
            .unwrap();
        assert!(edge.as_str().starts_with("dep-"));
        app.save().await.unwrap();

        let reopened = App::from_directory(temp_dir.path()).await.unwrap();
        assert!(reopened.engine().is_blocked(&IssueId::new("P-2")).await.unwrap());
        assert_eq!(reopened.issues().list_all().await.len(), 2);
    }
}
