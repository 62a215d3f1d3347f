//! Storage abstraction layer for tether.
//!
//! The dependency engine talks to two collaborators, both injected as trait
//! objects:
//!
//! - [`EdgeStore`]: owns dependency edges. Insert, delete by id and
//!   query by source, target or type.
//! - [`IssueLookup`]: read-only view of the issues owned by the surrounding
//!   tracker.
//!
//! Backends:
//!
//! - **In-memory**: [`in_memory::InMemoryEdgeStore`] and
//!   [`in_memory::IssueRegistry`], ephemeral.
//! - **JSONL**: the in-memory stores loaded from and saved to JSON Lines
//!   files.
//!
//! # Example
//!
//! ```no_run
//! use tether::storage::{create_edge_store, open_issue_registry, StorageBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = StorageBackend::Jsonl {
//!         edges: ".tether/dependencies.jsonl".into(),
//!         issues: ".tether/issues.jsonl".into(),
//!     };
//!     let edges = create_edge_store(&backend).await?;
//!     let issues = open_issue_registry(&backend).await?;
//!     println!("{} edges", edges.export_all().await?.len());
//!     println!("{} issues", issues.list_all().await.len());
//!     Ok(())
//! }
//! ```

use crate::domain::{DependencyEdge, DependencyType, EdgeId, IssueId, IssueSummary, ProjectId};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod in_memory;

use in_memory::{InMemoryEdgeStore, IssueRegistry};

/// Persistence for dependency edges.
///
/// Implementations must be `Send + Sync`; all methods take `&self` and use
/// interior mutability. The store performs no validation beyond id
/// uniqueness: self-reference, duplicate and cycle checks belong to the
/// engine.
///
/// Query results are returned in insertion order.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    // ========== Writes ==========

    /// Store a new edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::EdgeIdConflict` if an edge with the same id exists.
    async fn insert(&self, edge: DependencyEdge) -> Result<()>;

    /// Delete an edge by id. Returns `false` if no such edge existed.
    async fn delete_by_id(&self, id: &EdgeId) -> Result<bool>;

    // ========== Queries ==========

    /// Fetch an edge by id.
    async fn get(&self, id: &EdgeId) -> Result<Option<DependencyEdge>>;

    /// All edges starting at `source`.
    async fn find_by_source(&self, source: &IssueId) -> Result<Vec<DependencyEdge>>;

    /// All edges ending at `target`.
    async fn find_by_target(&self, target: &IssueId) -> Result<Vec<DependencyEdge>>;

    /// All edges of one type.
    async fn find_by_type(&self, dep_type: DependencyType) -> Result<Vec<DependencyEdge>>;

    /// Every edge, for export or backup.
    async fn export_all(&self) -> Result<Vec<DependencyEdge>>;

    // ========== Persistence ==========

    /// Flush changes to persistent storage. A no-op for in-memory stores.
    async fn save(&self) -> Result<()>;

    /// Discard unsaved changes and restore the persisted state.
    ///
    /// Intended for recovery after a failed [`save`](Self::save). A no-op for
    /// in-memory stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read.
    async fn reload(&self) -> Result<()>;
}

/// Read-only access to issues owned elsewhere.
#[async_trait]
pub trait IssueLookup: Send + Sync {
    /// Summary of one issue, or `None` if it does not exist.
    async fn get_issue_summary(&self, id: &IssueId) -> Result<Option<IssueSummary>>;

    /// Every non-terminal issue of a project.
    async fn list_active_issues_by_project(&self, project: &ProjectId)
    -> Result<Vec<IssueSummary>>;

    /// Every non-terminal issue across all projects.
    async fn list_active_issues(&self) -> Result<Vec<IssueSummary>>;
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Ephemeral in-memory storage
    InMemory,

    /// In-memory storage persisted to JSONL files
    Jsonl {
        /// Dependency edges file
        edges: PathBuf,
        /// Issue summaries file
        issues: PathBuf,
    },
}

impl StorageBackend {
    /// Path of the edges file, for file-based backends.
    #[must_use]
    pub fn edges_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl { edges, .. } => Some(edges),
            StorageBackend::InMemory => None,
        }
    }

    /// Path of the issues file, for file-based backends.
    #[must_use]
    pub fn issues_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl { issues, .. } => Some(issues),
            StorageBackend::InMemory => None,
        }
    }
}

/// Edge store whose `save()` writes a JSONL snapshot.
struct JsonlBackedEdgeStore {
    inner: InMemoryEdgeStore,
    path: PathBuf,
}

#[async_trait]
impl EdgeStore for JsonlBackedEdgeStore {
    async fn insert(&self, edge: DependencyEdge) -> Result<()> {
        self.inner.insert(edge).await
    }

    async fn delete_by_id(&self, id: &EdgeId) -> Result<bool> {
        self.inner.delete_by_id(id).await
    }

    async fn get(&self, id: &EdgeId) -> Result<Option<DependencyEdge>> {
        self.inner.get(id).await
    }

    async fn find_by_source(&self, source: &IssueId) -> Result<Vec<DependencyEdge>> {
        self.inner.find_by_source(source).await
    }

    async fn find_by_target(&self, target: &IssueId) -> Result<Vec<DependencyEdge>> {
        self.inner.find_by_target(target).await
    }

    async fn find_by_type(&self, dep_type: DependencyType) -> Result<Vec<DependencyEdge>> {
        self.inner.find_by_type(dep_type).await
    }

    async fn export_all(&self) -> Result<Vec<DependencyEdge>> {
        self.inner.export_all().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_edges_to_jsonl(&self.inner, &self.path).await
    }

    async fn reload(&self) -> Result<()> {
        let fresh = load_edges_or_empty(&self.path, "JSONL reload warning").await?;
        self.inner.replace_with(fresh).await;
        Ok(())
    }
}

async fn load_edges_or_empty(path: &Path, message: &'static str) -> Result<InMemoryEdgeStore> {
    if !path.exists() {
        // First run
        return Ok(InMemoryEdgeStore::new());
    }

    let (store, warnings) = in_memory::load_edges_from_jsonl(path).await?;
    for warning in &warnings {
        tracing::warn!(path = %path.display(), %warning, "{message}");
    }
    Ok(store)
}

/// Create the edge store for `backend`.
///
/// For JSONL, an existing file is loaded (load warnings are logged and the
/// store stays usable); a missing file yields an empty store that creates the
/// file on first save.
///
/// # Errors
///
/// Returns `Error::Io` if an existing file cannot be read.
pub async fn create_edge_store(backend: &StorageBackend) -> Result<Box<dyn EdgeStore>> {
    match backend {
        StorageBackend::InMemory => Ok(Box::new(InMemoryEdgeStore::new())),
        StorageBackend::Jsonl { edges, .. } => {
            let inner = load_edges_or_empty(edges, "JSONL load warning").await?;
            Ok(Box::new(JsonlBackedEdgeStore {
                inner,
                path: edges.clone(),
            }))
        }
    }
}

/// Open the issue registry for `backend`, loading the issues file if it exists.
///
/// # Errors
///
/// Returns `Error::Io` if an existing file cannot be read.
pub async fn open_issue_registry(backend: &StorageBackend) -> Result<IssueRegistry> {
    let Some(path) = backend.issues_path() else {
        return Ok(IssueRegistry::new());
    };
    if !path.exists() {
        return Ok(IssueRegistry::new());
    }

    let (registry, warnings) = in_memory::load_issues_from_jsonl(path).await?;
    for warning in &warnings {
        tracing::warn!(path = %path.display(), %warning, "JSONL load warning");
    }
    Ok(registry)
}

/// Persist `registry` for `backend`. A no-op for in-memory storage.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be written.
pub async fn save_issue_registry(registry: &IssueRegistry, backend: &StorageBackend) -> Result<()> {
    match backend.issues_path() {
        Some(path) => in_memory::save_issues_to_jsonl(registry, path).await,
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn edge(id: &str, source: &str, target: &str) -> DependencyEdge {
        DependencyEdge {
            id: EdgeId::new(id),
            source_issue_id: IssueId::new(source),
            target_issue_id: IssueId::new(target),
            dep_type: DependencyType::Blocks,
            created_at: Utc::now(),
        }
    }

    fn jsonl_backend(dir: &TempDir) -> StorageBackend {
        StorageBackend::Jsonl {
            edges: dir.path().join("dependencies.jsonl"),
            issues: dir.path().join("issues.jsonl"),
        }
    }

    #[test]
    fn backend_paths() {
        assert!(StorageBackend::InMemory.edges_path().is_none());
        let backend = StorageBackend::Jsonl {
            edges: "e.jsonl".into(),
            issues: "i.jsonl".into(),
        };
        assert_eq!(backend.edges_path(), Some(Path::new("e.jsonl")));
        assert_eq!(backend.issues_path(), Some(Path::new("i.jsonl")));
    }

    #[tokio::test]
    async fn jsonl_store_starts_empty_without_file() {
        let dir = TempDir::new().unwrap();
        let store = create_edge_store(&jsonl_backend(&dir)).await.unwrap();
        assert!(store.export_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn jsonl_store_round_trips_through_save() {
        let dir = TempDir::new().unwrap();
        let backend = jsonl_backend(&dir);

        let store = create_edge_store(&backend).await.unwrap();
        store.insert(edge("dep-1", "a", "b")).await.unwrap();
        store.insert(edge("dep-2", "b", "c")).await.unwrap();
        store.save().await.unwrap();

        let reopened = create_edge_store(&backend).await.unwrap();
        let ids: Vec<EdgeId> = reopened
            .export_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![EdgeId::new("dep-1"), EdgeId::new("dep-2")]);
    }

    #[tokio::test]
    async fn reload_discards_unsaved_changes() {
        let dir = TempDir::new().unwrap();
        let store = create_edge_store(&jsonl_backend(&dir)).await.unwrap();
        store.insert(edge("dep-1", "a", "b")).await.unwrap();
        store.save().await.unwrap();

        store.insert(edge("dep-2", "b", "c")).await.unwrap();
        store.reload().await.unwrap();

        assert!(store.get(&EdgeId::new("dep-2")).await.unwrap().is_none());
        assert!(store.get(&EdgeId::new("dep-1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn in_memory_registry_ignores_save() {
        let registry = open_issue_registry(&StorageBackend::InMemory).await.unwrap();
        save_issue_registry(&registry, &StorageBackend::InMemory)
            .await
            .unwrap();
    }
}
