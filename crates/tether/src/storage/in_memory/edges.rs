//! [`EdgeStore`] implementation for the in-memory backend.

use super::inner::EdgeStoreInner;
use crate::domain::{DependencyEdge, DependencyType, EdgeId, IssueId};
use crate::error::{Error, Result};
use crate::storage::EdgeStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe in-memory edge store.
///
/// Cloning is cheap and yields a handle to the same edges.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEdgeStore {
    inner: Arc<Mutex<EdgeStoreInner>>,
}

impl InMemoryEdgeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_inner(inner: EdgeStoreInner) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Number of stored edges.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Returns `true` if no edges are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Replace this store's contents with those of `other`, visible through every clone.
    pub async fn replace_with(&self, other: InMemoryEdgeStore) {
        let fresh = std::mem::take(&mut *other.inner.lock().await);
        *self.inner.lock().await = fresh;
    }
}

#[async_trait]
impl EdgeStore for InMemoryEdgeStore {
    async fn insert(&self, edge: DependencyEdge) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let id = edge.id.clone();
        if inner.insert(edge) {
            Ok(())
        } else {
            Err(Error::EdgeIdConflict(id))
        }
    }

    async fn delete_by_id(&self, id: &EdgeId) -> Result<bool> {
        Ok(self.inner.lock().await.remove(id).is_some())
    }

    async fn get(&self, id: &EdgeId) -> Result<Option<DependencyEdge>> {
        Ok(self.inner.lock().await.get(id).cloned())
    }

    async fn find_by_source(&self, source: &IssueId) -> Result<Vec<DependencyEdge>> {
        Ok(self.inner.lock().await.by_source(source))
    }

    async fn find_by_target(&self, target: &IssueId) -> Result<Vec<DependencyEdge>> {
        Ok(self.inner.lock().await.by_target(target))
    }

    async fn find_by_type(&self, dep_type: DependencyType) -> Result<Vec<DependencyEdge>> {
        Ok(self.inner.lock().await.by_type(dep_type))
    }

    async fn export_all(&self) -> Result<Vec<DependencyEdge>> {
        Ok(self.inner.lock().await.all())
    }

    async fn save(&self) -> Result<()> {
        // Nothing to persist
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn edge(id: &str, source: &str, target: &str) -> DependencyEdge {
        DependencyEdge {
            id: EdgeId::new(id),
            source_issue_id: IssueId::new(source),
            target_issue_id: IssueId::new(target),
            dep_type: DependencyType::Blocks,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_conflicting_id_fails() {
        let store = InMemoryEdgeStore::new();
        store.insert(edge("dep-1", "a", "b")).await.unwrap();

        let err = store.insert(edge("dep-1", "b", "c")).await.unwrap_err();
        assert!(matches!(err, Error::EdgeIdConflict(id) if id.as_str() == "dep-1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryEdgeStore::new();
        let handle = store.clone();
        store.insert(edge("dep-1", "a", "b")).await.unwrap();

        assert!(handle.get(&EdgeId::new("dep-1")).await.unwrap().is_some());
        assert!(handle.delete_by_id(&EdgeId::new("dep-1")).await.unwrap());
        assert!(!store.delete_by_id(&EdgeId::new("dep-1")).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn replace_with_swaps_contents() {
        let store = InMemoryEdgeStore::new();
        store.insert(edge("dep-1", "a", "b")).await.unwrap();

        let other = InMemoryEdgeStore::new();
        other.insert(edge("dep-2", "c", "d")).await.unwrap();
        other.insert(edge("dep-3", "d", "e")).await.unwrap();

        store.replace_with(other).await;
        let ids: Vec<EdgeId> = store
            .export_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![EdgeId::new("dep-2"), EdgeId::new("dep-3")]);
    }
}
