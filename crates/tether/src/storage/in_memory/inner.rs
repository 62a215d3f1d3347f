//! Core in-memory edge storage data structures.
//!
//! Edges live in a `BTreeMap` keyed by an insertion sequence number, so every
//! query returns edges in the order they were inserted. The secondary indexes
//! hold sequence numbers only.

use crate::domain::{DependencyEdge, DependencyType, EdgeId, IssueId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Inner edge storage (not thread-safe).
///
/// Wrapped in `Arc<Mutex<>>` by [`super::InMemoryEdgeStore`].
#[derive(Debug, Default)]
pub(crate) struct EdgeStoreInner {
    next_seq: u64,

    /// Edges in insertion order
    edges: BTreeMap<u64, DependencyEdge>,

    by_id: HashMap<EdgeId, u64>,
    by_source: HashMap<IssueId, BTreeSet<u64>>,
    by_target: HashMap<IssueId, BTreeSet<u64>>,
    by_type: HashMap<DependencyType, BTreeSet<u64>>,
}

impl EdgeStoreInner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn get(&self, id: &EdgeId) -> Option<&DependencyEdge> {
        self.by_id.get(id).and_then(|seq| self.edges.get(seq))
    }

    /// Store `edge`. Returns `false`, leaving the store untouched, when the id is taken.
    pub(crate) fn insert(&mut self, edge: DependencyEdge) -> bool {
        if self.by_id.contains_key(&edge.id) {
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        self.by_id.insert(edge.id.clone(), seq);
        self.by_source
            .entry(edge.source_issue_id.clone())
            .or_default()
            .insert(seq);
        self.by_target
            .entry(edge.target_issue_id.clone())
            .or_default()
            .insert(seq);
        self.by_type.entry(edge.dep_type).or_default().insert(seq);
        self.edges.insert(seq, edge);
        true
    }

    pub(crate) fn remove(&mut self, id: &EdgeId) -> Option<DependencyEdge> {
        let seq = self.by_id.remove(id)?;
        let edge = self.edges.remove(&seq)?;

        unindex(&mut self.by_source, &edge.source_issue_id, seq);
        unindex(&mut self.by_target, &edge.target_issue_id, seq);
        unindex(&mut self.by_type, &edge.dep_type, seq);

        Some(edge)
    }

    /// The edge carrying the exact `(source, target, type)` triple, if any.
    pub(crate) fn find_triple(
        &self,
        source: &IssueId,
        target: &IssueId,
        dep_type: DependencyType,
    ) -> Option<&DependencyEdge> {
        self.by_source.get(source).and_then(|seqs| {
            seqs.iter()
                .filter_map(|seq| self.edges.get(seq))
                .find(|edge| edge.matches(source, target, dep_type))
        })
    }

    pub(crate) fn by_source(&self, source: &IssueId) -> Vec<DependencyEdge> {
        self.collect(self.by_source.get(source))
    }

    pub(crate) fn by_target(&self, target: &IssueId) -> Vec<DependencyEdge> {
        self.collect(self.by_target.get(target))
    }

    pub(crate) fn by_type(&self, dep_type: DependencyType) -> Vec<DependencyEdge> {
        self.collect(self.by_type.get(&dep_type))
    }

    pub(crate) fn all(&self) -> Vec<DependencyEdge> {
        self.edges.values().cloned().collect()
    }

    fn collect(&self, seqs: Option<&BTreeSet<u64>>) -> Vec<DependencyEdge> {
        seqs.map(|seqs| {
            seqs.iter()
                .filter_map(|seq| self.edges.get(seq).cloned())
                .collect()
        })
        .unwrap_or_default()
    }
}

fn unindex<K: std::hash::Hash + Eq>(index: &mut HashMap<K, BTreeSet<u64>>, key: &K, seq: u64) {
    if let Some(seqs) = index.get_mut(key) {
        seqs.remove(&seq);
        if seqs.is_empty() {
            index.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn edge(id: &str, source: &str, target: &str, dep_type: DependencyType) -> DependencyEdge {
        DependencyEdge {
            id: EdgeId::new(id),
            source_issue_id: IssueId::new(source),
            target_issue_id: IssueId::new(target),
            dep_type,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn queries_preserve_insertion_order() {
        let mut inner = EdgeStoreInner::new();
        assert!(inner.insert(edge("dep-2", "a", "c", DependencyType::Blocks)));
        assert!(inner.insert(edge("dep-1", "a", "b", DependencyType::Relates)));
        assert!(inner.insert(edge("dep-3", "d", "a", DependencyType::Blocks)));

        let ids: Vec<String> = inner
            .by_source(&IssueId::new("a"))
            .into_iter()
            .map(|e| e.id.0)
            .collect();
        assert_eq!(ids, vec!["dep-2", "dep-1"]);

        let blocks: Vec<String> = inner
            .by_type(DependencyType::Blocks)
            .into_iter()
            .map(|e| e.id.0)
            .collect();
        assert_eq!(blocks, vec!["dep-2", "dep-3"]);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut inner = EdgeStoreInner::new();
        assert!(inner.insert(edge("dep-1", "a", "b", DependencyType::Blocks)));
        assert!(!inner.insert(edge("dep-1", "c", "d", DependencyType::Blocks)));
        assert_eq!(inner.len(), 1);
        assert!(inner.by_source(&IssueId::new("c")).is_empty());
    }

    #[test]
    fn remove_clears_every_index() {
        let mut inner = EdgeStoreInner::new();
        inner.insert(edge("dep-1", "a", "b", DependencyType::Blocks));

        let removed = inner.remove(&EdgeId::new("dep-1")).unwrap();
        assert_eq!(removed.source_issue_id, IssueId::new("a"));
        assert!(inner.get(&EdgeId::new("dep-1")).is_none());
        assert!(inner.by_source(&IssueId::new("a")).is_empty());
        assert!(inner.by_target(&IssueId::new("b")).is_empty());
        assert!(inner.by_type(DependencyType::Blocks).is_empty());
        assert!(inner.remove(&EdgeId::new("dep-1")).is_none());
    }

    #[test]
    fn find_triple_includes_type() {
        let mut inner = EdgeStoreInner::new();
        inner.insert(edge("dep-1", "a", "b", DependencyType::Relates));

        let (a, b) = (IssueId::new("a"), IssueId::new("b"));
        assert!(inner.find_triple(&a, &b, DependencyType::Relates).is_some());
        assert!(inner.find_triple(&a, &b, DependencyType::Blocks).is_none());
        assert!(inner.find_triple(&b, &a, DependencyType::Relates).is_none());
    }
}
