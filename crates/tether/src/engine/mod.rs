//! The dependency graph engine.
//!
//! [`DependencyEngine`] is the only component that writes edges. It validates
//! every insertion against the edge invariants and answers the scheduling
//! queries built on top of the graph:
//!
//! | Operation | Reads |
//! |-----------|-------|
//! | [`add_dependency`](DependencyEngine::add_dependency) | lookup, edges by source, `blocks` edges |
//! | [`get_dependencies`](DependencyEngine::get_dependencies) | edges by source and target, lookup |
//! | [`is_blocked`](DependencyEngine::is_blocked) | edges by target, lookup |
//! | [`get_blocked_issues`](DependencyEngine::get_blocked_issues) | `blocks` edges, lookup |
//! | [`get_actionable_issues`](DependencyEngine::get_actionable_issues) | active issues, `blocks` edges |
//! | [`get_critical_path`](DependencyEngine::get_critical_path) | project issues, `blocks` edges |
//!
//! # Invariants
//!
//! - No edge connects an issue to itself.
//! - No two edges share `(source, target, type)`, and a symmetric type
//!   links a pair of issues at most once in either direction.
//! - The `blocks` subgraph is acyclic. Insertions that would close a cycle are
//!   rejected; nothing is ever repaired after the fact.
//!
//! # Concurrency
//!
//! The engine keeps no graph state between calls. The check-then-insert
//! sequence of [`add_dependency`](DependencyEngine::add_dependency) runs under
//! an async mutex, so two concurrent insertions through the same engine cannot
//! jointly close a cycle. Writers in other processes are not covered.

mod blocking;
mod cache;
mod critical_path;
pub(crate) mod graph;

use crate::domain::{
    DependencyEdge, DependencyType, EdgeId, IssueDependencies, IssueId, IssueRef, RelatedIssue,
};
use crate::error::{Error, Result};
use crate::id_generation::{EdgeIdGenerator, EdgeIdSeed};
use crate::storage::{EdgeStore, IssueLookup};
use cache::SummaryCache;
use chrono::Utc;
use graph::BlocksGraph;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::Mutex;

/// Cycle-safe dependency management over an [`EdgeStore`] and an [`IssueLookup`].
pub struct DependencyEngine {
    edges: Box<dyn EdgeStore>,
    issues: Box<dyn IssueLookup>,
    ids: EdgeIdGenerator,
    insert_lock: Mutex<()>,
}

impl DependencyEngine {
    /// Create an engine generating edge ids with the default `dep` prefix.
    pub fn new(edges: Box<dyn EdgeStore>, issues: Box<dyn IssueLookup>) -> Self {
        Self {
            edges,
            issues,
            ids: EdgeIdGenerator::default(),
            insert_lock: Mutex::new(()),
        }
    }

    /// Use `ids` for new edge ids.
    #[must_use]
    pub fn with_id_generator(mut self, ids: EdgeIdGenerator) -> Self {
        self.ids = ids;
        self
    }

    /// The underlying edge store.
    pub fn edge_store(&self) -> &dyn EdgeStore {
        self.edges.as_ref()
    }

    /// The underlying issue lookup.
    pub fn issue_lookup(&self) -> &dyn IssueLookup {
        self.issues.as_ref()
    }

    // ========== Mutations ==========

    /// Create a dependency from `source` to `target`.
    ///
    /// Checks run in this order and the first failure wins; nothing is written
    /// unless all pass:
    ///
    /// 1. `source != target`, without touching the stores
    /// 2. both issues exist
    /// 3. no edge with the same `(source, target, type)` exists; for
    ///    `relates` and `duplicates` the reversed pair counts too
    /// 4. for `blocks`, `source` is not reachable from `target` along
    ///    existing `blocks` edges
    ///
    /// # Errors
    ///
    /// - `Error::SelfReference` if `source == target`
    /// - `Error::IssueNotFound` if either issue is unknown
    /// - `Error::DuplicateDependency` if the link already exists
    /// - `Error::CircularDependency` if a `blocks` edge would close a cycle
    /// - store and lookup failures are propagated
    pub async fn add_dependency(
        &self,
        source: &IssueId,
        target: &IssueId,
        dep_type: DependencyType,
    ) -> Result<EdgeId> {
        if source == target {
            return Err(Error::SelfReference(source.clone()));
        }

        let _guard = self.insert_lock.lock().await;

        // === Phase 1: Validation (no mutations) ===
        for id in [source, target] {
            if self.issues.get_issue_summary(id).await?.is_none() {
                return Err(Error::IssueNotFound(id.clone()));
            }
        }

        if let Some(existing) = self.find_existing(source, target, dep_type).await? {
            return Err(Error::DuplicateDependency {
                source_issue: source.clone(),
                target_issue: target.clone(),
                dep_type,
                existing: existing.id,
            });
        }

        if dep_type == DependencyType::Blocks && self.blocks_path_exists(target, source).await? {
            tracing::debug!(%source, %target, "Rejected blocks edge closing a cycle");
            return Err(Error::CircularDependency {
                from: source.clone(),
                to: target.clone(),
            });
        }

        // === Phase 2: ID generation ===
        let created_at = Utc::now();
        let seed = EdgeIdSeed {
            source,
            target,
            dep_type,
            created_at,
        };
        let id = self.next_free_id(&seed).await?;

        // === Phase 3: Insert ===
        self.edges
            .insert(DependencyEdge {
                id: id.clone(),
                source_issue_id: source.clone(),
                target_issue_id: target.clone(),
                dep_type,
                created_at,
            })
            .await?;

        tracing::debug!(edge_id = %id, %source, %target, %dep_type, "Added dependency");
        Ok(id)
    }

    /// Delete a dependency by id.
    ///
    /// Deleting an id that does not exist succeeds and changes nothing.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn remove_dependency(&self, id: &EdgeId) -> Result<()> {
        if self.edges.delete_by_id(id).await? {
            tracing::debug!(edge_id = %id, "Removed dependency");
        } else {
            tracing::debug!(edge_id = %id, "Dependency already absent");
        }
        Ok(())
    }

    /// Persist the edge store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn save(&self) -> Result<()> {
        self.edges.save().await
    }

    // ========== Queries ==========

    /// Fetch one edge.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if no edge has this id.
    pub async fn get_edge(&self, id: &EdgeId) -> Result<DependencyEdge> {
        self.edges
            .get(id)
            .await?
            .ok_or_else(|| Error::DependencyNotFound(id.clone()))
    }

    /// Every dependency of `issue`, classified from its point of view.
    ///
    /// Outgoing edges are listed before incoming ones, each in store order.
    /// Edges whose other endpoint no longer resolves are dropped.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn get_dependencies(&self, issue: &IssueId) -> Result<IssueDependencies> {
        let outgoing = self.edges.find_by_source(issue).await?;
        let incoming = self.edges.find_by_target(issue).await?;

        let mut cache = SummaryCache::new(self.issues.as_ref());
        let mut dependencies = IssueDependencies::default();

        let all = outgoing
            .iter()
            .map(|edge| (edge, true))
            .chain(incoming.iter().map(|edge| (edge, false)));

        for (edge, is_outgoing) in all {
            let Some(other) = edge.other_end(issue) else {
                continue;
            };

            let Some(summary) = cache.get(other).await? else {
                tracing::debug!(edge_id = %edge.id, missing = %other, "Skipping edge to missing issue");
                continue;
            };

            let entry = RelatedIssue {
                edge_id: edge.id.clone(),
                dep_type: edge.dep_type,
                issue: IssueRef::from(&summary),
            };

            match (edge.dep_type, is_outgoing) {
                (DependencyType::Blocks, true) => dependencies.blocks.push(entry),
                (DependencyType::Blocks, false) => dependencies.blocked_by.push(entry),
                (DependencyType::Relates, _) => dependencies.relates_to.push(entry),
                (DependencyType::Duplicates, _) => dependencies.duplicates.push(entry),
            }
        }

        Ok(dependencies)
    }

    /// Returns `true` if a `blocks` edge from `source` to `target` would be
    /// rejected as circular. A self-reference counts as a cycle.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn would_create_cycle(&self, source: &IssueId, target: &IssueId) -> Result<bool> {
        if source == target {
            return Ok(true);
        }
        self.blocks_path_exists(target, source).await
    }

    /// Every transitive blocker of `issue`, breadth first, with its depth
    /// (1 = direct blocker).
    ///
    /// Each blocker appears once, at its shallowest depth. Blockers that no
    /// longer resolve are skipped along with everything behind them. With
    /// `max_depth`, blockers deeper than that are not returned.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn blocker_tree(
        &self,
        issue: &IssueId,
        max_depth: Option<usize>,
    ) -> Result<Vec<(RelatedIssue, usize)>> {
        let edges = self.edges.find_by_type(DependencyType::Blocks).await?;
        let mut incoming: HashMap<&IssueId, Vec<&DependencyEdge>> = HashMap::new();
        for edge in &edges {
            incoming.entry(&edge.target_issue_id).or_default().push(edge);
        }

        let mut cache = SummaryCache::new(self.issues.as_ref());
        let mut result = Vec::new();
        let mut visited: HashSet<IssueId> = HashSet::from([issue.clone()]);
        let mut queue: VecDeque<(IssueId, usize)> = VecDeque::from([(issue.clone(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            for edge in incoming.get(&current).into_iter().flatten() {
                let blocker = &edge.source_issue_id;
                if !visited.insert(blocker.clone()) {
                    continue;
                }
                let Some(summary) = cache.get(blocker).await? else {
                    continue;
                };

                result.push((
                    RelatedIssue {
                        edge_id: edge.id.clone(),
                        dep_type: DependencyType::Blocks,
                        issue: IssueRef::from(&summary),
                    },
                    depth + 1,
                ));
                queue.push_back((blocker.clone(), depth + 1));
            }
        }

        Ok(result)
    }

    // ========== Helpers ==========

    /// The stored edge already linking `source` to `target` with `dep_type`.
    /// Symmetric types also match the reversed pair.
    async fn find_existing(
        &self,
        source: &IssueId,
        target: &IssueId,
        dep_type: DependencyType,
    ) -> Result<Option<DependencyEdge>> {
        let forward = self
            .edges
            .find_by_source(source)
            .await?
            .into_iter()
            .find(|edge| edge.matches(source, target, dep_type));
        if forward.is_some() || !dep_type.is_symmetric() {
            return Ok(forward);
        }

        Ok(self
            .edges
            .find_by_source(target)
            .await?
            .into_iter()
            .find(|edge| edge.matches(target, source, dep_type)))
    }

    async fn blocks_path_exists(&self, from: &IssueId, to: &IssueId) -> Result<bool> {
        let blocks = self.edges.find_by_type(DependencyType::Blocks).await?;
        Ok(BlocksGraph::from_edges(&blocks).reaches(from, to))
    }

    async fn next_free_id(&self, seed: &EdgeIdSeed<'_>) -> Result<EdgeId> {
        let mut last = None;
        for candidate in self.ids.candidates(seed) {
            if self.edges.get(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            tracing::debug!(edge_id = %candidate, "Edge id collision, retrying");
            last = Some(candidate);
        }
        Err(Error::EdgeIdConflict(
            last.unwrap_or_else(|| EdgeId::new(self.ids.prefix())),
        ))
    }
}
