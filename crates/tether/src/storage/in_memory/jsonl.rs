//! JSONL persistence for the in-memory stores.
//!
//! Edges and issues live in separate files, one JSON object per line. Loading
//! never fails on bad data: anything that cannot be used is skipped and
//! reported as a [`LoadWarning`].

use super::edges::InMemoryEdgeStore;
use super::inner::EdgeStoreInner;
use super::issues::IssueRegistry;
use crate::domain::{DependencyEdge, DependencyType, EdgeId, IssueId, IssueSummary};
use crate::engine::graph::BlocksGraph;
use crate::error::Result;
use crate::storage::EdgeStore;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tether_jsonl::{read_jsonl_resilient, write_jsonl_atomic, Warning as JsonlWarning};

/// Non-fatal problems found while loading a JSONL file.
///
/// The offending record is skipped; everything else is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line could not be parsed
    MalformedJson {
        /// 1-based physical line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// Line is not valid UTF-8
    InvalidUtf8 {
        /// 1-based physical line number
        line_number: usize,
    },

    /// Edge from an issue to itself
    SelfReference {
        /// Skipped edge
        edge_id: EdgeId,
        /// The issue on both ends
        issue: IssueId,
    },

    /// Edge id already used by an earlier line
    DuplicateEdgeId {
        /// Skipped edge
        edge_id: EdgeId,
    },

    /// Same `(source, target, type)` as an earlier edge
    DuplicateDependency {
        /// Skipped edge
        edge_id: EdgeId,
        /// Earlier edge carrying the triple
        existing: EdgeId,
    },

    /// `blocks` edge that would close a cycle with earlier edges
    CircularDependency {
        /// Skipped edge
        edge_id: EdgeId,
        /// Edge source
        from: IssueId,
        /// Edge target
        to: IssueId,
    },

    /// Issue id already used by an earlier line
    DuplicateIssue {
        /// Repeated issue id
        issue_id: IssueId,
    },
}

impl From<JsonlWarning> for LoadWarning {
    fn from(warning: JsonlWarning) -> Self {
        match warning {
            JsonlWarning::MalformedJson { line_number, error } => {
                LoadWarning::MalformedJson { line_number, error }
            }
            JsonlWarning::InvalidUtf8 { line_number } => LoadWarning::InvalidUtf8 { line_number },
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedJson { line_number, error } => {
                write!(f, "skipped malformed line {line_number}: {error}")
            }
            LoadWarning::InvalidUtf8 { line_number } => {
                write!(f, "skipped line {line_number}: invalid UTF-8")
            }
            LoadWarning::SelfReference { edge_id, issue } => {
                write!(f, "skipped {edge_id}: {issue} cannot depend on itself")
            }
            LoadWarning::DuplicateEdgeId { edge_id } => {
                write!(f, "skipped {edge_id}: id already used")
            }
            LoadWarning::DuplicateDependency { edge_id, existing } => {
                write!(f, "skipped {edge_id}: same dependency as {existing}")
            }
            LoadWarning::CircularDependency { edge_id, from, to } => {
                write!(f, "skipped {edge_id}: {from} -> {to} would create a cycle")
            }
            LoadWarning::DuplicateIssue { issue_id } => {
                write!(f, "skipped repeated issue {issue_id}")
            }
        }
    }
}

/// Load an edge store from a JSONL file.
///
/// Edges are validated in file order, as if each were inserted through the
/// engine: self-references, repeated ids, repeated triples (reversed ones too
/// for symmetric types) and `blocks` edges closing a cycle with the edges kept
/// so far are dropped.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened or read.
pub async fn load_edges_from_jsonl(
    path: &Path,
) -> Result<(InMemoryEdgeStore, Vec<LoadWarning>)> {
    let (parsed, jsonl_warnings) = read_jsonl_resilient::<DependencyEdge, _>(path).await?;
    let mut warnings: Vec<LoadWarning> = jsonl_warnings.into_iter().map(Into::into).collect();

    let mut inner = EdgeStoreInner::new();
    let mut blocks = BlocksGraph::new();

    for edge in parsed {
        if edge.source_issue_id == edge.target_issue_id {
            warnings.push(LoadWarning::SelfReference {
                edge_id: edge.id,
                issue: edge.source_issue_id,
            });
            continue;
        }

        if inner.get(&edge.id).is_some() {
            warnings.push(LoadWarning::DuplicateEdgeId { edge_id: edge.id });
            continue;
        }

        let (source, target) = (&edge.source_issue_id, &edge.target_issue_id);
        let existing = inner.find_triple(source, target, edge.dep_type).or_else(|| {
            edge.dep_type
                .is_symmetric()
                .then(|| inner.find_triple(target, source, edge.dep_type))
                .flatten()
        });
        if let Some(existing) = existing {
            warnings.push(LoadWarning::DuplicateDependency {
                existing: existing.id.clone(),
                edge_id: edge.id,
            });
            continue;
        }

        if edge.dep_type == DependencyType::Blocks {
            if blocks.reaches(&edge.target_issue_id, &edge.source_issue_id) {
                warnings.push(LoadWarning::CircularDependency {
                    edge_id: edge.id,
                    from: edge.source_issue_id,
                    to: edge.target_issue_id,
                });
                continue;
            }
            blocks.add_edge(&edge.source_issue_id, &edge.target_issue_id);
        }

        inner.insert(edge);
    }

    Ok((InMemoryEdgeStore::from_inner(inner), warnings))
}

/// Write every edge of `store` to `path`, atomically.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the file cannot be written.
pub async fn save_edges_to_jsonl(store: &dyn EdgeStore, path: &Path) -> Result<()> {
    let edges = store.export_all().await?;
    write_jsonl_atomic(path, edges.iter()).await?;
    Ok(())
}

/// Load an issue registry from a JSONL file. The first record of a repeated id wins.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened or read.
pub async fn load_issues_from_jsonl(path: &Path) -> Result<(IssueRegistry, Vec<LoadWarning>)> {
    let (parsed, jsonl_warnings) = read_jsonl_resilient::<IssueSummary, _>(path).await?;
    let mut warnings: Vec<LoadWarning> = jsonl_warnings.into_iter().map(Into::into).collect();

    let mut seen = HashSet::new();
    let mut issues = Vec::with_capacity(parsed.len());
    for issue in parsed {
        if seen.insert(issue.id.clone()) {
            issues.push(issue);
        } else {
            warnings.push(LoadWarning::DuplicateIssue { issue_id: issue.id });
        }
    }

    Ok((IssueRegistry::from_issues(issues), warnings))
}

/// Write every issue of `registry` to `path` sorted by identifier, atomically.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn save_issues_to_jsonl(registry: &IssueRegistry, path: &Path) -> Result<()> {
    let issues = registry.list_all().await;
    write_jsonl_atomic(path, issues.iter()).await?;
    Ok(())
}
