//! Domain types for issue dependency tracking.
//!
//! Issues are owned by the surrounding tracker and only consumed here as
//! [`IssueSummary`] values. The one entity this crate owns is the
//! [`DependencyEdge`].
//!
//! # Edge Direction Convention
//!
//! Edges point from **source** to **target** and are read according to their
//! type:
//!
//! - **Blocks**: `A -> B` means A blocks B, equivalently B is blocked by A.
//!   Direction matters.
//! - **Relates** / **Duplicates**: stored once in whichever direction the
//!   caller supplied, and reported to both endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Internal identifier of an issue.
    IssueId
);

string_id!(
    /// Identifier of a project.
    ProjectId
);

string_id!(
    /// Unique identifier of a dependency edge, assigned at creation.
    EdgeId
);

/// Workflow status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// Not yet scheduled
    Backlog,

    /// Scheduled, not started
    Todo,

    /// Being worked on
    InProgress,

    /// Waiting for review
    InReview,

    /// Completed
    Done,

    /// Abandoned
    Cancelled,
}

impl IssueStatus {
    /// All statuses in workflow order.
    pub const ALL: [IssueStatus; 6] = [
        IssueStatus::Backlog,
        IssueStatus::Todo,
        IssueStatus::InProgress,
        IssueStatus::InReview,
        IssueStatus::Done,
        IssueStatus::Cancelled,
    ];

    /// Returns `true` for `done` and `cancelled`.
    ///
    /// Terminal issues never block anything and are never actionable.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, IssueStatus::Done | IssueStatus::Cancelled)
    }

    /// Returns `true` for every non-terminal status.
    #[must_use]
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// The serialized name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Backlog => "backlog",
            IssueStatus::Todo => "todo",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::InReview => "in_review",
            IssueStatus::Done => "done",
            IssueStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        IssueStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown issue status '{s}'"))
    }
}

/// Priority of an issue.
///
/// Variants are declared from most to least urgent, so the derived `Ord`
/// sorts `Urgent` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Drop everything
    Urgent,

    /// Next up
    High,

    /// Normal
    Medium,

    /// When there is time
    Low,

    /// Not triaged
    None,
}

impl Priority {
    /// The serialized name of the priority.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::None => "none",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of dependency relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    /// Hard ordering: the source must finish before the target can proceed
    Blocks,

    /// Informational link, symmetric
    Relates,

    /// Same work tracked twice, symmetric
    Duplicates,
}

impl DependencyType {
    /// Returns `true` for types that read the same from both endpoints.
    #[must_use]
    pub fn is_symmetric(self) -> bool {
        !matches!(self, DependencyType::Blocks)
    }

    /// The serialized name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DependencyType::Blocks => "blocks",
            DependencyType::Relates => "relates",
            DependencyType::Duplicates => "duplicates",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored dependency between two issues.
///
/// Edges are immutable: changing a dependency means deleting it and
/// creating a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Unique identifier
    pub id: EdgeId,

    /// Issue the edge starts from
    pub source_issue_id: IssueId,

    /// Issue the edge points to
    pub target_issue_id: IssueId,

    /// Relationship kind
    #[serde(rename = "type")]
    pub dep_type: DependencyType,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Returns `true` if this edge carries the given `(source, target, type)` triple.
    #[must_use]
    pub fn matches(&self, source: &IssueId, target: &IssueId, dep_type: DependencyType) -> bool {
        self.dep_type == dep_type
            && &self.source_issue_id == source
            && &self.target_issue_id == target
    }

    /// The endpoint opposite to `issue`, or `None` if `issue` is not an endpoint.
    #[must_use]
    pub fn other_end(&self, issue: &IssueId) -> Option<&IssueId> {
        if &self.source_issue_id == issue {
            Some(&self.target_issue_id)
        } else if &self.target_issue_id == issue {
            Some(&self.source_issue_id)
        } else {
            None
        }
    }
}

/// What the dependency engine needs to know about an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    /// Internal identifier
    pub id: IssueId,

    /// Human-readable identifier (e.g. `PROJ-123`)
    pub identifier: String,

    /// Issue title
    pub title: String,

    /// Current status
    pub status: IssueStatus,

    /// Priority level
    pub priority: Priority,

    /// Effort estimate, if one was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<f64>,

    /// Owning project
    pub project_id: ProjectId,
}

impl IssueSummary {
    /// Returns `true` if the issue is not done or cancelled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Compact view of the issue on the other end of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    /// Internal identifier
    pub id: IssueId,

    /// Human-readable identifier
    pub identifier: String,

    /// Issue title
    pub title: String,

    /// Current status
    pub status: IssueStatus,

    /// Priority level
    pub priority: Priority,
}

impl From<&IssueSummary> for IssueRef {
    fn from(issue: &IssueSummary) -> Self {
        Self {
            id: issue.id.clone(),
            identifier: issue.identifier.clone(),
            title: issue.title.clone(),
            status: issue.status,
            priority: issue.priority,
        }
    }
}

/// One entry of an [`IssueDependencies`] list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedIssue {
    /// The edge this entry came from
    pub edge_id: EdgeId,

    /// Type of the edge
    #[serde(rename = "type")]
    pub dep_type: DependencyType,

    /// The issue on the other end
    pub issue: IssueRef,
}

/// Every dependency of one issue, classified from that issue's point of view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDependencies {
    /// Issues this issue blocks (outgoing `blocks`)
    pub blocks: Vec<RelatedIssue>,

    /// Issues blocking this issue (incoming `blocks`)
    pub blocked_by: Vec<RelatedIssue>,

    /// `relates` edges in either direction
    pub relates_to: Vec<RelatedIssue>,

    /// `duplicates` edges in either direction
    pub duplicates: Vec<RelatedIssue>,
}

impl IssueDependencies {
    /// Total number of entries across all four lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len() + self.blocked_by.len() + self.relates_to.len() + self.duplicates.len()
    }

    /// Returns `true` if the issue has no reportable dependencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An active issue that blocks another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerRef {
    /// Human-readable identifier
    pub identifier: String,

    /// Issue title
    pub title: String,

    /// Current status
    pub status: IssueStatus,
}

impl From<&IssueSummary> for BlockerRef {
    fn from(issue: &IssueSummary) -> Self {
        Self {
            identifier: issue.identifier.clone(),
            title: issue.title.clone(),
            status: issue.status,
        }
    }
}

/// An active issue together with every active issue blocking it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedIssue {
    /// The blocked issue
    pub issue: IssueSummary,

    /// Its currently active blockers
    pub blocked_by: Vec<BlockerRef>,
}

/// Longest chain of `blocks` dependencies in a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Issue identifiers from the start of the chain to its end
    pub path: Vec<String>,

    /// Full summaries of the issues on the path, in path order
    pub issues: Vec<IssueSummary>,

    /// Number of `blocks` edges along the path
    pub length: usize,

    /// Sum of the known estimates along the path
    pub total_estimate: f64,
}

impl CriticalPath {
    /// Build a path from its issues in order.
    #[must_use]
    pub fn from_issues(issues: Vec<IssueSummary>) -> Self {
        let path = issues.iter().map(|i| i.identifier.clone()).collect();
        let length = issues.len().saturating_sub(1);
        let total_estimate = issues.iter().filter_map(|i| i.estimate).sum();
        Self {
            path,
            issues,
            length,
            total_estimate,
        }
    }
}
