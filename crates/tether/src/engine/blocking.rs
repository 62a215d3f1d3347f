//! Blocked and actionable classification.
//!
//! An issue is blocked while at least one active issue blocks it. Blockers
//! that are done, cancelled or missing no longer count.

use super::cache::SummaryCache;
use super::DependencyEngine;
use crate::domain::{
    BlockedIssue, BlockerRef, DependencyType, IssueId, IssueStatus, IssueSummary, ProjectId,
};
use crate::error::Result;
use std::collections::{HashMap, HashSet};

impl DependencyEngine {
    /// Returns `true` if an active issue blocks `issue`.
    ///
    /// The status of `issue` itself is not consulted, and an unknown issue
    /// is simply not blocked.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn is_blocked(&self, issue: &IssueId) -> Result<bool> {
        for edge in self.edges.find_by_target(issue).await? {
            if edge.dep_type != DependencyType::Blocks {
                continue;
            }
            let blocker = self.issues.get_issue_summary(&edge.source_issue_id).await?;
            if blocker.is_some_and(|b| b.is_active()) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Every active issue with at least one active blocker, sorted by identifier.
    ///
    /// Each entry lists all of its active blockers in store order. With
    /// `project`, only blocked issues of that project are returned; their
    /// blockers may live in any project.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn get_blocked_issues(&self, project: Option<&ProjectId>) -> Result<Vec<BlockedIssue>> {
        let edges = self.edges.find_by_type(DependencyType::Blocks).await?;
        let mut cache = SummaryCache::new(self.issues.as_ref());

        let mut groups: Vec<BlockedIssue> = Vec::new();
        let mut slots: HashMap<IssueId, usize> = HashMap::new();

        for edge in &edges {
            let Some(blocked) = cache.get(&edge.target_issue_id).await? else {
                continue;
            };
            if !blocked.is_active() || project.is_some_and(|p| &blocked.project_id != p) {
                continue;
            }

            let Some(blocker) = cache.get(&edge.source_issue_id).await? else {
                continue;
            };
            if !blocker.is_active() {
                continue;
            }

            let slot = *slots.entry(blocked.id.clone()).or_insert_with(|| {
                groups.push(BlockedIssue {
                    issue: blocked,
                    blocked_by: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].blocked_by.push(BlockerRef::from(&blocker));
        }

        groups.sort_by(|a, b| {
            a.issue
                .identifier
                .cmp(&b.issue.identifier)
                .then_with(|| a.issue.id.cmp(&b.issue.id))
        });
        Ok(groups)
    }

    /// Active issues nobody actively blocks, optionally narrowed to a
    /// project and a status.
    ///
    /// Blocking is evaluated across all projects. Results are sorted by
    /// priority (urgent first), then identifier. A terminal `status` filter
    /// matches nothing.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn get_actionable_issues(
        &self,
        project: Option<&ProjectId>,
        status: Option<IssueStatus>,
    ) -> Result<Vec<IssueSummary>> {
        let blocked: HashSet<IssueId> = self
            .get_blocked_issues(None)
            .await?
            .into_iter()
            .map(|group| group.issue.id)
            .collect();

        let candidates = match project {
            Some(project) => self.issues.list_active_issues_by_project(project).await?,
            None => self.issues.list_active_issues().await?,
        };

        let mut actionable: Vec<IssueSummary> = candidates
            .into_iter()
            .filter(|issue| issue.is_active())
            .filter(|issue| status.is_none_or(|s| issue.status == s))
            .filter(|issue| !blocked.contains(&issue.id))
            .collect();

        actionable.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Ok(actionable)
    }
}
