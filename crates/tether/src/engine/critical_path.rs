//! Critical path: the longest chain of `blocks` edges inside a project.

use super::graph;
use super::DependencyEngine;
use crate::domain::{CriticalPath, DependencyType, IssueId, ProjectId};
use crate::error::Result;
use std::collections::HashMap;

impl DependencyEngine {
    /// Longest chain of `blocks` dependencies among the active issues of
    /// `project`, measured in edges.
    ///
    /// Only edges with both endpoints in that set count. Issues are ordered
    /// by identifier before the topological sort, which makes the choice
    /// between equally long chains deterministic: the chain ending at the
    /// first issue (in topological order) to reach the maximum length wins.
    /// A project without active issues yields an empty path; one without
    /// internal edges yields its first issue alone.
    ///
    /// # Errors
    ///
    /// Propagates store and lookup failures.
    pub async fn get_critical_path(&self, project: &ProjectId) -> Result<CriticalPath> {
        let mut issues = self.issues.list_active_issues_by_project(project).await?;
        issues.retain(|issue| issue.is_active());
        issues.sort_by(|a, b| a.identifier.cmp(&b.identifier).then_with(|| a.id.cmp(&b.id)));

        let edges = self.edges.find_by_type(DependencyType::Blocks).await?;

        let chain = {
            let position: HashMap<&IssueId, usize> = issues
                .iter()
                .enumerate()
                .map(|(index, issue)| (&issue.id, index))
                .collect();

            let pairs: Vec<(usize, usize)> = edges
                .iter()
                .filter_map(|edge| {
                    Some((
                        *position.get(&edge.source_issue_id)?,
                        *position.get(&edge.target_issue_id)?,
                    ))
                })
                .collect();

            graph::longest_chain(issues.len(), &pairs)
        };

        tracing::debug!(%project, issues = issues.len(), path_nodes = chain.len(), "Computed critical path");
        Ok(CriticalPath::from_issues(
            chain.into_iter().map(|index| issues[index].clone()).collect(),
        ))
    }
}
