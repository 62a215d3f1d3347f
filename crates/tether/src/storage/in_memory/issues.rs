//! In-memory issue registry.
//!
//! The tracker that owns issues normally sits behind [`IssueLookup`]. The
//! registry is the local stand-in: it keeps issue summaries in memory, answers
//! lookups, and is mutated directly by the CLI.

use crate::domain::{IssueId, IssueStatus, IssueSummary, ProjectId};
use crate::error::{Error, Result};
use crate::storage::IssueLookup;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe map of issue summaries, shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct IssueRegistry {
    issues: Arc<Mutex<HashMap<IssueId, IssueSummary>>>,
}

impl IssueRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `issues`. Later entries win on duplicate ids.
    #[must_use]
    pub fn from_issues(issues: impl IntoIterator<Item = IssueSummary>) -> Self {
        let map = issues
            .into_iter()
            .map(|issue| (issue.id.clone(), issue))
            .collect();
        Self {
            issues: Arc::new(Mutex::new(map)),
        }
    }

    /// Insert or replace an issue, returning the previous summary.
    pub async fn upsert(&self, issue: IssueSummary) -> Option<IssueSummary> {
        self.issues.lock().await.insert(issue.id.clone(), issue)
    }

    /// Fetch one issue.
    pub async fn get(&self, id: &IssueId) -> Option<IssueSummary> {
        self.issues.lock().await.get(id).cloned()
    }

    /// Change the status of an issue.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if the issue is unknown.
    pub async fn set_status(&self, id: &IssueId, status: IssueStatus) -> Result<IssueSummary> {
        let mut issues = self.issues.lock().await;
        let issue = issues
            .get_mut(id)
            .ok_or_else(|| Error::IssueNotFound(id.clone()))?;
        issue.status = status;
        Ok(issue.clone())
    }

    /// Remove an issue. Edges pointing at it are left in place.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssueNotFound` if the issue is unknown.
    pub async fn remove(&self, id: &IssueId) -> Result<IssueSummary> {
        self.issues
            .lock()
            .await
            .remove(id)
            .ok_or_else(|| Error::IssueNotFound(id.clone()))
    }

    /// Every issue, terminal ones included, sorted by identifier.
    pub async fn list_all(&self) -> Vec<IssueSummary> {
        let mut issues: Vec<IssueSummary> = self.issues.lock().await.values().cloned().collect();
        sort_by_identifier(&mut issues);
        issues
    }

    async fn list_active_where(&self, keep: impl Fn(&IssueSummary) -> bool) -> Vec<IssueSummary> {
        let mut issues: Vec<IssueSummary> = self
            .issues
            .lock()
            .await
            .values()
            .filter(|issue| issue.is_active() && keep(issue))
            .cloned()
            .collect();
        sort_by_identifier(&mut issues);
        issues
    }
}

fn sort_by_identifier(issues: &mut [IssueSummary]) {
    issues.sort_by(|a, b| a.identifier.cmp(&b.identifier).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl IssueLookup for IssueRegistry {
    async fn get_issue_summary(&self, id: &IssueId) -> Result<Option<IssueSummary>> {
        Ok(self.get(id).await)
    }

    async fn list_active_issues_by_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<IssueSummary>> {
        Ok(self
            .list_active_where(|issue| &issue.project_id == project)
            .await)
    }

    async fn list_active_issues(&self) -> Result<Vec<IssueSummary>> {
        Ok(self.list_active_where(|_| true).await)
    }
}
