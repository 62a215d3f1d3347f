//! Per-call memo of issue lookups.

use crate::domain::{IssueId, IssueSummary};
use crate::error::Result;
use crate::storage::IssueLookup;
use std::collections::HashMap;

/// Remembers every lookup result, misses included, for the duration of one
/// engine call.
pub(super) struct SummaryCache<'a> {
    lookup: &'a dyn IssueLookup,
    seen: HashMap<IssueId, Option<IssueSummary>>,
}

impl<'a> SummaryCache<'a> {
    pub(super) fn new(lookup: &'a dyn IssueLookup) -> Self {
        Self {
            lookup,
            seen: HashMap::new(),
        }
    }

    pub(super) async fn get(&mut self, id: &IssueId) -> Result<Option<IssueSummary>> {
        if let Some(hit) = self.seen.get(id) {
            return Ok(hit.clone());
        }
        let summary = self.lookup.get_issue_summary(id).await?;
        self.seen.insert(id.clone(), summary.clone());
        Ok(summary)
    }
}
