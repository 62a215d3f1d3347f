//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{DependencyType, IssueStatus, Priority};

// ============================================================================
// Value Enums
// ============================================================================

/// Issue status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatusArg {
    /// Not yet scheduled
    Backlog,
    /// Scheduled, not started
    Todo,
    /// Being worked on
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    /// Waiting for review
    #[value(name = "in_review", alias = "in-review")]
    InReview,
    /// Completed
    Done,
    /// Abandoned
    Cancelled,
}

impl std::fmt::Display for IssueStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        IssueStatus::from(*self).fmt(f)
    }
}

/// Priority for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityArg {
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

impl std::fmt::Display for PriorityArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Priority::from(*self).fmt(f)
    }
}

/// Dependency type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyTypeArg {
    /// Hard blocker: the target waits for the source
    Blocks,
    /// Informational link
    Relates,
    /// Same work tracked twice
    Duplicates,
}

impl std::fmt::Display for DependencyTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        DependencyType::from(*self).fmt(f)
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<IssueStatusArg> for IssueStatus {
    fn from(arg: IssueStatusArg) -> Self {
        match arg {
            IssueStatusArg::Backlog => IssueStatus::Backlog,
            IssueStatusArg::Todo => IssueStatus::Todo,
            IssueStatusArg::InProgress => IssueStatus::InProgress,
            IssueStatusArg::InReview => IssueStatus::InReview,
            IssueStatusArg::Done => IssueStatus::Done,
            IssueStatusArg::Cancelled => IssueStatus::Cancelled,
        }
    }
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Urgent => Priority::Urgent,
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
            PriorityArg::None => Priority::None,
        }
    }
}

impl From<DependencyTypeArg> for DependencyType {
    fn from(arg: DependencyTypeArg) -> Self {
        match arg {
            DependencyTypeArg::Blocks => DependencyType::Blocks,
            DependencyTypeArg::Relates => DependencyType::Relates,
            DependencyTypeArg::Duplicates => DependencyType::Duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::backlog(IssueStatusArg::Backlog, "backlog")]
    #[case::in_progress(IssueStatusArg::InProgress, "in_progress")]
    #[case::in_review(IssueStatusArg::InReview, "in_review")]
    #[case::cancelled(IssueStatusArg::Cancelled, "cancelled")]
    fn status_display_matches_domain(#[case] arg: IssueStatusArg, #[case] expected: &str) {
        assert_eq!(arg.to_string(), expected);
    }

    #[test]
    fn value_names_parse() {
        assert_eq!(
            IssueStatusArg::from_str("in-review", true).unwrap(),
            IssueStatusArg::InReview
        );
        assert_eq!(
            DependencyTypeArg::from_str("duplicates", false).unwrap(),
            DependencyTypeArg::Duplicates
        );
        assert_eq!(Priority::from(PriorityArg::Urgent), Priority::Urgent);
    }
}
