//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green   (done status, completed actions)
//!   - Warning/Active: yellow  (in progress, high priority)
//!   - Error/Blocked:  red     (blockers, urgent priority, cycles)
//!   - Info/Reference: cyan    (identifiers, edge ids)
//!   - Muted:          dimmed  (cancelled, backlog, connectors)
//!   - Emphasis:       bold    (section headers)

use crate::domain::{DependencyType, IssueStatus, Priority};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

pub(crate) fn colorize_status(status: IssueStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        IssueStatus::Backlog | IssueStatus::Cancelled => text.dimmed().to_string(),
        IssueStatus::Todo => text.white().to_string(),
        IssueStatus::InProgress | IssueStatus::InReview => text.yellow().to_string(),
        IssueStatus::Done => text.green().to_string(),
    }
}

pub(crate) fn colorize_priority(priority: Priority, config: &OutputConfig) -> String {
    let text = priority.to_string();
    if !config.use_colors {
        return text;
    }
    match priority {
        Priority::Urgent => text.red().bold().to_string(),
        Priority::High => text.yellow().to_string(),
        Priority::Medium => text,
        Priority::Low | Priority::None => text.dimmed().to_string(),
    }
}

pub(crate) fn colorize_type(dep_type: DependencyType, config: &OutputConfig) -> String {
    let text = dep_type.to_string();
    if !config.use_colors {
        return text;
    }
    match dep_type {
        DependencyType::Blocks => text.red().to_string(),
        DependencyType::Relates => text.blue().to_string(),
        DependencyType::Duplicates => text.magenta().to_string(),
    }
}

/// Issue identifiers and edge ids (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    info(id, config)
}

/// Status icon with ASCII fallback.
pub(crate) fn colored_status_icon(status: IssueStatus, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match status {
            IssueStatus::Backlog => ".",
            IssueStatus::Todo => "o",
            IssueStatus::InProgress => ">",
            IssueStatus::InReview => "?",
            IssueStatus::Done => "+",
            IssueStatus::Cancelled => "-",
        }
    } else {
        match status {
            IssueStatus::Backlog => "·",
            IssueStatus::Todo => "○",
            IssueStatus::InProgress => "▶",
            IssueStatus::InReview => "◐",
            IssueStatus::Done => "✓",
            IssueStatus::Cancelled => "✗",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match status {
        IssueStatus::Backlog | IssueStatus::Cancelled => icon.dimmed().to_string(),
        IssueStatus::Todo => icon.white().to_string(),
        IssueStatus::InProgress | IssueStatus::InReview => icon.yellow().to_string(),
        IssueStatus::Done => icon.green().to_string(),
    }
}

/// Apply dimmed style to text (connectors, field labels).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
