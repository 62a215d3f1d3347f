//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or pretty JSON. The text
//! writers take any `io::Write` so they can be tested against a buffer.
//!
//! Submodules:
//! - [`color`]: semantic colors and status icons
//! - [`tree`]: blocker tree rendering

pub mod color;
pub mod tree;

use crate::domain::{BlockedIssue, CriticalPath, IssueDependencies, IssueSummary, RelatedIssue};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};
pub use tree::print_blocker_tree;

use color::{bold, colored_status_icon, colorize_id, colorize_priority, colorize_status, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: usize = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Configuration for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Read settings from the environment.
    ///
    /// - `TETHER_MAX_WIDTH`: maximum content width (default: 100)
    /// - `TETHER_ASCII`: "1" or "true" for ASCII-only icons
    /// - `NO_COLOR`: any value disables colors
    /// - `TETHER_COLOR`: "0" or "false" disables colors
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = match env::var("TETHER_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "TETHER_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = env::var("TETHER_ASCII")
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TETHER_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Usable width: the configured maximum, capped by the terminal width.
    #[must_use]
    pub fn content_width(&self) -> usize {
        self.max_width.min(terminal_width())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map_or(DEFAULT_TERMINAL_WIDTH, |(w, _)| usize::from(w.0))
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print any serializable value as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{json}")
}

/// Print a list of issues.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_issues(issues: &[IssueSummary], empty_message: &str, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            write_issues_text(&mut handle, issues, empty_message, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(&mut handle, &issues),
    }
}

/// Print every dependency of one issue.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_dependencies(
    issue: &str,
    dependencies: &IssueDependencies,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_dependencies_text(
            &mut handle,
            issue,
            dependencies,
            &OutputConfig::from_env(),
        ),
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({ "issue": issue, "dependencies": dependencies }),
        ),
    }
}

/// Print blocked issues with their blockers.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_blocked(blocked: &[BlockedIssue], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_blocked_text(&mut handle, blocked, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &blocked),
    }
}

/// Print a project's critical path.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_critical_path(project: &str, path: &CriticalPath, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => {
            write_critical_path_text(&mut handle, project, path, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(
            &mut handle,
            &serde_json::json!({ "project": project, "critical_path": path }),
        ),
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

/// One line per issue: icon, identifier, priority, status, title (wrapped).
fn write_issue_line<W: Write>(
    w: &mut W,
    issue: &IssueSummary,
    indent: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    let head = format!(
        "{indent}{} {}  [{}]  {}",
        colored_status_icon(issue.status, config),
        colorize_id(&issue.identifier, config),
        colorize_priority(issue.priority, config),
        colorize_status(issue.status, config),
    );
    let estimate = issue
        .estimate
        .map(|e| format!("  {}", dimmed(&format!("est {e}"), config)))
        .unwrap_or_default();
    writeln!(w, "{head}{estimate}")?;

    let title_indent = format!("{indent}    ");
    let width = config.content_width().saturating_sub(title_indent.len()).max(20);
    for line in wrap_text(&issue.title, width) {
        writeln!(w, "{title_indent}{line}")?;
    }
    Ok(())
}

fn write_issues_text<W: Write>(
    w: &mut W,
    issues: &[IssueSummary],
    empty_message: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    if issues.is_empty() {
        return writeln!(w, "{empty_message}");
    }
    for issue in issues {
        write_issue_line(w, issue, "", config)?;
    }
    writeln!(w)?;
    writeln!(w, "{} issue(s)", issues.len())
}

fn write_related_section<W: Write>(
    w: &mut W,
    title: &str,
    arrow: &str,
    entries: &[RelatedIssue],
    config: &OutputConfig,
) -> io::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "{} ({}):", bold(title, config), entries.len())?;
    for entry in entries {
        writeln!(
            w,
            "  {} {} {} {}  {}",
            dimmed(arrow, config),
            colored_status_icon(entry.issue.status, config),
            colorize_id(&entry.issue.identifier, config),
            entry.issue.title,
            dimmed(entry.edge_id.as_str(), config),
        )?;
    }
    Ok(())
}

fn write_dependencies_text<W: Write>(
    w: &mut W,
    issue: &str,
    dependencies: &IssueDependencies,
    config: &OutputConfig,
) -> io::Result<()> {
    if dependencies.is_empty() {
        return writeln!(w, "{} has no dependencies.", colorize_id(issue, config));
    }

    let (out, back, both) = if config.use_ascii {
        ("->", "<-", "<->")
    } else {
        ("→", "←", "↔")
    };

    writeln!(w, "Dependencies of {}", colorize_id(issue, config))?;
    write_related_section(w, "Blocks", out, &dependencies.blocks, config)?;
    write_related_section(w, "Blocked by", back, &dependencies.blocked_by, config)?;
    write_related_section(w, "Relates to", both, &dependencies.relates_to, config)?;
    write_related_section(w, "Duplicates", both, &dependencies.duplicates, config)
}

fn write_blocked_text<W: Write>(
    w: &mut W,
    blocked: &[BlockedIssue],
    config: &OutputConfig,
) -> io::Result<()> {
    if blocked.is_empty() {
        return writeln!(w, "No blocked issues found.");
    }

    writeln!(w, "Found {} blocked issue(s):", blocked.len())?;
    for group in blocked {
        writeln!(w)?;
        write_issue_line(w, &group.issue, "", config)?;
        for blocker in &group.blocked_by {
            writeln!(
                w,
                "    {} {} {} ({})",
                color::error("blocked by", config),
                colorize_id(&blocker.identifier, config),
                blocker.title,
                colorize_status(blocker.status, config),
            )?;
        }
    }
    Ok(())
}

fn write_critical_path_text<W: Write>(
    w: &mut W,
    project: &str,
    path: &CriticalPath,
    config: &OutputConfig,
) -> io::Result<()> {
    if path.path.is_empty() {
        return writeln!(w, "No active issues in project {}.", colorize_id(project, config));
    }

    writeln!(
        w,
        "Critical path for {}: {} issue(s), {} blocking step(s), total estimate {}",
        colorize_id(project, config),
        path.issues.len(),
        path.length,
        path.total_estimate,
    )?;
    writeln!(w)?;

    let arrow = if config.use_ascii { "->" } else { "→" };
    let chain: Vec<String> = path.path.iter().map(|id| colorize_id(id, config)).collect();
    writeln!(w, "  {}", chain.join(&format!(" {} ", dimmed(arrow, config))))?;
    writeln!(w)?;

    for (step, issue) in path.issues.iter().enumerate() {
        write_issue_line(w, issue, &format!("  {}. ", step + 1), config)?;
    }
    Ok(())
}

/// Wrap text to `max_width`, preserving existing line breaks.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BlockerRef, DependencyType, EdgeId, IssueId, IssueRef, IssueStatus, Priority, ProjectId,
    };

    fn plain() -> OutputConfig {
        OutputConfig::new(80, true, false)
    }

    fn summary(identifier: &str, status: IssueStatus) -> IssueSummary {
        IssueSummary {
            id: IssueId::new(identifier),
            identifier: identifier.to_string(),
            title: format!("Title of {identifier}"),
            status,
            priority: Priority::High,
            estimate: Some(2.0),
            project_id: ProjectId::new("p"),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn empty_issue_list_prints_message() {
        let out = render(|w| write_issues_text(w, &[], "Nothing ready.", &plain()));
        assert_eq!(out, "Nothing ready.\n");
    }

    #[test]
    fn issue_list_shows_identifier_and_title() {
        let issues = [summary("P-1", IssueStatus::Todo)];
        let out = render(|w| write_issues_text(w, &issues, "", &plain()));
        assert!(out.contains("o P-1  [high]  todo  est 2"));
        assert!(out.contains("    Title of P-1"));
        assert!(out.ends_with("1 issue(s)\n"));
    }

    #[test]
    fn dependencies_sections_only_when_present() {
        let deps = IssueDependencies {
            blocked_by: vec![RelatedIssue {
                edge_id: EdgeId::new("dep-1"),
                dep_type: DependencyType::Blocks,
                issue: IssueRef::from(&summary("P-0", IssueStatus::InProgress)),
            }],
            ..IssueDependencies::default()
        };
        let out = render(|w| write_dependencies_text(w, "P-1", &deps, &plain()));
        assert!(out.contains("Blocked by (1):"));
        assert!(out.contains("<- > P-0 Title of P-0  dep-1"));
        assert!(!out.contains("Blocks ("));
    }

    #[test]
    fn blocked_lists_each_blocker() {
        let blocked = [BlockedIssue {
            issue: summary("P-2", IssueStatus::Todo),
            blocked_by: vec![BlockerRef::from(&summary("P-1", IssueStatus::InReview))],
        }];
        let out = render(|w| write_blocked_text(w, &blocked, &plain()));
        assert!(out.starts_with("Found 1 blocked issue(s):"));
        assert!(out.contains("blocked by P-1 Title of P-1 (in_review)"));
    }

    #[test]
    fn critical_path_chain() {
        let path = CriticalPath::from_issues(vec![
            summary("P-1", IssueStatus::Todo),
            summary("P-2", IssueStatus::Todo),
        ]);
        let out = render(|w| write_critical_path_text(w, "p", &path, &plain()));
        assert!(out.contains("2 issue(s), 1 blocking step(s), total estimate 4"));
        assert!(out.contains("  P-1 -> P-2"));
        assert!(out.contains("  2. o P-2"));
    }

    #[test]
    fn empty_critical_path() {
        let out = render(|w| write_critical_path_text(w, "p", &CriticalPath::default(), &plain()));
        assert_eq!(out, "No active issues in project p.\n");
    }

    #[test]
    fn wrap_preserves_blank_lines() {
        let lines = wrap_text("one two three\n\nfour", 8);
        assert_eq!(lines, vec!["one two", "three", "", "four"]);
    }
}
