//! Blocker tree rendering for `tether dep tree`.

use std::io::{self, Write};

use serde::Serialize;

use super::color::{bold, colored_status_icon, colorize_id, colorize_status, dimmed};
use super::{write_json, OutputConfig, OutputMode};
use crate::domain::RelatedIssue;

#[derive(Serialize)]
struct TreeEntry<'a> {
    depth: usize,
    #[serde(flatten)]
    related: &'a RelatedIssue,
}

/// Print the transitive blockers of `root`, one per line, indented by depth.
///
/// Renders like:
/// ```text
/// Blockers of P-4 (3):
/// └─ ○ P-3 [todo] Wire the API
///    └─ ▶ P-2 [in_progress] Schema migration
/// └─ ○ P-7 [todo] Fix auth
/// ```
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_blocker_tree(
    root: &str,
    blockers: &[(RelatedIssue, usize)],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            write_blocker_tree_text(&mut handle, root, blockers, &OutputConfig::from_env())
        }
        OutputMode::Json => {
            let entries: Vec<TreeEntry<'_>> = blockers
                .iter()
                .map(|(related, depth)| TreeEntry {
                    depth: *depth,
                    related,
                })
                .collect();
            write_json(
                &mut handle,
                &serde_json::json!({ "issue": root, "blockers": entries }),
            )
        }
    }
}

fn write_blocker_tree_text<W: Write>(
    w: &mut W,
    root: &str,
    blockers: &[(RelatedIssue, usize)],
    config: &OutputConfig,
) -> io::Result<()> {
    if blockers.is_empty() {
        return writeln!(w, "{} has no blockers.", colorize_id(root, config));
    }

    writeln!(
        w,
        "{} ({}):",
        bold(&format!("Blockers of {root}"), config),
        blockers.len()
    )?;

    let corner = if config.use_ascii { "`-" } else { "└─" };
    for (related, depth) in blockers {
        let indent = "   ".repeat(depth.saturating_sub(1));
        writeln!(
            w,
            "{indent}{} {} {} [{}] {}",
            dimmed(corner, config),
            colored_status_icon(related.issue.status, config),
            colorize_id(&related.issue.identifier, config),
            colorize_status(related.issue.status, config),
            related.issue.title,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyType, EdgeId, IssueId, IssueRef, IssueStatus, Priority};

    fn related(identifier: &str, status: IssueStatus) -> RelatedIssue {
        RelatedIssue {
            edge_id: EdgeId::new(format!("dep-{identifier}")),
            dep_type: DependencyType::Blocks,
            issue: IssueRef {
                id: IssueId::new(identifier),
                identifier: identifier.to_string(),
                title: format!("Work {identifier}"),
                status,
                priority: Priority::Medium,
            },
        }
    }

    #[test]
    fn indents_by_depth() {
        let blockers = vec![
            (related("P-3", IssueStatus::Todo), 1),
            (related("P-2", IssueStatus::Done), 2),
        ];
        let mut buffer = Vec::new();
        write_blocker_tree_text(&mut buffer, "P-4", &blockers, &OutputConfig::new(80, true, false))
            .unwrap();
        let out = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Blockers of P-4 (2):");
        assert_eq!(lines[1], "`- o P-3 [todo] Work P-3");
        assert_eq!(lines[2], "   `- + P-2 [done] Work P-2");
    }

    #[test]
    fn no_blockers_message() {
        let mut buffer = Vec::new();
        write_blocker_tree_text(&mut buffer, "P-1", &[], &OutputConfig::new(80, true, false))
            .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "P-1 has no blockers.\n");
    }
}
