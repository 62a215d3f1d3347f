//! Command execution logic.
//!
//! Every mutating command persists through [`App::save`] before reporting.

use anyhow::Result;

use super::args::{
    BlockedArgs, CriticalPathArgs, DepAction, DepArgs, InitArgs, IssueAction, IssueArgs, ReadyArgs,
};
use crate::app::App;
use crate::domain::{DependencyEdge, DependencyType, EdgeId, IssueId, IssueSummary, ProjectId};
use crate::engine::DependencyEngine;
use crate::error::Error;
use crate::output::{self, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    use crate::config;

    let current_dir = std::env::current_dir()?;
    let result = config::init(&current_dir, args.prefix.as_deref()).await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "tether_dir": result.tether_dir.display().to_string(),
                "config_file": result.config_file.display().to_string(),
                "edges_file": result.edges_file.display().to_string(),
                "issues_file": result.issues_file.display().to_string(),
                "prefix": result.prefix,
            }))?;
        }
        OutputMode::Text if args.quiet => {}
        OutputMode::Text => {
            println!("Initialized tether in {}", result.tether_dir.display());
            println!("  Config:       {}", result.config_file.display());
            println!("  Dependencies: {}", result.edges_file.display());
            println!("  Issues:       {}", result.issues_file.display());
            println!("  Edge prefix:  {}", result.prefix);
        }
    }

    Ok(())
}

/// Execute the issue command
pub async fn execute_issue(app: &App, args: &IssueArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        IssueAction::Add {
            identifier,
            title,
            project,
            id,
            status,
            priority,
            estimate,
        } => {
            let issue = IssueSummary {
                id: IssueId::new(id.as_deref().unwrap_or(identifier)),
                identifier: identifier.clone(),
                title: title.clone(),
                status: (*status).into(),
                priority: (*priority).into(),
                estimate: *estimate,
                project_id: ProjectId::new(project.as_str()),
            };
            let replaced = app.issues().upsert(issue.clone()).await.is_some();
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "issue": issue,
                    "replaced": replaced,
                }))?,
                OutputMode::Text => {
                    let verb = if replaced { "Updated" } else { "Added" };
                    println!("{verb} issue {}: {}", issue.identifier, issue.title);
                }
            }
        }

        IssueAction::Status { id, status } => {
            let issue = app
                .issues()
                .set_status(&IssueId::new(id.as_str()), (*status).into())
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&issue)?,
                OutputMode::Text => println!("{} is now {}", issue.identifier, issue.status),
            }
        }

        IssueAction::Rm { id } => {
            let issue = app.issues().remove(&IssueId::new(id.as_str())).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "removed": issue.id,
                }))?,
                OutputMode::Text => println!("Removed issue {}", issue.identifier),
            }
        }

        IssueAction::List { project, all } => {
            let project = project.as_deref().map(ProjectId::new);
            let issues: Vec<IssueSummary> = app
                .issues()
                .list_all()
                .await
                .into_iter()
                .filter(|issue| *all || issue.is_active())
                .filter(|issue| project.as_ref().is_none_or(|p| issue.project_id == *p))
                .collect();
            output::print_issues(&issues, "No issues found.", output_mode)?;
        }
    }

    Ok(())
}

/// Execute the dep command
pub async fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    let engine = app.engine();

    match &args.action {
        DepAction::Add {
            source,
            target,
            dep_type,
        } => {
            let source = IssueId::new(source.as_str());
            let target = IssueId::new(target.as_str());
            let dep_type = DependencyType::from(*dep_type);

            let edge_id = engine.add_dependency(&source, &target, dep_type).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "id": edge_id,
                    "source_issue_id": source,
                    "target_issue_id": target,
                    "type": dep_type,
                }))?,
                OutputMode::Text => {
                    println!("Added dependency {edge_id}: {source} {dep_type} {target}");
                }
            }
        }

        DepAction::Rm { edge_id } => {
            let edge_id = EdgeId::new(edge_id.as_str());
            // Removal is idempotent; look the edge up first so the report can name it.
            let existing = edge_to_remove(engine, &edge_id).await?;
            engine.remove_dependency(&edge_id).await?;
            if existing.is_some() {
                app.save().await?;
            }

            match (output_mode, existing) {
                (OutputMode::Json, existing) => output::print_json(&serde_json::json!({
                    "id": edge_id,
                    "removed": existing,
                }))?,
                (OutputMode::Text, Some(edge)) => println!(
                    "Removed dependency {}: {} {} {}",
                    edge.id, edge.source_issue_id, edge.dep_type, edge.target_issue_id
                ),
                (OutputMode::Text, None) => println!("No dependency {edge_id}; nothing removed"),
            }
        }

        DepAction::Show { id } => {
            let dependencies = engine.get_dependencies(&IssueId::new(id.as_str())).await?;
            output::print_dependencies(id, &dependencies, output_mode)?;
        }

        DepAction::Tree { id, depth } => {
            let blockers = engine
                .blocker_tree(&IssueId::new(id.as_str()), *depth)
                .await?;
            output::print_blocker_tree(id, &blockers, output_mode)?;
        }

        DepAction::Check { source, target } => {
            let source = IssueId::new(source.as_str());
            let target = IssueId::new(target.as_str());
            let would_cycle = engine.would_create_cycle(&source, &target).await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "source_issue_id": source,
                    "target_issue_id": target,
                    "would_create_cycle": would_cycle,
                }))?,
                OutputMode::Text if would_cycle => {
                    println!("{source} blocks {target} would create a cycle");
                }
                OutputMode::Text => println!("{source} blocks {target} is allowed"),
            }
        }
    }

    Ok(())
}

/// Execute the blocked command
pub async fn execute_blocked(app: &App, args: &BlockedArgs, output_mode: OutputMode) -> Result<()> {
    let project = args.project.as_deref().map(ProjectId::new);
    let blocked = app.engine().get_blocked_issues(project.as_ref()).await?;
    output::print_blocked(&blocked, output_mode)?;
    Ok(())
}

/// Execute the ready command
pub async fn execute_ready(app: &App, args: &ReadyArgs, output_mode: OutputMode) -> Result<()> {
    let project = args.project.as_deref().map(ProjectId::new);
    let ready = app
        .engine()
        .get_actionable_issues(project.as_ref(), args.status.map(Into::into))
        .await?;
    output::print_issues(&ready, "No ready issues.", output_mode)?;
    Ok(())
}

/// Execute the critical-path command
pub async fn execute_critical_path(
    app: &App,
    args: &CriticalPathArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let path = app
        .engine()
        .get_critical_path(&ProjectId::new(args.project.as_str()))
        .await?;
    output::print_critical_path(&args.project, &path, output_mode)?;
    Ok(())
}

/// The edge `dep rm` is about to delete, or `None` if no such edge exists.
/// Any other lookup failure is an error.
async fn edge_to_remove(
    engine: &DependencyEngine,
    edge_id: &EdgeId,
) -> crate::error::Result<Option<DependencyEdge>> {
    match engine.get_edge(edge_id).await {
        Ok(edge) => Ok(Some(edge)),
        Err(Error::DependencyNotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}
