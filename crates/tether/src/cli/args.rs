//! CLI argument structs for all commands.

use clap::{Parser, Subcommand};

use super::types::{DependencyTypeArg, IssueStatusArg, PriorityArg};
use super::validators::{validate_estimate, validate_prefix, validate_reference, validate_title};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Edge id prefix (e.g., "dep" for "dep-k3v9x2ma")
    ///
    /// Must be 2-20 lowercase letters or digits.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `issue` command
#[derive(Parser, Debug, Clone)]
pub struct IssueArgs {
    /// Issue action to perform
    #[command(subcommand)]
    pub action: IssueAction,
}

/// Local issue registry actions
#[derive(Subcommand, Debug, Clone)]
pub enum IssueAction {
    /// Register or replace an issue
    Add {
        /// Human-readable identifier (e.g., PROJ-123)
        #[arg(value_parser = validate_reference)]
        identifier: String,

        /// Issue title
        #[arg(long, value_parser = validate_title)]
        title: String,

        /// Owning project
        #[arg(short = 'P', long, value_parser = validate_reference)]
        project: String,

        /// Internal id (defaults to the identifier)
        #[arg(long, value_parser = validate_reference)]
        id: Option<String>,

        /// Initial status
        #[arg(short, long, value_enum, default_value = "todo")]
        status: IssueStatusArg,

        /// Priority level
        #[arg(short, long, value_enum, default_value = "none")]
        priority: PriorityArg,

        /// Effort estimate
        #[arg(short, long, value_parser = validate_estimate)]
        estimate: Option<f64>,
    },

    /// Change the status of an issue
    Status {
        /// Issue id
        #[arg(value_parser = validate_reference)]
        id: String,

        /// New status
        #[arg(value_enum)]
        status: IssueStatusArg,
    },

    /// Remove an issue (its edges stay and are ignored from then on)
    #[command(alias = "remove")]
    Rm {
        /// Issue id
        #[arg(value_parser = validate_reference)]
        id: String,
    },

    /// List issues
    #[command(alias = "ls")]
    List {
        /// Only issues of this project
        #[arg(short = 'P', long, value_parser = validate_reference)]
        project: Option<String>,

        /// Include done and cancelled issues
        #[arg(short, long)]
        all: bool,
    },
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency action to perform
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add a dependency
    Add {
        /// Source issue (for blocks: the blocker)
        #[arg(value_parser = validate_reference)]
        source: String,

        /// Target issue (for blocks: the blocked issue)
        #[arg(value_parser = validate_reference)]
        target: String,

        /// Dependency type
        #[arg(short = 't', long = "type", value_enum, default_value = "blocks")]
        dep_type: DependencyTypeArg,
    },

    /// Remove a dependency by edge id
    #[command(alias = "remove")]
    Rm {
        /// Edge id (e.g., dep-k3v9x2ma)
        #[arg(value_parser = validate_reference)]
        edge_id: String,
    },

    /// Show every dependency of an issue
    Show {
        /// Issue id
        #[arg(value_parser = validate_reference)]
        id: String,
    },

    /// Show the transitive blockers of an issue
    Tree {
        /// Issue id
        #[arg(value_parser = validate_reference)]
        id: String,

        /// Maximum depth to traverse
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Check whether a blocks edge would create a cycle
    Check {
        /// Prospective blocker
        #[arg(value_parser = validate_reference)]
        source: String,

        /// Prospective blocked issue
        #[arg(value_parser = validate_reference)]
        target: String,
    },
}

/// Arguments for the `blocked` command
#[derive(Parser, Debug, Clone)]
pub struct BlockedArgs {
    /// Only issues of this project
    #[arg(short = 'P', long, value_parser = validate_reference)]
    pub project: Option<String>,
}

/// Arguments for the `ready` command
#[derive(Parser, Debug, Clone)]
pub struct ReadyArgs {
    /// Only issues of this project
    #[arg(short = 'P', long, value_parser = validate_reference)]
    pub project: Option<String>,

    /// Only issues with this status
    #[arg(short, long, value_enum)]
    pub status: Option<IssueStatusArg>,
}

/// Arguments for the `critical-path` command
#[derive(Parser, Debug, Clone)]
pub struct CriticalPathArgs {
    /// Project to analyse
    #[arg(value_parser = validate_reference)]
    pub project: String,
}
