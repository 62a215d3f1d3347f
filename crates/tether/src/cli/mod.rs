//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a new tether repository
//! - `issue`: Maintain the local issue registry (`add`, `status`, `rm`, `list`)
//! - `dep`: Manage dependencies (`add`, `rm`, `show`, `tree`, `check`)
//! - `blocked`: Show blocked issues and their blockers
//! - `ready`: Show issues nobody actively blocks
//! - `critical-path`: Show the longest blocking chain of a project
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! tether issue add API-1 --title "Design schema" --project api --priority high
//! tether issue add API-2 --title "Implement endpoints" --project api
//! tether dep add API-1 API-2
//! tether ready --project api
//! tether critical-path api
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    BlockedArgs, CriticalPathArgs, DepAction, DepArgs, InitArgs, IssueAction, IssueArgs, ReadyArgs,
};
pub use types::{DependencyTypeArg, IssueStatusArg, PriorityArg};
pub use validators::{validate_estimate, validate_prefix, validate_reference, validate_title};

/// Tether - issue dependency tracking
///
/// Records blocks/relates/duplicates links between issues, refuses circular
/// blocking, and shows what is blocked, what is ready and the critical path.
/// Data lives in `.tether/` as JSONL files.
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new tether repository
    ///
    /// Creates `.tether/` with configuration and empty data files.
    Init(InitArgs),

    /// Maintain the local issue registry
    Issue(IssueArgs),

    /// Manage dependencies between issues
    Dep(DepArgs),

    /// Show blocked issues
    ///
    /// Lists active issues with at least one active blocker.
    Blocked(BlockedArgs),

    /// Show issues ready to work on
    ///
    /// Lists active issues that no active issue blocks, most urgent first.
    Ready(ReadyArgs),

    /// Show the critical path of a project
    ///
    /// The longest chain of blocks dependencies among the project's active issues.
    CriticalPath(CriticalPathArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any error raised while loading the repository or running the command.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("tether {}", env!("CARGO_PKG_VERSION"));
            println!("Run 'tether --help' for usage information.");
            return Ok(());
        };

        if let Commands::Init(args) = command {
            return execute::execute_init(args, output_mode).await;
        }

        let app = App::from_directory(&std::env::current_dir()?).await?;
        match command {
            Commands::Init(_) => Ok(()),
            Commands::Issue(args) => execute::execute_issue(&app, args, output_mode).await,
            Commands::Dep(args) => execute::execute_dep(&app, args, output_mode).await,
            Commands::Blocked(args) => execute::execute_blocked(&app, args, output_mode).await,
            Commands::Ready(args) => execute::execute_ready(&app, args, output_mode).await,
            Commands::CriticalPath(args) => {
                execute::execute_critical_path(&app, args, output_mode).await
            }
        }
    }
}
