//! CLI module for treebridge
//!
//! This module provides the command-line interface over the projection engine. Plans and event streams come from
//! JSON fixtures (see [`crate::discovery::fixture`]).
//!
//! ## Commands
//!
//! - `tree <plan>` - Print the projected description tree
//! - `replay <plan> <events>` - Replay an event stream and print the legacy notifications
//!   (`-k <name>` reports only the `select` subset)
//! - `select <plan> -k <name>` - Print the leaf-filtered unique IDs whose names match
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::config::RunConfig;
use crate::discovery::ShardingFilter;
use crate::naming::NamingMode;
use crate::plan::ParentPolicy;
use crate::tree::DescriptionLayout;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Process exit code of a treebridge command.
///
/// `0` when every replayed test passed, `1` when a test or container failed or an input could not be loaded,
/// and [`ExitCode::PROJECTION_ERROR`] when an event could not be correlated with the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// An event referenced an unknown identifier or registered a node under an unknown parent.
    pub const PROJECTION_ERROR: ExitCode = ExitCode(2);
}

/// A command that could not complete: the message for stderr and the code to exit with.
///
/// Fixture problems carry a rendered `miette` report as their message; correlation problems carry the
/// [`crate::error::ProjectionError`] text.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Exit with [`ExitCode::FAILURE`].
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Exit with [`ExitCode::PROJECTION_ERROR`].
    pub fn projection(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::PROJECTION_ERROR)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Project hierarchical test plans onto legacy suite/test runners
#[derive(Parser, Debug)]
#[command(name = "treebridge")]
#[command(version = VERSION)]
#[command(about = "Project hierarchical test plans onto legacy suite/test runners", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that builds a description tree.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectionArgs {
    /// Name containers after their source (qualified class names, method signatures)
    #[arg(long)]
    pub technical: bool,
    /// Name tests after their legacy reporting name (isolated method runs)
    #[arg(long)]
    pub legacy: bool,
    /// Use the two-level legacy layout
    #[arg(long)]
    pub folded: bool,
    /// Group dynamic nodes under their structural grandparent
    #[arg(long)]
    pub grandparent: bool,
    /// Suite label (default: the fixture's label, then the first root's name)
    #[arg(long, value_name = "LABEL")]
    pub label: Option<String>,
    /// Configuration parameters passed to the platform
    #[arg(short = 'C', long = "config", value_name = "KEY=VALUE[,KEY=VALUE]")]
    pub config: Vec<String>,
}

impl ProjectionArgs {
    pub fn run_config(&self) -> RunConfig {
        let naming = if self.technical {
            NamingMode::Technical
        } else {
            NamingMode::Display
        };
        let layout = if self.folded {
            DescriptionLayout::Folded
        } else {
            DescriptionLayout::Nested
        };
        let policy = if self.grandparent {
            ParentPolicy::Grandparent
        } else {
            ParentPolicy::SkipDynamicAncestors
        };

        self.config.iter().fold(
            RunConfig::new()
                .with_naming(naming)
                .with_legacy_format(self.legacy)
                .with_layout(layout)
                .with_parent_policy(policy),
            |config, properties| config.with_configuration_parameters(properties),
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the projected description tree
    Tree {
        /// Plan fixture (JSON)
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
        #[command(flatten)]
        projection: ProjectionArgs,
    },

    /// Replay an event stream and print the legacy notifications
    Replay {
        /// Plan fixture (JSON)
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
        /// Event fixture (JSON)
        #[arg(value_name = "EVENTS")]
        events: PathBuf,
        #[command(flatten)]
        projection: ProjectionArgs,
        /// Print notifications as JSON instead of console output
        #[arg(long)]
        json: bool,
        /// Only run one shard, given as NUM_SHARDS/SHARD_INDEX
        #[arg(long, value_name = "N/I", value_parser = parse_shard)]
        shard: Option<ShardingFilter>,
        /// Only run tests carrying one of these tags
        #[arg(long = "include-tag", value_name = "TAG")]
        include_tags: Vec<String>,
        /// Skip tests carrying any of these tags
        #[arg(long = "exclude-tag", value_name = "TAG")]
        exclude_tags: Vec<String>,
        /// Filter file with `-t <tags>` and `-T <tags>` lines
        #[arg(long = "filters", value_name = "FILE")]
        filter_file: Option<PathBuf>,
        /// Only report tests below the descriptions whose names contain this substring
        #[arg(short = 'k', long = "name", value_name = "SUBSTRING")]
        name: Option<String>,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the leaf-filtered unique IDs whose description names contain a substring
    Select {
        /// Plan fixture (JSON)
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
        /// Substring to match against description names
        #[arg(short = 'k', long = "name", value_name = "SUBSTRING")]
        name: String,
        #[command(flatten)]
        projection: ProjectionArgs,
    },
}

/// Parse `N/I` into a sharding filter.
fn parse_shard(value: &str) -> Result<ShardingFilter, String> {
    let (num_shards, shard_index) = value
        .split_once('/')
        .ok_or_else(|| format!("expected NUM_SHARDS/SHARD_INDEX, got '{value}'"))?;
    let num_shards = num_shards
        .trim()
        .parse()
        .map_err(|e| format!("invalid shard count '{num_shards}': {e}"))?;
    let shard_index = shard_index
        .trim()
        .parse()
        .map_err(|e| format!("invalid shard index '{shard_index}': {e}"))?;
    ShardingFilter::new(num_shards, shard_index)
        .ok_or_else(|| format!("shard index must be below the shard count, got '{value}'"))
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Tree { plan, projection } => commands::print_tree(&plan, &projection),
        Command::Replay {
            plan,
            events,
            projection,
            json,
            shard,
            include_tags,
            exclude_tags,
            filter_file,
            name,
            verbose,
        } => {
            let filters = commands::collect_filters(shard, include_tags, exclude_tags, filter_file.as_deref())?;
            commands::replay(&plan, &events, &projection, filters, name.as_deref(), json, verbose)
        }
        Command::Select { plan, name, projection } => commands::select(&plan, &name, &projection),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_tree() {
        let cli = Cli::try_parse_from(["treebridge", "tree", "plan.json", "--technical", "--folded"]).unwrap();
        if let Command::Tree { plan, projection } = cli.command {
            assert_eq!(plan, PathBuf::from("plan.json"));
            assert!(projection.technical);
            assert!(projection.folded);
        } else {
            panic!("Expected Tree command");
        }
    }

    #[test]
    fn test_cli_parse_replay() {
        let cli = Cli::try_parse_from([
            "treebridge",
            "replay",
            "plan.json",
            "events.json",
            "--json",
            "--shard",
            "4/1",
            "--include-tag",
            "fast",
            "-k",
            "sums",
            "-v",
        ])
        .unwrap();
        if let Command::Replay {
            json,
            shard,
            include_tags,
            name,
            verbose,
            ..
        } = cli.command
        {
            assert_eq!(name.as_deref(), Some("sums"));
            assert!(json);
            assert!(verbose);
            assert_eq!(shard, ShardingFilter::new(4, 1));
            assert_eq!(include_tags, vec!["fast"]);
        } else {
            panic!("Expected Replay command");
        }
    }

    #[test]
    fn test_cli_rejects_bad_shard() {
        assert!(Cli::try_parse_from(["treebridge", "replay", "p.json", "e.json", "--shard", "2/2"]).is_err());
        assert!(Cli::try_parse_from(["treebridge", "replay", "p.json", "e.json", "--shard", "two"]).is_err());
    }

    #[test]
    fn test_cli_parse_select() {
        let cli = Cli::try_parse_from(["treebridge", "select", "plan.json", "-k", "adds"]).unwrap();
        if let Command::Select { name, .. } = cli.command {
            assert_eq!(name, "adds");
        } else {
            panic!("Expected Select command");
        }
    }

    #[test]
    fn test_projection_args_to_run_config() {
        let args = ProjectionArgs {
            technical: true,
            legacy: true,
            grandparent: true,
            config: vec!["a=1,b=2".to_string(), "junit.jupiter.execution.parallel.enabled=true".to_string()],
            ..Default::default()
        };
        let config = args.run_config();
        assert_eq!(config.naming, NamingMode::Technical);
        assert!(config.legacy_format);
        assert_eq!(config.layout, DescriptionLayout::Nested);
        assert_eq!(config.parent_policy, ParentPolicy::Grandparent);
        assert_eq!(config.parameter("b"), Some("2"));
        assert!(config.is_parallel_execution_enabled());
    }
}
