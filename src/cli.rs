use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackdown")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Plan safe destruction of infrastructure stack resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Stack snapshot to plan against (JSON)
    #[arg(long, global = true, env = "STACKDOWN_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/stackdown/config.toml)
    #[arg(long, global = true, env = "STACKDOWN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute which resources a destroy would delete, in deletion order
    Destroy(DestroyArgs),

    /// List every resource that depends on a resource
    Dependents(DependentsArgs),

    /// List everything a resource depends on
    Dependencies(DependenciesArgs),

    /// Show which resources are protected and which can be destroyed
    Protected(OutputArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Destroy
// ============================================================================

#[derive(Args)]
pub struct DestroyArgs {
    /// Resource URN to destroy; repeat for multiple targets
    #[arg(short, long = "target", value_name = "URN")]
    pub targets: Vec<String>,

    /// Also destroy resources that depend on a target
    #[arg(long)]
    pub target_dependents: bool,

    /// Destroy everything except protected resources and what they need
    #[arg(long)]
    pub exclude_protected: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

// ============================================================================
// Graph Queries
// ============================================================================

#[derive(Args)]
pub struct DependentsArgs {
    /// Resource URN
    pub urn: String,

    /// URN to leave out of the result (and not traverse through)
    #[arg(long, value_name = "URN")]
    pub ignore: Vec<String>,

    /// Count direct children as dependents
    #[arg(long)]
    pub include_children: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct DependenciesArgs {
    /// Resource URN
    pub urn: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Clone, Copy, Default)]
pub struct OutputArgs {
    /// Print machine-readable JSON
    #[arg(short, long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_destroy_targets() {
        let cli = Cli::try_parse_from([
            "stackdown",
            "destroy",
            "-t",
            "urn:a",
            "--target",
            "urn:b",
            "--target-dependents",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Command::Destroy(args) => {
                assert_eq!(args.targets, vec!["urn:a", "urn:b"]);
                assert!(args.target_dependents);
                assert!(!args.exclude_protected);
                assert!(args.output.json);
            }
            _ => panic!("expected destroy"),
        }
    }

    #[test]
    fn test_conflicting_destroy_flags_reach_planner() {
        // The planner owns this check, so parsing must not reject it first
        let cli = Cli::try_parse_from([
            "stackdown",
            "destroy",
            "--target",
            "urn:a",
            "--exclude-protected",
        ]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_global_snapshot_flag() {
        let cli = Cli::try_parse_from([
            "stackdown",
            "dependents",
            "urn:a",
            "--snapshot",
            "/tmp/stack.json",
            "--ignore",
            "urn:b",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.snapshot, Some(PathBuf::from("/tmp/stack.json")));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Dependents(args) => {
                assert_eq!(args.urn, "urn:a");
                assert_eq!(args.ignore, vec!["urn:b"]);
                assert!(!args.include_children);
            }
            _ => panic!("expected dependents"),
        }
    }
}
