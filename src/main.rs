mod cli;
mod commands;
mod config;
mod snapshot;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use resgraph::Snapshot;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Config,
    /// Snapshot path from `--snapshot` or `STACKDOWN_SNAPSHOT`
    pub snapshot: Option<PathBuf>,
}

impl Context {
    /// Resolve and load the snapshot this invocation plans against
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        let path = config::resolve_snapshot_path(self.snapshot.as_deref(), &self.config)?;
        snapshot::load(&path)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "stackdown", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: Config::load(cli.config.as_deref())?,
        snapshot: cli.snapshot,
    };

    match cli.command {
        Command::Destroy(args) => commands::destroy::run(&ctx, args),
        Command::Dependents(args) => commands::query::dependents(&ctx, args),
        Command::Dependencies(args) => commands::query::dependencies(&ctx, args),
        Command::Protected(args) => commands::protected::run(&ctx, args),
        Command::Completions { .. } => Ok(()),
    }
}
