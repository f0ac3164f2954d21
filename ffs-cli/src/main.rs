//! ffs CLI - Command-line interface
//!
//! Maintains the tag catalogue and mounts it as a filesystem.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::catalogue;
use commands::config::ConfigCommands;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "ffs")]
#[command(version = ffs::VERSION)]
#[command(about = "Browse a tag catalogue of files as a filesystem", long_about = None)]
struct Cli {
    /// Configuration file to use instead of ~/.ffs/config.ini
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not import the configured store and delegate directories first
    #[arg(long, global = true)]
    skip_import: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Mount the catalogue at a directory and serve it until unmounted
    Mount {
        /// Existing empty directory to mount on
        mountpoint: PathBuf,
    },

    /// Register a file or directory, optionally with tags
    Add {
        /// File or directory to register
        path: PathBuf,

        /// Tags as name or name=value
        tags: Vec<String>,
    },

    /// Refresh location, hash and automatic tags of every point
    UpdateAll,

    /// Remove a point and its tags
    Remove {
        /// Point id
        id: i64,
    },

    /// Apply a tag to a point
    Tag {
        /// Point id
        id: i64,

        /// Tag name
        name: String,

        /// Tag value
        value: Option<String>,
    },

    /// Remove the tag of a point selected by a query such as genre or "year = 1999"
    Untag {
        /// Point id
        id: i64,

        /// Tag query
        query: String,
    },

    /// List points matching a tag path, one segment per argument
    Find {
        /// Tag path segments, e.g. music "year > 1990" "rock or jazz"
        segments: Vec<String>,
    },

    /// Import a store directory laid out as tag paths
    Import {
        /// Store directory
        dir: PathBuf,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands edit the file itself and need no catalogue.
    if let Commands::Config { command } = cli.command {
        return commands::config::run(command, cli.config.as_deref());
    }

    let runner = CliRunner::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Mount { mountpoint } => {
            runner.log_startup("mount");
            commands::mount::run(&runner, &mountpoint, cli.skip_import)
        }
        command => {
            runner.log_startup(command_name(&command));
            let mut library = runner.open_library(cli.skip_import)?;
            match command {
                Commands::Add { path, tags } => {
                    catalogue::run_add(&mut library, &path, &tags).map(|_| ())
                }
                Commands::UpdateAll => catalogue::run_update_all(&mut library).map(|_| ()),
                Commands::Remove { id } => catalogue::run_remove(&mut library, id),
                Commands::Tag { id, name, value } => {
                    catalogue::run_tag(&mut library, id, &name, value.as_deref())
                }
                Commands::Untag { id, query } => catalogue::run_untag(&mut library, id, &query),
                Commands::Find { segments } => catalogue::run_find(&library, &segments).map(|_| ()),
                Commands::Import { dir } => catalogue::run_import(&mut library, &dir),
                Commands::Mount { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Mount { .. } => "mount",
        Commands::Add { .. } => "add",
        Commands::UpdateAll => "update-all",
        Commands::Remove { .. } => "remove",
        Commands::Tag { .. } => "tag",
        Commands::Untag { .. } => "untag",
        Commands::Find { .. } => "find",
        Commands::Import { .. } => "import",
        Commands::Config { .. } => "config",
    }
}
