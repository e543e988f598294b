//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flotilla")]
#[command(about = "Flotilla - Ephemeral container-fleet orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Path to a config file (defaults to .flotilla/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize Flotilla configuration
    Init {
        /// Force reinitialization even if already initialized
        #[arg(short, long)]
        force: bool,
    },

    /// Create a fleet and run a task across it
    Fleet {
        /// Container image to run
        #[arg(short, long)]
        image: String,

        /// Task command executed on every instance
        #[arg(short, long)]
        task: String,

        /// Fleet name (generated when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Number of instances
        #[arg(long, default_value = "1")]
        instances: usize,

        /// Newline-delimited target file, sharded across instances
        #[arg(short = 'f', long)]
        targets_file: Option<PathBuf>,

        /// Wait budget in seconds per container
        #[arg(short, long)]
        wait: Option<u64>,

        /// Provider region
        #[arg(short, long)]
        region: Option<String>,

        /// Remove the fleet's groups after outputs are collected
        #[arg(long)]
        rm_when_done: bool,
    },

    /// Run a task on a single named instance
    Run {
        /// Instance name
        name: String,

        /// Container image to run
        #[arg(short, long)]
        image: String,

        /// Task command
        #[arg(short, long)]
        task: String,

        /// Wait budget in seconds
        #[arg(short, long)]
        duration: Option<u64>,

        /// Remove the instance's group afterwards
        #[arg(long)]
        cleanup: bool,

        /// Provider region
        #[arg(short, long)]
        region: Option<String>,
    },

    /// List known container groups and their instances
    Ls,

    /// Select groups by glob pattern and run a command on every container
    Exec {
        /// Glob pattern over group names (`*` wildcard)
        pattern: String,

        /// Command to inject into each running container
        #[arg(short, long)]
        task: String,

        /// Wait budget in seconds per container
        #[arg(short, long, default_value = "600")]
        wait: u64,

        /// Newline-delimited target file, sharded across the selection
        #[arg(short = 'f', long)]
        targets_file: Option<PathBuf>,
    },

    /// Remove groups matching a glob pattern
    Rm {
        /// Glob pattern over group names (`*` wildcard)
        pattern: String,
    },
}
