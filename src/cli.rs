//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::registry::TopicId;

/// ndtips - Natural Docs tooltip registry CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root containing the generated documentation
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Docs directory path (relative to project root)
    #[arg(short, long)]
    pub docs: Option<PathBuf>,

    /// Config file name (default: ndtips.toml)
    #[arg(short = 'C', long, default_value = "ndtips.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Load all tooltip payloads and print a summary
    Scan,

    /// Validate all tooltip payloads; exits nonzero on any problem
    Check,

    /// Look up one tooltip fragment and print it
    Get {
        /// Namespace of the documented class (e.g. "SQFClass:Group")
        namespace: String,

        /// Topic id within the namespace
        id: TopicId,
    },

    /// Dump the whole registry as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Serve tooltip lookups over HTTP. Re-scan on change automatically
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// enable watch
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check)
    }
    pub const fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve { .. })
    }
}
