//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Internship attendance client.
///
/// Signs configured accounts in and out of the attendance platform, either
/// on demand, from a scheduler trigger, or by evaluating each account's own
/// time windows.
#[derive(Debug, Parser)]
#[command(name = "xyb", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (TOML, or JSON with a `.json` extension).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run every account task whose time window matches now.
    Run,

    /// Run a whole batch for a scheduler trigger (`SignIn` or `SignOut`).
    ///
    /// Trigger batches always overwrite existing records.
    Trigger {
        /// The trigger name.
        name: String,
    },

    /// Sign in every configured account.
    SignIn {
        /// Replace an existing record instead of skipping.
        #[arg(long)]
        overwrite: bool,
    },

    /// Sign out every configured account.
    SignOut {
        /// Replace an existing sign-out instead of skipping.
        #[arg(long)]
        overwrite: bool,
    },

    /// List configured accounts and the tasks due now.
    Check,
}
