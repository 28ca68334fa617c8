//! Command-line interface definition.

use clap::{Parser, Subcommand};

/// calgate - call calendar tools on behalf of an authenticated user
#[derive(Debug, Parser)]
#[command(name = "calgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the exposed tools
    Tools {
        /// Print the full descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke one tool
    Call {
        /// Tool name (canonical or short alias)
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, short, default_value = "{}")]
        args: String,

        /// Raw Authorization header value, e.g. "Bearer eyJ..."
        #[arg(long, env = "CALGATE_AUTHORIZATION", hide_env_values = true)]
        authorization: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration with secrets masked
    Show,

    /// Check that the configuration is complete and usable
    Validate,
}
