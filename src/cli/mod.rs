//! CLI interface for DealerDesk

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dealerdesk")]
#[command(version)]
#[command(about = "Dealership management server and admin tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new dealerdesk.toml configuration file
    Init,

    /// Start the HTTP API server and dashboard
    Serve {
        /// Host to bind to (defaults to the configured server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Use an in-memory store instead of Postgres (data is lost on exit)
        #[arg(long)]
        memory: bool,
    },

    /// Create an administrator account (prompts for the password)
    CreateAdmin {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address used to sign in
        #[arg(short, long)]
        email: String,
    },

    /// List all accounts
    Accounts,
}
