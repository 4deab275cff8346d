//! Command line interface for the `stranger-beers` binary.

use clap::{Args, Parser, Subcommand};

pub const MATCHING_PLACEHOLDER: &str = "matching_service: not yet implemented";
pub const COMMS_PLACEHOLDER: &str = "comms_service: not yet implemented";
pub const DB_DOWNGRADE_PLACEHOLDER: &str = "db downgrade: not yet implemented";

#[derive(Debug, Parser)]
#[command(name = "stranger-beers")]
#[command(about = "Stranger Beers services: Tally ingestion API and database tasks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for the default `serve` command
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the ingestion API (default)
    Serve(ServeArgs),

    /// Database schema tasks
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },

    /// Participant matching service
    Matching,

    /// Participant communications service
    Comms,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Keep data in process instead of Postgres (lost on exit)
    #[arg(long)]
    pub memory_store: bool,
}

#[derive(Debug, Subcommand)]
pub enum DbCommand {
    /// Apply pending migrations
    Upgrade,

    /// Revert the last migration
    Downgrade,

    /// Create a new migration
    Revision {
        /// Migration description
        #[arg(short, long)]
        message: Option<String>,
    },
}

impl Cli {
    /// Serve options, whether or not `serve` was spelled out
    pub fn serve_args(&self) -> Option<ServeArgs> {
        match &self.command {
            None => Some(self.serve.clone()),
            Some(Commands::Serve(args)) => Some(ServeArgs {
                memory_store: args.memory_store || self.serve.memory_store,
            }),
            Some(_) => None,
        }
    }
}

/// Output for commands that are not implemented yet, `None` for real commands
pub fn placeholder_message(command: &Commands) -> Option<String> {
    match command {
        Commands::Matching => Some(MATCHING_PLACEHOLDER.to_string()),
        Commands::Comms => Some(COMMS_PLACEHOLDER.to_string()),
        Commands::Db {
            command: DbCommand::Downgrade,
        } => Some(DB_DOWNGRADE_PLACEHOLDER.to_string()),
        Commands::Db {
            command: DbCommand::Revision { message },
        } => Some(match message {
            Some(message) => format!("db revision: not yet implemented (message: {})", message),
            None => "db revision: not yet implemented".to_string(),
        }),
        Commands::Serve(_)
        | Commands::Db {
            command: DbCommand::Upgrade,
        } => None,
    }
}
