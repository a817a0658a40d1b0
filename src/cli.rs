//! Command-line interface definition for SchoolFinder
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat and chat history management.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SchoolFinder - find the right school through conversation
///
/// Ask the assistant about schools or browse in classic mode; every
/// conversation is saved to a local history you can resume later.
#[derive(Parser, Debug, Clone)]
#[command(name = "schoolfinder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the conversation store location
    #[arg(long, global = true)]
    pub store_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for SchoolFinder
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive school search
    Chat {
        /// Starting view: assistant or classic
        #[arg(short, long)]
        mode: Option<String>,

        /// Resume a saved conversation by ID
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Manage saved conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved conversations, most recent first
    List {
        /// Only show conversations whose title or preview contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a saved conversation
    Show {
        /// Conversation ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a saved conversation
    Delete {
        /// Conversation ID
        id: String,
    },

    /// Delete all saved conversations
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            store_path: None,
            command: Commands::Chat {
                mode: None,
                resume: None,
            },
        }
    }
}
