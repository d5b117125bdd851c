//! Command-line interface definition for Sitechat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions, and
//! backend health checks.

use clap::{Parser, Subcommand};

/// Sitechat - the website assistant widget, in your terminal
///
/// Sends questions to the site's `/chat` endpoint and renders the answer
/// with its source links.
#[derive(Parser, Debug, Clone)]
#[command(name = "sitechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SITECHAT_CONFIG", default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Origin of the site hosting the chat backend (overrides config)
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Sitechat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the reply
    Ask {
        /// The question to send
        message: String,
    },

    /// Check that the chat backend is up
    Health,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            origin: None,
            command: Commands::Chat,
        }
    }
}
