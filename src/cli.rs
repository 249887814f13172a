//! Command-line interface definition for Parley
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot prompts, and
//! formatter inspection.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parley - multi-session chat client for LLM endpoints
///
/// Hold several named conversations with a remote model, optionally
/// attaching PDF text as extra context.
#[derive(Parser, Debug, Clone)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the model endpoint URL from config
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Parley
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive multi-session chat
    Chat {
        /// PDF to attach to the first message
        #[arg(short, long)]
        attach: Option<PathBuf>,
    },

    /// Send a single prompt and print the reply
    Ask {
        /// Prompt text
        prompt: String,

        /// PDF whose text is sent along with the prompt
        #[arg(short, long)]
        attach: Option<PathBuf>,
    },

    /// Run the response formatter over a file (or stdin) and print the markup
    Format {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,
    },
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
            endpoint: None,
            verbose: false,
            command: Commands::Chat { attach: None },
        }
    }
}
