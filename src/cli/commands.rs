//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Salesforce connector CLI
#[derive(Parser, Debug)]
#[command(name = "salesforce-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline settings JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON) holding the incremental read offset
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format for non-record messages
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List readable tables and their fields
    Discover,

    /// Probe read access to each entity
    Check,

    /// Read every row of a table
    Read {
        /// Table to read
        #[arg(long)]
        table: String,

        /// Records per page (overrides settings)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Report rows changed since the stored offset
    Stream {
        /// Tables to poll (comma-separated)
        #[arg(long, value_delimiter = ',', required = true)]
        tables: Vec<String>,

        /// Records per page (overrides settings)
        #[arg(long)]
        page_size: Option<u32>,

        /// Keep polling until interrupted
        #[arg(long)]
        follow: bool,
    },

    /// Exchange an authorization code for tokens
    Oauth {
        /// Code from the authorize redirect
        #[arg(long)]
        code: String,

        /// Redirect URI registered on the connected app
        #[arg(long)]
        redirect_uri: String,
    },

    /// Obtain a new access token from the refresh token
    Refresh,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stream_tables() {
        let cli = Cli::parse_from([
            "salesforce-connector",
            "--config",
            "settings.yaml",
            "stream",
            "--tables",
            "Contact,Lead",
            "--follow",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("settings.yaml")));
        match cli.command {
            Commands::Stream {
                tables,
                follow,
                page_size,
            } => {
                assert_eq!(tables, vec!["Contact", "Lead"]);
                assert!(follow);
                assert!(page_size.is_none());
            }
            other => panic!("Expected Stream, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_oauth() {
        let cli = Cli::parse_from([
            "salesforce-connector",
            "oauth",
            "--code",
            "aPrx",
            "--redirect-uri",
            "https://host/callback",
            "-v",
        ]);

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Oauth { ref code, .. } if code == "aPrx"));
    }

    #[test]
    fn test_read_requires_table() {
        assert!(Cli::try_parse_from(["salesforce-connector", "read"]).is_err());
    }
}
