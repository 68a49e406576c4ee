//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Route command arguments.
#[derive(Debug, Args)]
pub struct RouteCommand {
    /// Start latitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub from_lat: f64,

    /// Start longitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub from_lng: f64,

    /// Destination latitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub to_lat: f64,

    /// Destination longitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub to_lng: f64,

    /// Label for the start
    #[arg(long)]
    pub from_name: Option<String>,

    /// Label for the destination
    #[arg(long)]
    pub to_name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Location id command arguments.
#[derive(Debug, Args)]
pub struct LocationIdCommand {
    /// Latitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(allow_negative_numbers = true)]
    pub lng: f64,

    /// Location name
    pub name: Option<String>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_route_command_debug() {
        let cmd = RouteCommand {
            from_lat: 1.0,
            from_lng: 2.0,
            to_lat: 3.0,
            to_lng: 4.0,
            from_name: None,
            to_name: Some("Park".to_string()),
            format: OutputFormat::Json,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("to_name"));
        assert!(debug_str.contains("Park"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
