//! Command-line interface for smartala.
//!
//! This module provides the CLI structure for the `smartala` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, LocationIdCommand, OutputFormat, RouteCommand, ServeCommand};

use crate::logging::Verbosity;

/// smartala - Voice navigation backend for pedestrians
///
/// Serves route synthesis and saved locations over HTTP, and exposes the
/// same route and id computations on the command line.
#[derive(Debug, Parser)]
#[command(name = "smartala")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Synthesize a walking route between two points
    Route(RouteCommand),

    /// Print the id a saved location would get
    LocationId(LocationIdCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "smartala");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["smartala", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.port, Some(8080));
                assert!(cmd.host.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_route_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "smartala",
            "route",
            "-33.86",
            "151.2",
            "-33.87",
            "151.21",
            "--to-name",
            "Opera House",
            "-f",
            "json",
        ])
        .unwrap();
        match cli.command {
            Command::Route(cmd) => {
                assert!((cmd.from_lat + 33.86).abs() < f64::EPSILON);
                assert_eq!(cmd.to_name.as_deref(), Some("Opera House"));
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_location_id() {
        let cli = Cli::try_parse_from(["smartala", "location-id", "43.2", "76.9", "Home"]).unwrap();
        assert!(matches!(cli.command, Command::LocationId(_)));
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["smartala", "-c", "/custom/config.toml", "config", "path"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["smartala", "-vv", "config", "path"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Trace);
        let cli = Cli::try_parse_from(["smartala", "-q", "config", "path"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }
}
