//! `smartala` - CLI for the navigation core
//!
//! Runs the HTTP server or performs one-off route and id computations.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use smartala::cli::{Cli, Command, ConfigCommand, LocationIdCommand, OutputFormat, RouteCommand};
use smartala::registry::{location_id, DEFAULT_NAME};
use smartala::{init_logging, server, synthesize_route, Config, Coordinate, NavigationService};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(cmd) => {
            if let Some(host) = cmd.host {
                config.server.host = host;
            }
            if let Some(port) = cmd.port {
                config.server.port = port;
            }
            config.validate()?;
            handle_serve(&config)
        }
        Command::Route(cmd) => handle_route(&cmd),
        Command::LocationId(cmd) => handle_location_id(&cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_serve(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(NavigationService::new(config)?);
    let addr = config.bind_address();

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime
        .block_on(server::serve(service, &addr))
        .with_context(|| format!("serving on {addr}"))
}

fn handle_route(cmd: &RouteCommand) -> anyhow::Result<()> {
    let start = Coordinate::new(cmd.from_lat, cmd.from_lng)?;
    let end = Coordinate::new(cmd.to_lat, cmd.to_lng)?;
    let route = synthesize_route(start, end, cmd.from_name.as_deref(), cmd.to_name.as_deref());

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&route)?),
        OutputFormat::Plain => {
            println!(
                "{} -> {}",
                route.start.description, route.end.description
            );
            println!(
                "Distance: {}   Time: {}",
                route.total_distance, route.estimated_time
            );
            println!();
            for (i, step) in route.steps.iter().enumerate() {
                println!("{:>2}. [{:>8}] {}", i + 1, step.distance, step.instruction);
            }
        }
    }
    Ok(())
}

fn handle_location_id(cmd: &LocationIdCommand) -> anyhow::Result<()> {
    let coordinate = Coordinate::new(cmd.lat, cmd.lng)?;
    let name = cmd
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_NAME);
    println!("{}", location_id(coordinate, name));
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.bind_address());
                println!("  Base URL:           {}", config.base_url());
                println!();
                println!("[Conversation]");
                println!("  Capacity:           {}", config.conversation.capacity);
                println!("  Context window:     {}", config.conversation.context_window);
                println!();
                println!("[Assistant]");
                println!("  City:               {}", config.assistant.city);
                println!(
                    "  Fallback position:  {}, {}",
                    config.assistant.fallback_latitude, config.assistant.fallback_longitude
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
