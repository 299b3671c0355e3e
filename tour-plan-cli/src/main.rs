use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod workspace;

use commands::{
    ConfigCommand, ExportCommand, LocationCommand, LoginCommand, LogoutCommand, RouteCommand,
    SampleCommand, ScheduleCommand, SyncCommand, TourCommand, WeatherCommand,
};
use config::Config;
use workspace::Workspace;

const DEFAULT_LOG_FILTER: &str = "tour_plan_core=warn,tour=warn";

#[derive(Parser)]
#[command(name = "tour")]
#[command(version)]
#[command(about = "Plan trips day by day and export them as PDF", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, inspect and change the working tour
    Tour(TourCommand),

    /// Manage schedule entries
    Schedule(ScheduleCommand),

    /// Attach places to the plan
    Location(LocationCommand),

    /// Attach transit rides to the plan
    Route(RouteCommand),

    /// Record forecasts for trip days
    Weather(WeatherCommand),

    /// Save and load tours on the persistence server
    Sync(SyncCommand),

    /// Remember the user tours are saved for
    Login(LoginCommand),

    /// Forget the stored session
    Logout(LogoutCommand),

    /// Render the plan as a PDF
    Export(ExportCommand),

    /// Load a sample Seoul itinerary
    Sample(SampleCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for init command
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;
    let workspace = Workspace::new(config.data_dir.value.clone());

    match &cli.command {
        Some(Commands::Tour(cmd)) => cmd.run(&workspace)?,
        Some(Commands::Schedule(cmd)) => cmd.run(&workspace)?,
        Some(Commands::Location(cmd)) => cmd.run(&workspace)?,
        Some(Commands::Route(cmd)) => cmd.run(&workspace)?,
        Some(Commands::Weather(cmd)) => cmd.run(&workspace)?,
        Some(Commands::Sync(cmd)) => cmd.run(&workspace, &config)?,
        Some(Commands::Login(cmd)) => cmd.run(&workspace)?,
        Some(Commands::Logout(cmd)) => cmd.run(&workspace)?,
        Some(Commands::Export(cmd)) => cmd.run(&workspace, &config)?,
        Some(Commands::Sample(cmd)) => cmd.run(&workspace)?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path)?,
        None => println!("Use --help to see available commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export_flags() {
        let cli = Cli::try_parse_from([
            "tour",
            "export",
            "--date",
            "2025-07-15",
            "--filename",
            "day1",
            "--preview",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Export(cmd)) => {
                assert_eq!(cmd.date.as_deref(), Some("2025-07-15"));
                assert_eq!(cmd.filename.as_deref(), Some("day1"));
                assert!(cmd.preview);
            }
            _ => panic!("expected export"),
        }
    }
}
