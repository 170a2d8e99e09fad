use clap::{Parser, Subcommand};

mod commands;
mod demo;
mod store;

#[derive(Parser)]
#[command(name = "breakwise-cli", version, about = "Breakwise CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calendar feed management
    Calendar {
        #[command(subcommand)]
        action: commands::calendar::CalendarAction,
    },
    /// Break recommendation lifecycle
    Break {
        #[command(subcommand)]
        action: commands::breaks::BreakAction,
    },
    /// Favorite activity management
    Favorite {
        #[command(subcommand)]
        action: commands::favorites::FavoriteAction,
    },
    /// Demo day and stress overview
    Day {
        #[command(subcommand)]
        action: commands::day::DayAction,
    },
    /// Learned activity statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Calendar { action } => commands::calendar::run(action),
        Commands::Break { action } => commands::breaks::run(action),
        Commands::Favorite { action } => commands::favorites::run(action),
        Commands::Day { action } => commands::day::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
