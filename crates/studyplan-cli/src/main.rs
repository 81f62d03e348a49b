use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "studyplan", version, about = "Studyplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Plan (or replan) a task into focus sessions
    Plan(commands::plan::PlanArgs),
    /// Show the seven-day calendar
    Weekly(commands::weekly::WeeklyArgs),
    /// Mark planned sessions
    Slot {
        #[command(subcommand)]
        action: commands::slot::SlotAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Tasks due today
    Digest(commands::digest::DigestArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Weekly(args) => commands::weekly::run(args),
        Commands::Slot { action } => commands::slot::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Digest(args) => commands::digest::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
