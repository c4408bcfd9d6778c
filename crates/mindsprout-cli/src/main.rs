use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mindsprout-cli", version, about = "Mindsprout CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and list practice sessions (writer side)
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Aggregate progress and milestones
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Reader-side snapshots (what the widget surface renders)
    Snapshot {
        #[command(subcommand)]
        action: commands::snapshot::SnapshotAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Store locations, degraded-mode flag, signal state
    Status,
    /// Erase all progress data
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Snapshot { action } => commands::snapshot::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Status => commands::status::run(),
        Commands::Reset { yes } => commands::reset::run(yes),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
