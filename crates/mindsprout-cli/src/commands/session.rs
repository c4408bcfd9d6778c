use chrono::{DateTime, Utc};
use clap::Subcommand;
use mindsprout_core::{Config, ProgressTracker};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Record a completed practice session
    Record {
        /// Session duration in minutes
        #[arg(long)]
        minutes: u64,
        /// Completion time as RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List the recorded session history as JSON
    List,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let gateway = super::open_gateway(&config)?;
    let tracker = ProgressTracker::new(gateway);

    match action {
        SessionAction::Record { minutes, at } => {
            let at = match at {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc),
                None => Utc::now(),
            };
            let state = tracker.record_session(minutes, at)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        SessionAction::List => {
            let sessions = tracker.sessions()?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
