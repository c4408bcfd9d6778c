use chrono::Utc;
use clap::Subcommand;
use mindsprout_core::{Config, SnapshotProvider};

#[derive(Subcommand)]
pub enum SnapshotAction {
    /// Compute a snapshot of the committed state
    Show {
        /// Print the fixed bootstrap placeholder instead of real data
        #[arg(long)]
        placeholder: bool,
    },
    /// Poll for change signals and print a snapshot on each refresh
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value = "1000")]
        poll_ms: u64,
        /// Exit after this many refreshes (runs forever when omitted)
        #[arg(long)]
        count: Option<u64>,
    },
}

fn provider(config: &Config) -> Result<SnapshotProvider, Box<dyn std::error::Error>> {
    let gateway = super::open_gateway(config)?;
    let table = config.milestone_table()?;
    let provider = SnapshotProvider::new(gateway, table);
    Ok(match config.refresh.interval_secs {
        Some(secs) => provider.with_periodic_refresh(secs),
        None => provider,
    })
}

pub fn run(action: SnapshotAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        SnapshotAction::Show { placeholder } => {
            let provider = provider(&config)?;
            let snapshot = if placeholder {
                provider.placeholder(Utc::now())
            } else {
                provider.snapshot(Utc::now())?
            };
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        SnapshotAction::Watch { poll_ms, count } => {
            let mut provider = provider(&config)?;
            let mut refreshes = 0u64;
            loop {
                if let Some(snapshot) = provider.poll(Utc::now())? {
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                    refreshes += 1;
                    if count.is_some_and(|c| refreshes >= c) {
                        break;
                    }
                }
                std::thread::sleep(std::time::Duration::from_millis(poll_ms));
            }
        }
    }
    Ok(())
}
