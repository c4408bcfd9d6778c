pub mod config;
pub mod progress;
pub mod reset;
pub mod session;
pub mod snapshot;
pub mod status;

use mindsprout_core::{Config, SyncGateway};

/// Open the gateway for the loaded config, warning once if it came up in
/// degraded (local-only) mode.
pub fn open_gateway(config: &Config) -> Result<SyncGateway, Box<dyn std::error::Error>> {
    let gateway = SyncGateway::open(config)?;
    if gateway.is_degraded() {
        eprintln!(
            "warning: shared store unavailable, using local store at {} (widget will not update)",
            gateway.store_path().display()
        );
    }
    Ok(gateway)
}
