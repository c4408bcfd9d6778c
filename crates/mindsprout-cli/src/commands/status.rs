use mindsprout_core::Config;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let gateway = super::open_gateway(&config)?;
    let state = gateway.load()?;
    let sessions = gateway.sessions()?;

    let out = serde_json::json!({
        "store_path": gateway.store_path(),
        "signal_path": gateway.signal_path(),
        "signal_present": gateway.signal_path().exists(),
        "degraded": gateway.is_degraded(),
        "session_count": sessions.len(),
        "total_minutes": state.total_minutes,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
