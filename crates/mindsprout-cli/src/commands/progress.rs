use clap::Subcommand;
use mindsprout_core::Config;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Aggregate state plus resolved growth stage
    Show,
    /// The milestone threshold table in effect
    Milestones,
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        ProgressAction::Show => {
            let gateway = super::open_gateway(&config)?;
            let state = gateway.load()?;
            let table = config.milestone_table()?;
            let resolution = table.resolve(state.total_minutes);
            let out = serde_json::json!({
                "state": state,
                "stage": resolution,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ProgressAction::Milestones => {
            let table = config.milestone_table()?;
            println!("{}", serde_json::to_string_pretty(table.stages())?);
        }
    }
    Ok(())
}
