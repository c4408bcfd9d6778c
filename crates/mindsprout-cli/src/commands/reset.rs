use std::io::Write;

use mindsprout_core::{Config, ProgressTracker};

pub fn run(yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !yes {
        print!("This erases all sessions and progress. Type 'reset' to confirm: ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if answer.trim() != "reset" {
            println!("aborted");
            return Ok(());
        }
    }

    let config = Config::load_or_default();
    let gateway = super::open_gateway(&config)?;
    let tracker = ProgressTracker::new(gateway);
    tracker.reset_all_data()?;
    println!("ok");
    Ok(())
}
