use clap::Args;
use eyerest_core::{
    Clock, Command, Driver, ManualClock, ManualScheduler, RecordingAlerts, RecordingSurface, Result,
    Wake,
};

use crate::terminal::status_text;

/// Fixed origin so repeated runs print identical snapshots.
const SIMULATION_EPOCH_MS: i64 = 1_700_000_000_000;

/// Longest suspension `simulate` will replay: one year.
const MAX_ELAPSED_SECS: f64 = 365.0 * 24.0 * 3600.0;

#[derive(Args)]
pub struct SimulateArgs {
    /// Seconds between starting the cycle and the next evaluation
    #[arg(long, value_parser = parse_elapsed)]
    elapsed: f64,
    /// Print the state snapshot and replayed transitions as JSON
    #[arg(long)]
    json: bool,
}

fn parse_elapsed(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if !secs.is_finite() || secs < 0.0 {
        Err(format!("'{s}' is not a non-negative number of seconds"))
    } else if secs > MAX_ELAPSED_SECS {
        Err(format!("'{s}' exceeds one year ({MAX_ELAPSED_SECS} seconds)"))
    } else {
        Ok(secs)
    }
}

/// Start a cycle on a manual clock, stay suspended for `elapsed`, then
/// evaluate once, as a backgrounded process regaining focus would.
pub fn run(args: SimulateArgs) -> Result<()> {
    let clock = ManualClock::new(SIMULATION_EPOCH_MS);
    let mut scheduler = ManualScheduler::new(clock.clone());
    let mut driver = Driver::new(
        clock.clone(),
        RecordingAlerts::default(),
        RecordingSurface::default(),
    );

    driver.handle(Wake::Command(Command::Start), &mut scheduler);
    clock.advance((args.elapsed * 1000.0).round() as i64);
    let transitions = driver.evaluate();
    let now = clock.now_ms();

    if args.json {
        let out = serde_json::json!({
            "snapshot": driver.engine().snapshot(now),
            "transitions": transitions,
            "view": driver.view(),
            "alerts_emitted": driver.alerts().emitted.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", status_text(&driver.view()));
        println!("replayed {} transition(s)", transitions.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_bounded_to_a_year() {
        assert_eq!(parse_elapsed("0"), Ok(0.0));
        assert_eq!(parse_elapsed("31536000"), Ok(MAX_ELAPSED_SECS));
        assert!(parse_elapsed("31536000.5").is_err());
        assert!(parse_elapsed("1e19").is_err());
        assert!(parse_elapsed("inf").is_err());
        assert!(parse_elapsed("-1").is_err());
    }
}
