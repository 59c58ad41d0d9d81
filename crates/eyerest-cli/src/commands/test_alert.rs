use std::time::Duration;

use eyerest_core::driver::TEST_ALERT_SECS;
use eyerest_core::{AlertSink, Config, Result};

use crate::terminal;

/// Fire the diagnostic alert outside any timer session.
pub fn run(config: Config) -> Result<()> {
    let mut alerts = terminal::emitter(&config.alerts, terminal::Flash::default());
    alerts.unlock();
    alerts.emit(TEST_ALERT_SECS);
    std::thread::sleep(Duration::from_secs(TEST_ALERT_SECS));
    alerts.stop();
    println!("audio output: {:?}", alerts.audio().state());
    Ok(())
}
