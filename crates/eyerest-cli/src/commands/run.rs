use std::time::Duration;

use clap::Args;
use eyerest_core::{Command, Config, Driver, HostSignal, Result, SystemClock, TokioScheduler};
use futures::StreamExt;
use signal_hook::consts::{SIGCONT, SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{info, warn};

use crate::terminal::{self, Flash, StatusLine};

#[derive(Args, Default)]
pub struct RunArgs {
    /// Disable the tone
    #[arg(long)]
    no_sound: bool,
    /// Start with haptic pulses enabled
    #[arg(long, conflicts_with = "no_haptics")]
    haptics: bool,
    /// Start with haptic pulses disabled
    #[arg(long)]
    no_haptics: bool,
    /// Disable the reverse-video flash
    #[arg(long)]
    no_flash: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if self.no_sound {
            config.alerts.sound_enabled = false;
        }
        if self.haptics {
            config.alerts.haptics_enabled = true;
        }
        if self.no_haptics {
            config.alerts.haptics_enabled = false;
        }
        if self.no_flash {
            config.alerts.flash_enabled = false;
        }
    }
}

pub fn run(args: RunArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(serve(config));
    // The stdin reader parks on a blocking read; do not wait for it.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn serve(config: Config) -> Result<()> {
    let (cmd_tx, cmd_rx) = unbounded_channel();
    let (sig_tx, sig_rx) = unbounded_channel();

    let signals = Signals::new([SIGCONT, SIGINT, SIGTERM])?;
    let signals_handle = signals.handle();
    tokio::spawn(watch_signals(signals, sig_tx));
    tokio::spawn(read_commands(cmd_tx));

    let mut scheduler = TokioScheduler::new(&config.driver, cmd_rx, sig_rx);
    let flash = Flash::default();
    let mut driver = Driver::new(
        SystemClock,
        terminal::alerts(&config.alerts, flash.clone()),
        StatusLine::new(std::io::stdout(), flash),
    );

    info!("eyerest ready");
    driver.run(&mut scheduler).await;
    println!();

    signals_handle.close();
    Ok(())
}

/// Forward control lines from stdin. Unknown input is reported and skipped.
async fn read_commands(tx: UnboundedSender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match line.parse::<Command>() {
                Ok(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("{e}"),
            },
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        }
    }
}

/// SIGCONT means we were foregrounded again; INT and TERM end the session.
async fn watch_signals(mut signals: Signals, tx: UnboundedSender<HostSignal>) {
    while let Some(signal) = signals.next().await {
        let host = match signal {
            SIGCONT => HostSignal::FocusRegained,
            _ => HostSignal::Shutdown,
        };
        info!(signal, ?host, "received signal");
        if tx.send(host).is_err() {
            break;
        }
    }
}
