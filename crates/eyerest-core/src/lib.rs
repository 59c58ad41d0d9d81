//! # eyerest Core Library
//!
//! This library provides the core logic for eyerest, a 20-20-20 eye-rest
//! timer: 20 minutes of work, a 3-second beep, 20 seconds of rest, another
//! beep, repeating until stopped. The `eyerest` CLI is a thin terminal layer
//! over the same library.
//!
//! ## Architecture
//!
//! - **Phase Engine**: A wall-clock-based state machine keyed on an absolute
//!   phase-end timestamp. The caller samples the clock and invokes
//!   `advance()`, which replays any transitions missed while suspended
//! - **Alerts**: Tone, haptic pulse and visual flash behind narrow traits;
//!   failures are swallowed
//! - **Presentation**: Pure mapping from timer state to a displayable view
//! - **Driver**: Re-evaluates the engine on frames, a safety poll and focus
//!   regain, with the scheduling injected
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PhaseEngine`]: Core timer state machine
//! - [`AlertEmitter`]: Audio/haptic/visual alert composition
//! - [`Driver`]: Event loop tying clock, engine, alerts and surface together
//! - [`Config`]: Application configuration management

pub mod alert;
pub mod clock;
pub mod driver;
pub mod error;
pub mod events;
pub mod presentation;
pub mod storage;
pub mod timer;

pub use alert::{AlertEmitter, AlertSink, AudioState, Coalesced, PlayerBackend, RecordingAlerts};
pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{Command, Driver, Flow, HostSignal, ManualScheduler, Scheduler, TokioScheduler, Wake};
pub use error::{AlertError, ConfigError, CoreError, Result, ValidationError};
pub use events::Event;
pub use presentation::{fmt_clock, parse_clock, RecordingSurface, Surface, View};
pub use storage::{AlertsConfig, Config, DriverConfig};
pub use timer::{AfterBeep, Phase, PhaseEngine, TimerState};
