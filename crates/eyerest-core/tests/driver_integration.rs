//! Integration tests for the driver loop under a scripted scheduler.

use eyerest_core::{
    AfterBeep, Coalesced, Command, Driver, ManualClock, ManualScheduler, Phase, RecordingAlerts,
    RecordingSurface, Wake,
};

const T0: i64 = 1_700_000_000_000;

fn driver(clock: &ManualClock) -> Driver<ManualClock, RecordingAlerts, RecordingSurface> {
    Driver::new(clock.clone(), RecordingAlerts::default(), RecordingSurface::default())
}

#[tokio::test]
async fn test_initial_render_shows_ready() {
    let clock = ManualClock::new(T0);
    let mut sched = ManualScheduler::new(clock.clone());
    let mut d = driver(&clock);
    d.run(&mut sched).await;

    let first = &d.surface().frames[0];
    assert_eq!(first.label, "Ready");
    assert_eq!(first.clock, "20:00");
}

#[tokio::test]
async fn test_frames_count_down() {
    let clock = ManualClock::new(T0);
    let mut sched = ManualScheduler::new(clock.clone())
        .after(0, Wake::Command(Command::Start))
        .after(500, Wake::Frame)
        .after(500, Wake::Frame)
        .after(1_000, Wake::Poll);
    let mut d = driver(&clock);
    d.run(&mut sched).await;

    let clocks: Vec<&str> = d.surface().frames.iter().map(|v| v.clock.as_str()).collect();
    // Ready, start, 0.5 s, 1 s, 2 s, then the shutdown leaves the last frame as is.
    assert_eq!(clocks, vec!["20:00", "20:00", "20:00", "19:59", "19:58"]);
}

#[test]
fn test_focus_regain_catches_up_immediately() {
    let clock = ManualClock::new(T0);
    let mut sched = ManualScheduler::new(clock.clone());
    let mut d = driver(&clock);

    d.handle(Wake::Command(Command::Start), &mut sched);
    clock.advance(1_200_000 + 3_000 + 20_000 + 1_500);
    d.handle(Wake::FocusRegained, &mut sched);

    assert_eq!(d.engine().phase(), Phase::Beep);
    assert_eq!(d.engine().state().next_after_beep(), AfterBeep::Work);
    assert_eq!(d.engine().state().seconds_left(), 2);
    assert_eq!(d.surface().last().unwrap().clock, "00:02");
    assert_eq!(d.alerts().emitted, vec![3, 3]);
}

#[tokio::test]
async fn test_ticks_after_stop_are_cancelled() {
    let clock = ManualClock::new(T0);
    let mut sched = ManualScheduler::new(clock.clone())
        .after(0, Wake::Command(Command::Start))
        .after(1_000, Wake::Command(Command::Stop))
        .after(2_000_000, Wake::Frame)
        .after(0, Wake::Poll)
        .after(0, Wake::KeepAlive);
    let mut d = driver(&clock);
    let frames_before_ticks = 3; // initial, start, stop
    d.run(&mut sched).await;

    assert_eq!(d.surface().frames.len(), frames_before_ticks);
    assert_eq!(d.engine().phase(), Phase::Ready);
    assert_eq!(d.alerts().keep_alives, 0);
    assert!(d.alerts().emitted.is_empty());
}

#[test]
fn test_double_stop_matches_single_stop() {
    let clock = ManualClock::new(T0);
    let mut once = driver(&clock);
    let mut twice = driver(&clock);
    let mut sched = ManualScheduler::new(clock.clone());

    once.handle(Wake::Command(Command::Start), &mut sched);
    once.handle(Wake::Command(Command::Stop), &mut sched);
    twice.handle(Wake::Command(Command::Start), &mut sched);
    twice.handle(Wake::Command(Command::Stop), &mut sched);
    twice.handle(Wake::Command(Command::Stop), &mut sched);

    assert_eq!(once.engine().state(), twice.engine().state());
    assert_eq!(twice.engine().state().seconds_left(), 1200);
    assert_eq!(twice.engine().state().phase_end_at_ms(), None);
}

#[test]
fn test_test_alert_during_cycle_preserves_state() {
    let clock = ManualClock::new(T0);
    let mut sched = ManualScheduler::new(clock.clone());
    let mut d = driver(&clock);
    d.handle(Wake::Command(Command::Start), &mut sched);
    clock.advance(30_000);
    d.handle(Wake::Frame, &mut sched);
    let before = d.engine().state().clone();

    d.handle(Wake::Command(Command::TestAlert), &mut sched);
    assert_eq!(d.engine().state(), &before);
    assert_eq!(d.alerts().emitted, vec![1]);
}

#[test]
fn test_long_suspension_sounds_only_the_live_beep() {
    let clock = ManualClock::new(T0);
    let mut sched = ManualScheduler::new(clock.clone());
    let mut d = Driver::new(
        clock.clone(),
        Coalesced::new(RecordingAlerts::default()),
        RecordingSurface::default(),
    );

    d.handle(Wake::Command(Command::Start), &mut sched);
    // Ten full cycles, then 1.5 s into the Work -> Rest beep.
    clock.advance(10 * 1_226_000 + 1_200_000 + 1_500);
    d.handle(Wake::FocusRegained, &mut sched);

    assert_eq!(d.engine().phase(), Phase::Beep);
    assert_eq!(d.engine().state().next_after_beep(), AfterBeep::Rest);
    assert_eq!(d.alerts().inner().emitted, vec![3]);
    assert!(d.alerts().inner().active);
}

#[test]
fn test_long_suspension_ending_in_work_stays_silent() {
    let clock = ManualClock::new(T0);
    let mut sched = ManualScheduler::new(clock.clone());
    let mut d = Driver::new(
        clock.clone(),
        Coalesced::new(RecordingAlerts::default()),
        RecordingSurface::default(),
    );

    d.handle(Wake::Command(Command::Start), &mut sched);
    clock.advance(5 * 1_226_000 + 60_000);
    d.handle(Wake::FocusRegained, &mut sched);

    assert_eq!(d.engine().phase(), Phase::Work);
    assert!(d.alerts().inner().emitted.is_empty());
    assert!(!d.alerts().inner().active);
}
