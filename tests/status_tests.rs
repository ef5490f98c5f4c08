//! Status loop tests
//!
//! Uses the std time driver, so the loop runs against wall-clock time with
//! short intervals.

use std::thread;
use std::time::Duration as StdDuration;

use embassy_futures::block_on;
use embassy_time::Duration;
use nrf9160_ntn_firmware::state::{ConnectionState, ConnectionTracker};
use nrf9160_ntn_firmware::status::{StatusLine, StatusLoop};
use nrf9160_ntn_firmware::system::CancelToken;

#[test]
fn test_tick_follows_tracker() {
    let tracker = ConnectionTracker::new();
    let cancel = CancelToken::new();
    let status = StatusLoop::new(&tracker, &cancel, Duration::from_secs(10));

    let lines = status.tick();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].message(), "NTN Status: CONNECTING...");

    tracker.set(ConnectionState::Connected);
    let lines = status.tick();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], StatusLine::ReadyToTransmit);
    assert_eq!(lines[1].message(), "NTN Status: CONNECTED");
}

#[test]
fn test_run_stops_before_first_report_when_cancelled() {
    let tracker = ConnectionTracker::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let status = StatusLoop::new(&tracker, &cancel, Duration::from_secs(10));
    assert_eq!(block_on(status.run()), 0);
}

#[test]
fn test_run_reports_until_cancelled() {
    let tracker = ConnectionTracker::new();
    let cancel = CancelToken::new();
    tracker.set(ConnectionState::Connected);

    let status = StatusLoop::new(&tracker, &cancel, Duration::from_millis(5));
    let ticks = thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(StdDuration::from_millis(100));
            cancel.cancel();
        });
        block_on(status.run())
    });

    assert!(ticks >= 1, "expected at least one report, got {}", ticks);
    assert!(cancel.is_cancelled());
}

#[test]
fn test_state_changes_between_reports() {
    let tracker = ConnectionTracker::new();
    let cancel = CancelToken::new();
    let status = StatusLoop::new(&tracker, &cancel, Duration::from_secs(10));

    let states = [
        ConnectionState::Disconnected,
        ConnectionState::Connected,
        ConnectionState::Disconnected,
    ];
    for state in states {
        tracker.set(state);
        let lines = status.tick();
        assert_eq!(lines.last(), Some(&StatusLine::Status(state)));
        assert_eq!(lines.contains(&StatusLine::ReadyToTransmit), state.is_connected());
    }
}
