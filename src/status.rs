//! Periodic Status Reporting
//!
//! Every status interval the loop reports the connection state and, while
//! connected, that the device is ready to send data. Payload transmission
//! itself is not implemented yet.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use heapless::Vec;

use crate::state::{ConnectionState, ConnectionTracker};
use crate::system::CancelToken;

/// One line of a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusLine {
    /// Connected and able to send data
    ReadyToTransmit,
    /// Current connection state
    Status(ConnectionState),
}

impl StatusLine {
    /// Log text of the line
    pub const fn message(&self) -> &'static str {
        match self {
            StatusLine::ReadyToTransmit => "NTN connected - ready to send data",
            StatusLine::Status(ConnectionState::Connected) => "NTN Status: CONNECTED",
            StatusLine::Status(ConnectionState::Disconnected) => "NTN Status: CONNECTING...",
        }
    }
}

/// Lines emitted by one status cycle, in order
pub type StatusReport = Vec<StatusLine, 2>;

/// Build the report for `state`
pub fn report(state: ConnectionState) -> StatusReport {
    let mut lines = StatusReport::new();
    if state.is_connected() {
        let _ = lines.push(StatusLine::ReadyToTransmit);
    }
    let _ = lines.push(StatusLine::Status(state));
    lines
}

/// Status loop reading the shared connection tracker
pub struct StatusLoop<'a> {
    tracker: &'a ConnectionTracker,
    cancel: &'a CancelToken,
    interval: Duration,
}

impl<'a> StatusLoop<'a> {
    pub fn new(tracker: &'a ConnectionTracker, cancel: &'a CancelToken, interval: Duration) -> Self {
        Self {
            tracker,
            cancel,
            interval,
        }
    }

    /// Report the current state once
    pub fn tick(&self) -> StatusReport {
        let lines = report(self.tracker.state());
        for line in lines.iter() {
            info!("{}", line.message());
        }
        lines
    }

    /// Report every interval until cancelled. Returns the number of reports.
    pub async fn run(&self) -> u32 {
        let mut ticks: u32 = 0;
        loop {
            match select(Timer::after(self.interval), self.cancel.cancelled()).await {
                Either::First(()) => {
                    self.tick();
                    ticks = ticks.wrapping_add(1);
                }
                Either::Second(()) => {
                    debug!("Status loop stopped after {} reports", ticks);
                    return ticks;
                }
            }
        }
    }
}
