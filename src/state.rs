//! Connection State Tracking
//!
//! The tracker is written only by the link event handler and read by the
//! status loop, possibly from a different task or interrupt context. A single
//! atomic flag is enough: there is exactly one writer.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::modem::RegistrationStatus;

/// Network connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    /// Connected on home or roaming registration, disconnected otherwise
    pub const fn from_registration(status: RegistrationStatus) -> Self {
        if status.is_registered() {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    /// True for [`ConnectionState::Connected`]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Connection state cell shared by the event handler and the status loop
pub struct ConnectionTracker {
    connected: AtomicBool,
}

impl ConnectionTracker {
    /// New tracker, initially disconnected
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        if self.connected.load(Ordering::Acquire) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Store a new state and return the previous one
    pub fn set(&self, state: ConnectionState) -> ConnectionState {
        let was_connected = self.connected.swap(state.is_connected(), Ordering::AcqRel);
        if was_connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Shorthand for `state().is_connected()`
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}
