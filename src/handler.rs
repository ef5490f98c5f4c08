//! Link Event Handler
//!
//! Consumes link events from the [`EventChannel`] and keeps the
//! [`ConnectionTracker`] in sync with the registration status. Every other
//! event is only logged.

use embassy_futures::select::{select, Either};

use crate::modem::{EventChannel, LinkEvent};
use crate::state::{ConnectionState, ConnectionTracker};
use crate::system::CancelToken;

/// Apply a single link event. Never fails; unknown events are ignored.
pub fn handle_event(tracker: &ConnectionTracker, event: &LinkEvent) {
    match *event {
        LinkEvent::RegistrationStatus(status) => {
            info!("Network registration status: {}", status.code());

            let state = ConnectionState::from_registration(status);
            let previous = tracker.set(state);
            if state != previous {
                match state {
                    ConnectionState::Connected => info!("NTN network connected"),
                    ConnectionState::Disconnected => info!("NTN network disconnected"),
                }
            }
        }
        LinkEvent::PsmUpdate { tau, active_time } => {
            info!("PSM parameter update: TAU: {}, Active time: {}", tau, active_time);
        }
        LinkEvent::EdrxUpdate { edrx, ptw } => {
            info!("eDRX parameter update: eDRX: {}, PTW: {}", edrx, ptw);
        }
        LinkEvent::ModemDomainEvent(modem_event) => {
            info!("Modem domain event: {:?}", modem_event);
        }
        _ => {}
    }
}

/// Event handler loop. Returns once `cancel` fires.
pub async fn run(channel: &EventChannel, tracker: &ConnectionTracker, cancel: &CancelToken) {
    debug!("Event handler started");

    loop {
        match select(cancel.cancelled(), channel.receive()).await {
            Either::First(()) => {
                debug!("Event handler stopped");
                return;
            }
            Either::Second(event) => handle_event(tracker, &event),
        }
    }
}
