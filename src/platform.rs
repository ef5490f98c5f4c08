//! nRF9160 Modem Bindings
//!
//! Connects the library's modem interfaces to the `nrf-modem` IPC driver.

use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use futures::StreamExt;
use nrf_modem::at_notifications::AtNotificationStream;
use nrf_modem::{ConnectionPreference, SystemMode};

use nrf9160_ntn_firmware::link::{AtTransport, EventDispatcher};
use nrf9160_ntn_firmware::modem::{AtResponse, ErrorCode, ModemLibrary, MAX_AT_RESPONSE_LEN};

/// Longest URC line kept by the notification stream
const MAX_NOTIFICATION_LEN: usize = 128;
/// Notifications buffered before the stream drops new ones
const NOTIFICATION_QUEUE: usize = 4;

#[interrupt]
fn IPC() {
    nrf_modem::ipc_irq_handler();
}

/// Unmask the modem IPC interrupt at the highest priority
pub fn enable_modem_interrupt() {
    interrupt::IPC.set_priority(Priority::P0);
    unsafe { interrupt::IPC.enable() };
}

fn map_error(error: nrf_modem::Error) -> ErrorCode {
    match error {
        nrf_modem::Error::NrfError(code) => ErrorCode(code as i32),
        _ => ErrorCode::FAULT,
    }
}

/// Modem library backed by `nrf-modem`
pub struct NrfModem;

impl ModemLibrary for NrfModem {
    async fn init(&mut self) -> Result<(), ErrorCode> {
        // Everything the SiP supports; the link controller narrows it down
        let mode = SystemMode {
            lte_support: true,
            lte_psm_support: true,
            nbiot_support: true,
            gnss_support: true,
            preference: ConnectionPreference::None,
        };
        nrf_modem::init(mode).await.map_err(map_error)
    }

    async fn send_at_command(&mut self, command: &str) -> Result<AtResponse, ErrorCode> {
        let response = nrf_modem::send_at::<MAX_AT_RESPONSE_LEN>(command)
            .await
            .map_err(map_error)?;
        AtResponse::try_from(response.trim()).map_err(|_| ErrorCode::NO_MEMORY)
    }
}

/// AT transport for the link controller
pub struct NrfAtTransport;

impl AtTransport for NrfAtTransport {
    async fn send(&mut self, command: &str) -> Result<(), ErrorCode> {
        nrf_modem::send_at::<64>(command)
            .await
            .map(|_| ())
            .map_err(map_error)
    }
}

/// Feed every AT notification into the link event dispatcher
pub async fn forward_notifications(dispatcher: &'static EventDispatcher<'static>) {
    let mut stream = AtNotificationStream::<MAX_NOTIFICATION_LEN, NOTIFICATION_QUEUE>::new().await;
    while let Some(line) = stream.next().await {
        dispatcher.handle_notification(line.as_str()).await;
    }
    defmt::warn!("AT notification stream closed");
}
