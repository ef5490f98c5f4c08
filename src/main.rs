#![no_std]
#![no_main]

use defmt::*;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::{config::Config, interrupt};
use panic_probe as _;

use nrf9160_ntn_firmware::config::AppConfig;
use nrf9160_ntn_firmware::handler;
use nrf9160_ntn_firmware::lifecycle::LifecycleCoordinator;
use nrf9160_ntn_firmware::link::{AtLinkController, EventDispatcher};
use nrf9160_ntn_firmware::modem::EventChannel;
use nrf9160_ntn_firmware::state::ConnectionTracker;
use nrf9160_ntn_firmware::status::StatusLoop;
use nrf9160_ntn_firmware::system::CancelToken;

mod platform;

use platform::{NrfAtTransport, NrfModem};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting NTN prototype");

    let mut nrf_config = Config::default();
    // Modem IPC runs at the highest priority, keep the timer below it
    nrf_config.time_interrupt_priority = interrupt::Priority::P2;
    let _peripherals = embassy_nrf::init(nrf_config);
    platform::enable_modem_interrupt();

    // Shared between the tasks below for the lifetime of the firmware
    static EVENTS: EventChannel = EventChannel::new();
    static DISPATCHER: EventDispatcher<'static> = EventDispatcher::new();
    static TRACKER: ConnectionTracker = ConnectionTracker::new();
    static CANCEL: CancelToken = CancelToken::new();

    unwrap!(spawner.spawn(event_handler_task(&EVENTS, &TRACKER, &CANCEL)));
    unwrap!(spawner.spawn(notification_task(&DISPATCHER)));

    let config = AppConfig::default();
    let link = AtLinkController::new(NrfAtTransport, &DISPATCHER, config.link);
    let mut coordinator = LifecycleCoordinator::new(NrfModem, link, config);

    if let Err(e) = coordinator.start(&EVENTS).await {
        error!("NTN startup failed: {:?}", e);
        defmt::panic!("Fatal startup error {}", e.code().code());
    }

    info!("Waiting for NTN network registration...");
    StatusLoop::new(&TRACKER, &CANCEL, config.status_interval)
        .run()
        .await;
}

#[embassy_executor::task]
async fn event_handler_task(
    events: &'static EventChannel,
    tracker: &'static ConnectionTracker,
    cancel: &'static CancelToken,
) {
    handler::run(events, tracker, cancel).await;
}

#[embassy_executor::task]
async fn notification_task(dispatcher: &'static EventDispatcher<'static>) {
    info!("Starting AT notification task");
    platform::forward_notifications(dispatcher).await;
}
