//! Publish/subscribe bus demo
//!
//! Minimal firmware showing an embassy pub/sub channel: one publisher, one
//! subscriber, a counter published every second.

#![no_std]
#![no_main]

use defmt::*;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::PubSubChannel;
use embassy_time::{Duration, Timer};
use panic_probe as _;

/// Capacity 4, one subscriber, one publisher
static DEMO_BUS: PubSubChannel<CriticalSectionRawMutex, u32, 4, 1, 1> = PubSubChannel::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let _peripherals = embassy_nrf::init(Default::default());
    info!("Bus demo started");

    let publisher = unwrap!(DEMO_BUS.publisher());
    let mut subscriber = unwrap!(DEMO_BUS.subscriber());

    let mut counter: u32 = 0;
    loop {
        publisher.publish_immediate(counter);
        let received = subscriber.next_message_pure().await;
        info!("Bus message: {}", received);

        counter = counter.wrapping_add(1);
        Timer::after(Duration::from_secs(1)).await;
    }
}
