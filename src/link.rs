//! AT-backed Link Controller
//!
//! Implements [`LinkController`] on top of a raw AT command transport, the
//! same way the vendor link-control library drives the modem:
//! - configuration is a sequence of `%XSYSTEMMODE` / `+CPSMS` / `+CEDRXS` writes
//! - connecting subscribes to registration URCs and switches to `+CFUN=1`
//! - URCs are parsed by the [`EventDispatcher`] and forwarded to every
//!   registered event channel
//!
//! The dispatcher is shared with the task that reads notifications from the
//! modem, so it lives outside the controller.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::TrySendError;
use heapless::Vec;

use crate::at::command::{self, CommandError};
use crate::at::notification;
use crate::config::LinkConfig;
use crate::modem::{ErrorCode, EventChannel, LinkController, LinkEvent, ModePreference, SystemMode};

/// Maximum number of event channels subscribed at the same time
pub const MAX_EVENT_HANDLERS: usize = 2;

/// Raw AT command channel to the modem
pub trait AtTransport {
    /// Send a command and wait for its final result code
    async fn send(&mut self, command: &str) -> Result<(), ErrorCode>;
}

impl From<CommandError> for ErrorCode {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Overflow => ErrorCode::NO_MEMORY,
            CommandError::InvalidBitString | CommandError::EmptySystemMode => ErrorCode::INVALID,
        }
    }
}

/// Fans link events out to subscribed channels
pub struct EventDispatcher<'ch> {
    handlers: Mutex<CriticalSectionRawMutex, RefCell<Vec<&'ch EventChannel, MAX_EVENT_HANDLERS>>>,
}

impl<'ch> EventDispatcher<'ch> {
    pub const fn new() -> Self {
        Self {
            handlers: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Subscribe a channel. Returns `false` if it was already subscribed or
    /// no slot is left.
    pub fn register(&self, channel: &'ch EventChannel) -> bool {
        self.handlers.lock(|handlers| {
            let mut handlers = handlers.borrow_mut();
            if handlers.iter().any(|h| core::ptr::eq(*h, channel)) {
                return false;
            }
            if handlers.push(channel).is_err() {
                warn!("LINK: No free event handler slot");
                return false;
            }
            true
        })
    }

    /// Number of subscribed channels
    pub fn handler_count(&self) -> usize {
        self.handlers.lock(|handlers| handlers.borrow().len())
    }

    /// Deliver an event to every subscribed channel, waiting while a channel
    /// is full. Returns how many channels received it.
    pub async fn dispatch(&self, event: LinkEvent) -> usize {
        let handlers = self.handlers.lock(|handlers| handlers.borrow().clone());
        for handler in handlers.iter() {
            if let Err(TrySendError::Full(event)) = handler.try_send(event) {
                debug!("LINK: Event queue full, waiting for the handler");
                handler.send(event).await;
            }
        }
        handlers.len()
    }

    /// Parse a notification line from the modem and dispatch the resulting
    /// events. Lines that are not link notifications are ignored.
    pub async fn handle_notification(&self, line: &str) -> usize {
        match notification::parse(line) {
            Ok(events) => {
                let mut delivered = 0;
                for event in events {
                    delivered += self.dispatch(event).await;
                }
                delivered
            }
            Err(e) => {
                debug!("LINK: Ignoring notification: {:?}", e);
                0
            }
        }
    }
}

impl Default for EventDispatcher<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Link controller issuing AT commands over `T`
pub struct AtLinkController<'d, 'ch, T> {
    transport: T,
    dispatcher: &'d EventDispatcher<'ch>,
    config: LinkConfig,
}

impl<'d, 'ch, T: AtTransport> AtLinkController<'d, 'ch, T> {
    pub fn new(transport: T, dispatcher: &'d EventDispatcher<'ch>, config: LinkConfig) -> Self {
        Self {
            transport,
            dispatcher,
            config,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Best-effort subscription; failures only cost the matching events
    async fn subscribe(&mut self, command: &str) {
        if let Err(e) = self.transport.send(command).await {
            warn!("LINK: Failed to enable notifications ({}), error: {}", command, e.code());
        }
    }
}

impl<'ch, T: AtTransport> LinkController<'ch> for AtLinkController<'_, 'ch, T> {
    async fn set_system_mode(
        &mut self,
        mode: SystemMode,
        preference: ModePreference,
    ) -> Result<(), ErrorCode> {
        let cmd = command::system_mode(mode, preference)?;
        debug!("LINK: {}", cmd.as_str());
        self.transport.send(&cmd).await
    }

    async fn request_power_saving_mode(&mut self, enable: bool) -> Result<(), ErrorCode> {
        let cmd = command::psm_request(enable, &self.config.psm)?;
        debug!("LINK: {}", cmd.as_str());
        self.transport.send(&cmd).await
    }

    async fn request_extended_drx(&mut self, enable: bool) -> Result<(), ErrorCode> {
        let cmd = command::edrx_request(enable, self.config.edrx_act, self.config.edrx_value)?;
        debug!("LINK: {}", cmd.as_str());
        self.transport.send(&cmd).await
    }

    fn register_event_handler(&mut self, handler: &'ch EventChannel) {
        if self.dispatcher.register(handler) {
            debug!("LINK: Event handler registered");
        }
    }

    async fn connect_async(&mut self, handler: &'ch EventChannel) -> Result<(), ErrorCode> {
        self.register_event_handler(handler);

        self.subscribe(command::CEREG_SUBSCRIBE).await;
        self.subscribe(command::MDMEV_SUBSCRIBE).await;
        self.subscribe(command::CSCON_SUBSCRIBE).await;

        self.transport.send(command::FUNC_MODE_NORMAL).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::at::AccessTechnology;
    use crate::config::PsmTimers;
    use crate::modem::RegistrationStatus;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use std::string::{String, ToString};
    use std::vec::Vec as StdVec;

    /// Records every command; fails the ones listed in `fail_on`
    #[derive(Default)]
    struct RecordingTransport {
        sent: StdVec<String>,
        fail_on: StdVec<&'static str>,
    }

    impl AtTransport for RecordingTransport {
        async fn send(&mut self, command: &str) -> Result<(), ErrorCode> {
            self.sent.push(command.to_string());
            if self.fail_on.iter().any(|c| *c == command) {
                Err(ErrorCode::IO)
            } else {
                Ok(())
            }
        }
    }

    fn link_config() -> LinkConfig {
        LinkConfig {
            psm: PsmTimers {
                periodic_tau: "00000110",
                active_time: "00100001",
            },
            edrx_act: AccessTechnology::NbIot,
            edrx_value: "1001",
        }
    }

    #[test]
    fn test_configuration_commands() {
        let dispatcher = EventDispatcher::new();
        let mut link = AtLinkController::new(RecordingTransport::default(), &dispatcher, link_config());

        block_on(async {
            link.set_system_mode(SystemMode::NTN_NBIOT_GNSS, ModePreference::Auto)
                .await
                .unwrap();
            link.request_power_saving_mode(true).await.unwrap();
            link.request_extended_drx(true).await.unwrap();
            link.request_extended_drx(false).await.unwrap();
        });

        assert_eq!(
            link.transport().sent,
            [
                "AT%XSYSTEMMODE=0,0,1,0,1",
                "AT+CPSMS=1,,,\"00000110\",\"00100001\"",
                "AT+CEDRXS=2,5,\"1001\"",
                "AT+CEDRXS=3",
            ]
        );
    }

    #[test]
    fn test_invalid_config_never_reaches_modem() {
        let dispatcher = EventDispatcher::new();
        let mut config = link_config();
        config.edrx_value = "12";
        let mut link = AtLinkController::new(RecordingTransport::default(), &dispatcher, config);

        let result = block_on(link.request_extended_drx(true));
        assert_eq!(result, Err(ErrorCode::INVALID));
        assert!(link.transport().sent.is_empty());
    }

    #[test]
    fn test_connect_sequence() {
        let channel = EventChannel::new();
        let dispatcher = EventDispatcher::new();
        let mut link = AtLinkController::new(RecordingTransport::default(), &dispatcher, link_config());

        block_on(link.connect_async(&channel)).unwrap();

        assert_eq!(
            link.transport().sent,
            ["AT+CEREG=5", "AT%MDMEV=1", "AT+CSCON=1", "AT+CFUN=1"]
        );
        assert_eq!(dispatcher.handler_count(), 1);
    }

    #[test]
    fn test_connect_survives_subscription_failures() {
        let channel = EventChannel::new();
        let dispatcher = EventDispatcher::new();
        let transport = RecordingTransport {
            fail_on: std::vec!["AT%MDMEV=1", "AT+CSCON=1"],
            ..Default::default()
        };
        let mut link = AtLinkController::new(transport, &dispatcher, link_config());

        assert!(block_on(link.connect_async(&channel)).is_ok());
        assert_eq!(link.transport().sent.len(), 4);
    }

    #[test]
    fn test_connect_fails_when_cfun_rejected() {
        let channel = EventChannel::new();
        let dispatcher = EventDispatcher::new();
        let transport = RecordingTransport {
            fail_on: std::vec!["AT+CFUN=1"],
            ..Default::default()
        };
        let mut link = AtLinkController::new(transport, &dispatcher, link_config());

        assert_eq!(block_on(link.connect_async(&channel)), Err(ErrorCode::IO));
    }

    #[test]
    fn test_register_is_idempotent() {
        let first = EventChannel::new();
        let second = EventChannel::new();
        let third = EventChannel::new();
        let dispatcher = EventDispatcher::new();

        assert!(dispatcher.register(&first));
        assert!(!dispatcher.register(&first));
        assert!(dispatcher.register(&second));
        assert_eq!(dispatcher.handler_count(), 2);

        // No slot left
        assert!(!dispatcher.register(&third));
        assert_eq!(dispatcher.handler_count(), 2);
    }

    #[test]
    fn test_notifications_reach_every_handler() {
        let first = EventChannel::new();
        let second = EventChannel::new();
        let dispatcher = EventDispatcher::new();
        dispatcher.register(&first);
        dispatcher.register(&second);

        assert_eq!(block_on(dispatcher.handle_notification("+CEREG: 5")), 2);
        assert_eq!(block_on(dispatcher.handle_notification("OK")), 0);
        assert_eq!(block_on(dispatcher.handle_notification("+CEREG: banana")), 0);

        let expected = LinkEvent::RegistrationStatus(RegistrationStatus::RegisteredRoaming);
        assert_eq!(first.try_receive().ok(), Some(expected));
        assert_eq!(second.try_receive().ok(), Some(expected));
        assert!(first.try_receive().is_err());
    }

    #[test]
    fn test_full_queue_holds_back_the_sender() {
        let channel = EventChannel::new();
        let dispatcher = EventDispatcher::new();
        dispatcher.register(&channel);

        for _ in 0..crate::config::EVENT_QUEUE_DEPTH {
            assert_eq!(block_on(dispatcher.handle_notification("+CSCON: 1")), 1);
        }
        assert_eq!(channel.len(), crate::config::EVENT_QUEUE_DEPTH);

        let (delivered, drained) = block_on(join(
            dispatcher.handle_notification("+CEREG: 1"),
            async {
                let mut drained = StdVec::new();
                for _ in 0..=crate::config::EVENT_QUEUE_DEPTH {
                    drained.push(channel.receive().await);
                }
                drained
            },
        ));

        assert_eq!(delivered, 1);
        assert_eq!(
            drained.last(),
            Some(&LinkEvent::RegistrationStatus(RegistrationStatus::RegisteredHome))
        );
        assert!(channel.is_empty());
    }
}
