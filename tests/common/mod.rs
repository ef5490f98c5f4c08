//! Common test utilities for the host tests
//!
//! Scripted stand-ins for the modem library and link controller. Both record
//! every call into a shared [`CallLog`] so tests can assert on ordering.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use nrf9160_ntn_firmware::link::AtTransport;
use nrf9160_ntn_firmware::modem::{
    AtResponse, ErrorCode, EventChannel, LinkController, ModePreference, ModemLibrary, SystemMode,
};

/// A single collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init,
    SendAt(String),
    SetSystemMode(SystemMode, ModePreference),
    RequestPsm(bool),
    RequestEdrx(bool),
    RegisterHandler,
    ConnectAsync,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Which calls should fail, and with what
#[derive(Debug, Clone, Copy, Default)]
pub struct Failures {
    pub init: Option<ErrorCode>,
    pub uuid: Option<ErrorCode>,
    pub system_mode: Option<ErrorCode>,
    pub psm: Option<ErrorCode>,
    pub edrx: Option<ErrorCode>,
    pub connect: Option<ErrorCode>,
}

fn outcome(failure: Option<ErrorCode>) -> Result<(), ErrorCode> {
    match failure {
        Some(code) => Err(code),
        None => Ok(()),
    }
}

pub struct MockModem {
    log: CallLog,
    failures: Failures,
}

impl ModemLibrary for MockModem {
    async fn init(&mut self) -> Result<(), ErrorCode> {
        self.log.borrow_mut().push(Call::Init);
        outcome(self.failures.init)
    }

    async fn send_at_command(&mut self, command: &str) -> Result<AtResponse, ErrorCode> {
        self.log.borrow_mut().push(Call::SendAt(command.to_string()));
        outcome(self.failures.uuid)?;
        AtResponse::try_from("%XMODEMUUID: 25c95751-efa4-40d4-8b4a-1dcaab81fac9")
            .map_err(|_| ErrorCode::NO_MEMORY)
    }
}

pub struct MockLink {
    log: CallLog,
    failures: Failures,
    /// Distinct channels registered so far
    pub handlers: Vec<usize>,
}

impl<'ch> LinkController<'ch> for MockLink {
    async fn set_system_mode(
        &mut self,
        mode: SystemMode,
        preference: ModePreference,
    ) -> Result<(), ErrorCode> {
        self.log
            .borrow_mut()
            .push(Call::SetSystemMode(mode, preference));
        outcome(self.failures.system_mode)
    }

    async fn request_power_saving_mode(&mut self, enable: bool) -> Result<(), ErrorCode> {
        self.log.borrow_mut().push(Call::RequestPsm(enable));
        outcome(self.failures.psm)
    }

    async fn request_extended_drx(&mut self, enable: bool) -> Result<(), ErrorCode> {
        self.log.borrow_mut().push(Call::RequestEdrx(enable));
        outcome(self.failures.edrx)
    }

    fn register_event_handler(&mut self, handler: &'ch EventChannel) {
        self.log.borrow_mut().push(Call::RegisterHandler);
        let address = handler as *const EventChannel as usize;
        if !self.handlers.contains(&address) {
            self.handlers.push(address);
        }
    }

    async fn connect_async(&mut self, _handler: &'ch EventChannel) -> Result<(), ErrorCode> {
        self.log.borrow_mut().push(Call::ConnectAsync);
        outcome(self.failures.connect)
    }
}

/// Build a modem and link sharing one call log
pub fn mocks(failures: Failures) -> (MockModem, MockLink, CallLog) {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let modem = MockModem {
        log: log.clone(),
        failures,
    };
    let link = MockLink {
        log: log.clone(),
        failures,
        handlers: Vec::new(),
    };
    (modem, link, log)
}

/// AT transport that accepts everything and remembers what it was sent
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<String>,
}

impl AtTransport for RecordingTransport {
    async fn send(&mut self, command: &str) -> Result<(), ErrorCode> {
        self.sent.push(command.to_string());
        Ok(())
    }
}
