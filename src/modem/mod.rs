//! Modem Collaborator Interfaces
//!
//! The firmware never talks to modem hardware directly. Everything goes
//! through two narrow interfaces:
//! - [`ModemLibrary`]: modem firmware bring-up and raw AT passthrough
//! - [`LinkController`]: system mode, power-saving negotiation, connect and
//!   event subscription
//!
//! Link events are delivered over an [`EventChannel`] rather than a callback,
//! so the consumer side can be driven with synthetic events.

pub mod events;

pub use events::{EventChannel, LinkEvent, ModemDomainEvent, RegistrationStatus, RrcMode};

/// Maximum length of a buffered AT response
pub const MAX_AT_RESPONSE_LEN: usize = 128;

/// Raw response text of an AT command
pub type AtResponse = heapless::String<MAX_AT_RESPONSE_LEN>;

/// Negative errno-style error code reported by the modem collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    /// I/O error, the modem answered `ERROR`
    pub const IO: Self = Self(-5);
    /// Response or command did not fit its buffer
    pub const NO_MEMORY: Self = Self(-12);
    /// Generic fault
    pub const FAULT: Self = Self(-14);
    /// Invalid argument
    pub const INVALID: Self = Self(-22);

    /// Raw numeric value
    pub const fn code(self) -> i32 {
        self.0
    }
}

/// Radio access technologies enabled on the modem (`%XSYSTEMMODE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemMode {
    pub lte_m: bool,
    pub nb_iot: bool,
    pub gnss: bool,
    pub ntn_nb_iot: bool,
}

impl SystemMode {
    /// Satellite NB-IoT with GNSS for position reporting
    pub const NTN_NBIOT_GNSS: Self = Self {
        lte_m: false,
        nb_iot: false,
        gnss: true,
        ntn_nb_iot: true,
    };

    /// Terrestrial LTE-M with GNSS
    pub const LTEM_GNSS: Self = Self {
        lte_m: true,
        nb_iot: false,
        gnss: true,
        ntn_nb_iot: false,
    };

    /// True if at least one cellular technology is enabled
    pub const fn has_cellular(&self) -> bool {
        self.lte_m || self.nb_iot || self.ntn_nb_iot
    }
}

/// Preferred access technology when several are enabled
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModePreference {
    /// Let the modem pick
    #[default]
    Auto = 0,
    LteM = 1,
    NbIot = 2,
    PlmnLteM = 3,
    PlmnNbIot = 4,
}

impl ModePreference {
    /// Value of the preference field in `%XSYSTEMMODE`
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Modem firmware initialization and AT passthrough
pub trait ModemLibrary {
    /// Bring up the modem library. Nothing else works until this succeeds.
    async fn init(&mut self) -> Result<(), ErrorCode>;

    /// Send a raw AT command and return its response text
    async fn send_at_command(&mut self, command: &str) -> Result<AtResponse, ErrorCode>;
}

/// Cellular registration, mode configuration and power-feature negotiation
///
/// `'ch` is the lifetime of the event channels handed to the controller.
pub trait LinkController<'ch> {
    /// Select the enabled access technologies and their preference
    async fn set_system_mode(
        &mut self,
        mode: SystemMode,
        preference: ModePreference,
    ) -> Result<(), ErrorCode>;

    /// Request (or release) Power Saving Mode from the network
    async fn request_power_saving_mode(&mut self, enable: bool) -> Result<(), ErrorCode>;

    /// Request (or release) extended DRX from the network
    async fn request_extended_drx(&mut self, enable: bool) -> Result<(), ErrorCode>;

    /// Subscribe a channel to link events. Registering the same channel twice
    /// has no effect.
    fn register_event_handler(&mut self, handler: &'ch EventChannel);

    /// Start network registration without waiting for it to complete.
    ///
    /// Progress is reported on `handler` as [`LinkEvent`]s. An `Err` means the
    /// request could not be issued at all.
    async fn connect_async(&mut self, handler: &'ch EventChannel) -> Result<(), ErrorCode>;
}
