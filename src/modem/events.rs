//! Link Events
//!
//! Events the link controller reports while it registers with the network
//! and negotiates power-saving features.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::config::EVENT_QUEUE_DEPTH;

/// Bounded queue carrying link events from the controller to the handler
pub type EventChannel = Channel<CriticalSectionRawMutex, LinkEvent, EVENT_QUEUE_DEPTH>;

/// Network registration status (`<stat>` of `+CEREG`)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationStatus {
    NotRegistered = 0,
    RegisteredHome = 1,
    Searching = 2,
    RegistrationDenied = 3,
    Unknown = 4,
    RegisteredRoaming = 5,
    RegisteredEmergency = 8,
    UiccFail = 90,
}

impl RegistrationStatus {
    /// Map a raw status code. Codes outside 27.007 map to `Unknown`.
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::NotRegistered,
            1 => Self::RegisteredHome,
            2 => Self::Searching,
            3 => Self::RegistrationDenied,
            5 => Self::RegisteredRoaming,
            8 => Self::RegisteredEmergency,
            90 => Self::UiccFail,
            _ => Self::Unknown,
        }
    }

    /// Raw status code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Registered on a home or roaming network
    pub const fn is_registered(self) -> bool {
        matches!(self, Self::RegisteredHome | Self::RegisteredRoaming)
    }
}

/// Radio Resource Control mode (`+CSCON`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RrcMode {
    Idle,
    Connected,
}

/// Modem domain notifications (`%MDMEV`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemDomainEvent {
    /// Light search finished without finding a suitable cell
    LightSearchDone,
    /// Full search finished
    SearchDone,
    /// Modem detected a reset loop and restricted attach attempts
    ResetLoop,
    /// Modem temperature too high, radio disabled
    Overheated,
    /// No IMEI provisioned
    NoImei,
    /// Coverage enhancement level selected for random access (0-3)
    CeLevel(u8),
    /// Any other `%MDMEV` text
    Other,
}

/// Event delivered by the link controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Registration status changed
    RegistrationStatus(RegistrationStatus),
    /// Network granted PSM timers, in seconds. `-1` means deactivated.
    PsmUpdate { tau: i32, active_time: i32 },
    /// Network granted eDRX parameters, in seconds. `-1.0` means not in use.
    EdrxUpdate { edrx: f32, ptw: f32 },
    /// Modem domain notification
    ModemDomainEvent(ModemDomainEvent),
    /// RRC connection state changed
    RrcUpdate(RrcMode),
    /// Serving cell changed
    CellUpdate { tac: u32, id: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_code_round_trip() {
        for status in [
            RegistrationStatus::NotRegistered,
            RegistrationStatus::RegisteredHome,
            RegistrationStatus::Searching,
            RegistrationStatus::RegistrationDenied,
            RegistrationStatus::Unknown,
            RegistrationStatus::RegisteredRoaming,
            RegistrationStatus::RegisteredEmergency,
            RegistrationStatus::UiccFail,
        ] {
            assert_eq!(RegistrationStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn test_undefined_codes_are_unknown() {
        assert_eq!(RegistrationStatus::from_code(6), RegistrationStatus::Unknown);
        assert_eq!(RegistrationStatus::from_code(7), RegistrationStatus::Unknown);
        assert_eq!(RegistrationStatus::from_code(255), RegistrationStatus::Unknown);
    }

    #[test]
    fn test_only_home_and_roaming_are_registered() {
        assert!(RegistrationStatus::RegisteredHome.is_registered());
        assert!(RegistrationStatus::RegisteredRoaming.is_registered());
        assert!(!RegistrationStatus::RegisteredEmergency.is_registered());
        assert!(!RegistrationStatus::Searching.is_registered());
        assert!(!RegistrationStatus::NotRegistered.is_registered());
    }
}
