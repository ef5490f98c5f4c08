//! Firmware Configuration
//!
//! Compile-time defaults for the NTN prototype. Timer and eDRX values use the
//! 3GPP bit-string encodings the modem expects in its AT commands.

use embassy_time::Duration;

use crate::at::AccessTechnology;
use crate::modem::{ModePreference, SystemMode};

/// Seconds between two status reports
pub const STATUS_INTERVAL_SECS: u64 = 10;

/// Depth of the link event queue
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Requested PSM timers (GPRS Timer 3 / GPRS Timer 2 bit strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsmTimers {
    /// Requested periodic TAU (T3412 extended), 8 bits
    pub periodic_tau: &'static str,
    /// Requested active time (T3324), 8 bits
    pub active_time: &'static str,
}

impl Default for PsmTimers {
    fn default() -> Self {
        Self {
            periodic_tau: "00000011", // 30 min (3 * 10 min)
            active_time: "00100001",  // 1 min
        }
    }
}

/// Parameters used by the AT-backed link controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    pub psm: PsmTimers,
    /// Access technology the eDRX request applies to
    pub edrx_act: AccessTechnology,
    /// Requested eDRX cycle, 4 bits
    pub edrx_value: &'static str,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            psm: PsmTimers::default(),
            edrx_act: AccessTechnology::NbIot,
            edrx_value: "1001", // 163.84 s
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    pub system_mode: SystemMode,
    pub mode_preference: ModePreference,
    pub psm_enabled: bool,
    pub edrx_enabled: bool,
    pub status_interval: Duration,
    pub link: LinkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            system_mode: SystemMode::NTN_NBIOT_GNSS,
            mode_preference: ModePreference::Auto,
            psm_enabled: true,
            edrx_enabled: true,
            status_interval: Duration::from_secs(STATUS_INTERVAL_SECS),
            link: LinkConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_satellite() {
        let config = AppConfig::default();
        assert!(config.system_mode.ntn_nb_iot);
        assert_eq!(config.mode_preference, ModePreference::Auto);
        assert_eq!(config.status_interval, Duration::from_secs(10));
        assert!(config.psm_enabled);
        assert!(config.edrx_enabled);
    }

    #[test]
    fn test_default_timer_strings_are_well_formed() {
        let link = LinkConfig::default();
        assert_eq!(link.psm.periodic_tau.len(), 8);
        assert_eq!(link.psm.active_time.len(), 8);
        assert_eq!(link.edrx_value.len(), 4);
    }
}
