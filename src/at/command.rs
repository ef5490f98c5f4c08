//! AT Command Builders
//!
//! Commands used during modem bring-up and network registration:
//! - `%XSYSTEMMODE`: enabled access technologies
//! - `+CPSMS` / `+CEDRXS`: power-saving requests
//! - `+CEREG`, `%MDMEV`, `+CSCON`: event subscriptions
//! - `+CFUN`: functional mode

use core::fmt::Write;

use heapless::String;

use super::AccessTechnology;
use crate::config::PsmTimers;
use crate::modem::{ModePreference, SystemMode};

/// Maximum length of a formatted AT command
pub const MAX_COMMAND_LEN: usize = 64;

/// Formatted AT command
pub type AtCommand = String<MAX_COMMAND_LEN>;

/// Read the modem UUID (diagnostic)
pub const MODEM_UUID: &str = "AT%XMODEMUUID";
/// Registration URCs including PSM timers
pub const CEREG_SUBSCRIBE: &str = "AT+CEREG=5";
/// Modem domain event URCs
pub const MDMEV_SUBSCRIBE: &str = "AT%MDMEV=1";
/// RRC connection state URCs
pub const CSCON_SUBSCRIBE: &str = "AT+CSCON=1";
/// Normal functional mode, starts network attach
pub const FUNC_MODE_NORMAL: &str = "AT+CFUN=1";
/// Release any PSM request
pub const PSM_DISABLE: &str = "AT+CPSMS=0";
/// Disable eDRX and reset the requested values
pub const EDRX_DISABLE: &str = "AT+CEDRXS=3";

/// Command construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Command does not fit in [`MAX_COMMAND_LEN`]
    Overflow,
    /// Timer or eDRX value is not a bit string of the required width
    InvalidBitString,
    /// System mode enables no access technology at all
    EmptySystemMode,
}

impl From<core::fmt::Error> for CommandError {
    fn from(_: core::fmt::Error) -> Self {
        CommandError::Overflow
    }
}

/// `AT%XSYSTEMMODE=<LTE-M>,<NB-IoT>,<GNSS>,<preference>[,<NTN NB-IoT>]`
///
/// The NTN field is only appended when NTN is requested, so terrestrial
/// firmware that predates it still accepts the command.
pub fn system_mode(mode: SystemMode, preference: ModePreference) -> Result<AtCommand, CommandError> {
    if !mode.has_cellular() && !mode.gnss {
        return Err(CommandError::EmptySystemMode);
    }

    let mut cmd = AtCommand::new();
    write!(
        cmd,
        "AT%XSYSTEMMODE={},{},{},{}",
        mode.lte_m as u8,
        mode.nb_iot as u8,
        mode.gnss as u8,
        preference.code()
    )?;
    if mode.ntn_nb_iot {
        write!(cmd, ",1")?;
    }
    Ok(cmd)
}

/// `AT+CPSMS=1,,,"<periodic TAU>","<active time>"` or `AT+CPSMS=0`
pub fn psm_request(enable: bool, timers: &PsmTimers) -> Result<AtCommand, CommandError> {
    let mut cmd = AtCommand::new();
    if !enable {
        cmd.push_str(PSM_DISABLE).map_err(|_| CommandError::Overflow)?;
        return Ok(cmd);
    }

    check_bit_string(timers.periodic_tau, 8)?;
    check_bit_string(timers.active_time, 8)?;
    write!(
        cmd,
        "AT+CPSMS=1,,,\"{}\",\"{}\"",
        timers.periodic_tau, timers.active_time
    )?;
    Ok(cmd)
}

/// `AT+CEDRXS=2,<AcT>,"<eDRX>"` or `AT+CEDRXS=3`
///
/// Mode 2 also enables the `+CEDRXP` URC carrying the granted values.
pub fn edrx_request(
    enable: bool,
    act: AccessTechnology,
    value: &str,
) -> Result<AtCommand, CommandError> {
    let mut cmd = AtCommand::new();
    if !enable {
        cmd.push_str(EDRX_DISABLE).map_err(|_| CommandError::Overflow)?;
        return Ok(cmd);
    }

    check_bit_string(value, 4)?;
    write!(cmd, "AT+CEDRXS=2,{},\"{}\"", act.code(), value)?;
    Ok(cmd)
}

fn check_bit_string(bits: &str, width: usize) -> Result<(), CommandError> {
    if bits.len() == width && bits.bytes().all(|b| b == b'0' || b == b'1') {
        Ok(())
    } else {
        Err(CommandError::InvalidBitString)
    }
}
