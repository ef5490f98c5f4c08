//! Unsolicited Result Code Parsing
//!
//! Turns notification lines from the modem into [`LinkEvent`]s:
//! - `+CEREG: <stat>[,"<tac>","<ci>",<AcT>[,<cause>,<reject>[,"<active>","<tau>"]]]`
//! - `+CEDRXP: <AcT>,"<requested>","<granted>","<ptw>"`
//! - `%MDMEV: <event text>`
//! - `+CSCON: <mode>`
//!
//! Timer fields use the 3GPP TS 24.008 GPRS Timer 2 and GPRS Timer 3
//! encodings: three unit bits followed by a five bit value.

use heapless::Vec;

use super::AccessTechnology;
use crate::modem::{LinkEvent, ModemDomainEvent, RegistrationStatus, RrcMode};

/// Events produced by a single notification line
pub type ParsedEvents = Vec<LinkEvent, 3>;

/// Notification parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Not a notification this parser handles
    UnknownPrefix,
    /// Required field missing
    MissingField,
    /// Field is not a valid number
    InvalidNumber,
    /// Field is not a bit string of the expected width
    InvalidBitString,
}

/// T3412 extended units in seconds, indexed by the three unit bits.
/// `None` marks the deactivated timer.
const PERIODIC_TAU_UNITS: [Option<i32>; 8] = [
    Some(600),     // 10 min
    Some(3600),    // 1 h
    Some(36000),   // 10 h
    Some(2),       // 2 s
    Some(30),      // 30 s
    Some(60),      // 1 min
    Some(1152000), // 320 h
    None,
];

/// T3324 units in seconds. Undefined units count as one minute.
const ACTIVE_TIME_UNITS: [Option<i32>; 8] = [
    Some(2),   // 2 s
    Some(60),  // 1 min
    Some(360), // decihours
    Some(60),
    Some(60),
    Some(60),
    Some(60),
    None,
];

/// eDRX cycle lengths in seconds for LTE-M, indexed by the 4 bit value
const EDRX_LTEM: [f32; 16] = [
    5.12, 10.24, 20.48, 40.96, 61.44, 81.92, 102.4, 122.88, 143.36, 163.84, 327.68, 655.36,
    1310.72, 2621.44, 5242.88, 10485.76,
];

/// eDRX cycle lengths in seconds for NB-IoT. Reserved values fall back to 10.24 s.
const EDRX_NBIOT: [f32; 16] = [
    10.24, 10.24, 20.48, 40.96, 10.24, 81.92, 10.24, 10.24, 10.24, 163.84, 327.68, 655.36,
    1310.72, 2621.44, 5242.88, 10485.76,
];

/// Parse one notification line
pub fn parse(line: &str) -> Result<ParsedEvents, ParseError> {
    let line = line.trim();
    let (prefix, body) = line.split_once(':').ok_or(ParseError::UnknownPrefix)?;
    let body = body.trim();

    match prefix {
        "+CEREG" => parse_cereg(body),
        "+CEDRXP" => single(parse_cedrxp(body)?),
        "%MDMEV" => single(LinkEvent::ModemDomainEvent(parse_mdmev(body))),
        "+CSCON" => single(parse_cscon(body)?),
        _ => Err(ParseError::UnknownPrefix),
    }
}

fn single(event: LinkEvent) -> Result<ParsedEvents, ParseError> {
    let mut events = ParsedEvents::new();
    let _ = events.push(event);
    Ok(events)
}

/// Split a comma separated parameter list, trimming whitespace and quotes
fn fields(body: &str) -> impl Iterator<Item = &str> {
    body.split(',').map(|f| f.trim().trim_matches('"'))
}

fn parse_u8(field: &str) -> Result<u8, ParseError> {
    field.parse().map_err(|_| ParseError::InvalidNumber)
}

fn parse_hex(field: &str) -> Result<u32, ParseError> {
    u32::from_str_radix(field, 16).map_err(|_| ParseError::InvalidNumber)
}

fn parse_bits(field: &str, width: usize) -> Result<u8, ParseError> {
    if field.len() != width || !field.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(ParseError::InvalidBitString);
    }
    u8::from_str_radix(field, 2).map_err(|_| ParseError::InvalidBitString)
}

fn decode_timer(bits: &str, units: &[Option<i32>; 8]) -> Result<i32, ParseError> {
    let raw = parse_bits(bits, 8)?;
    let unit = units[(raw >> 5) as usize];
    let value = (raw & 0x1F) as i32;
    Ok(unit.map_or(-1, |seconds| seconds * value))
}

/// Decode a periodic TAU (T3412 extended) bit string to seconds, `-1` if deactivated
pub fn decode_periodic_tau(bits: &str) -> Result<i32, ParseError> {
    decode_timer(bits, &PERIODIC_TAU_UNITS)
}

/// Decode an active time (T3324) bit string to seconds, `-1` if deactivated
pub fn decode_active_time(bits: &str) -> Result<i32, ParseError> {
    decode_timer(bits, &ACTIVE_TIME_UNITS)
}

/// eDRX cycle length in seconds for a 4 bit eDRX value
pub fn edrx_seconds(act: AccessTechnology, value: u8) -> f32 {
    let index = (value & 0x0F) as usize;
    match act {
        AccessTechnology::LteM => EDRX_LTEM[index],
        AccessTechnology::NbIot => EDRX_NBIOT[index],
    }
}

/// Paging time window in seconds for a 4 bit PTW value
pub fn ptw_seconds(act: AccessTechnology, value: u8) -> f32 {
    let steps = ((value & 0x0F) + 1) as f32;
    match act {
        AccessTechnology::LteM => steps * 1.28,
        AccessTechnology::NbIot => steps * 2.56,
    }
}

fn parse_cereg(body: &str) -> Result<ParsedEvents, ParseError> {
    let mut fields = fields(body);
    let stat = fields.next().filter(|f| !f.is_empty()).ok_or(ParseError::MissingField)?;
    let status = RegistrationStatus::from_code(parse_u8(stat)?);

    let mut events = ParsedEvents::new();
    let _ = events.push(LinkEvent::RegistrationStatus(status));

    if !status.is_registered() {
        return Ok(events);
    }

    // A bad optional field drops only the event it belongs to
    let tac = fields.next().unwrap_or("");
    let ci = fields.next().unwrap_or("");
    if !tac.is_empty() && !ci.is_empty() {
        match (parse_hex(tac), parse_hex(ci)) {
            (Ok(tac), Ok(id)) => {
                let _ = events.push(LinkEvent::CellUpdate { tac, id });
            }
            (Err(e), _) | (_, Err(e)) => debug!("Ignoring +CEREG cell fields: {:?}", e),
        }
    }

    // AcT, cause type, reject cause
    let mut fields = fields.skip(3);
    let active = fields.next().unwrap_or("");
    let tau = fields.next().unwrap_or("");
    if !active.is_empty() && !tau.is_empty() {
        match (decode_periodic_tau(tau), decode_active_time(active)) {
            (Ok(tau), Ok(active_time)) => {
                let _ = events.push(LinkEvent::PsmUpdate { tau, active_time });
            }
            (Err(e), _) | (_, Err(e)) => debug!("Ignoring +CEREG PSM timers: {:?}", e),
        }
    }

    Ok(events)
}

fn parse_cedrxp(body: &str) -> Result<LinkEvent, ParseError> {
    let mut fields = fields(body);
    let act = parse_u8(fields.next().ok_or(ParseError::MissingField)?)?;

    // AcT 0: the network does not use eDRX
    let Some(act) = AccessTechnology::from_code(act) else {
        return Ok(LinkEvent::EdrxUpdate {
            edrx: -1.0,
            ptw: -1.0,
        });
    };

    let _requested = fields.next().ok_or(ParseError::MissingField)?;
    let granted = parse_bits(fields.next().ok_or(ParseError::MissingField)?, 4)?;
    let ptw = parse_bits(fields.next().ok_or(ParseError::MissingField)?, 4)?;

    Ok(LinkEvent::EdrxUpdate {
        edrx: edrx_seconds(act, granted),
        ptw: ptw_seconds(act, ptw),
    })
}

fn parse_mdmev(body: &str) -> ModemDomainEvent {
    match body {
        "SEARCH STATUS 1" => ModemDomainEvent::LightSearchDone,
        "SEARCH STATUS 2" => ModemDomainEvent::SearchDone,
        "RESET LOOP" => ModemDomainEvent::ResetLoop,
        "ME OVERHEATED" => ModemDomainEvent::Overheated,
        "NO IMEI" => ModemDomainEvent::NoImei,
        _ => match body.strip_prefix("PRACH CE-LEVEL ").map(parse_u8) {
            Some(Ok(level @ 0..=3)) => ModemDomainEvent::CeLevel(level),
            _ => {
                debug!("Unrecognized modem domain event: {}", body);
                ModemDomainEvent::Other
            }
        },
    }
}

fn parse_cscon(body: &str) -> Result<LinkEvent, ParseError> {
    let mode = fields(body).next().ok_or(ParseError::MissingField)?;
    match parse_u8(mode)? {
        0 => Ok(LinkEvent::RrcUpdate(RrcMode::Idle)),
        1 => Ok(LinkEvent::RrcUpdate(RrcMode::Connected)),
        _ => Err(ParseError::InvalidNumber),
    }
}
