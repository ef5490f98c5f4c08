//! AT Command Layer
//!
//! Formatting of the AT commands the link controller issues and parsing of
//! the unsolicited result codes (URCs) the modem reports back.

pub mod command;
pub mod notification;

/// Access technology field used by `+CEDRXS` / `+CEDRXP`
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessTechnology {
    /// E-UTRAN WB-S1 (LTE-M)
    LteM = 4,
    /// E-UTRAN NB-S1 (NB-IoT, terrestrial or NTN)
    NbIot = 5,
}

impl AccessTechnology {
    /// `<AcT>` value used in AT commands and notifications
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Map an `<AcT>` value; `None` for technologies without eDRX support
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            4 => Some(Self::LteM),
            5 => Some(Self::NbIot),
            _ => None,
        }
    }
}
