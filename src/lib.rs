#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

//! nRF9160 NTN Firmware Library
//!
//! Connection lifecycle for a cellular modem registering on a
//! Non-Terrestrial (satellite) network, organized in layers:
//!
//! - `modem`: interfaces to the modem library and link controller
//! - `at` / `link`: AT command codec and the AT-backed link controller
//! - `lifecycle`: modem bring-up and connect sequencing
//! - `handler` / `state`: link event consumption and connection state
//! - `status`: periodic status reporting
//!
//! Hardware bindings live in the firmware binary; everything here builds and
//! runs on the host.

// This must go first so the logging macros are visible to the other modules
mod fmt;

pub mod at;
pub mod config;
pub mod handler;
pub mod lifecycle;
pub mod link;
pub mod modem;
pub mod state;
pub mod status;
pub mod system;
