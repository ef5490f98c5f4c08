//! Modem Lifecycle Coordinator
//!
//! Brings the modem up and starts network registration in two phases:
//!
//! 1. [`modem_init`](LifecycleCoordinator::modem_init): library init, a
//!    diagnostic UUID read, system mode, then PSM and eDRX requests
//! 2. [`connect`](LifecycleCoordinator::connect): event subscription and an
//!    asynchronous connect request
//!
//! Library init, the system mode write and issuing the connect request are
//! fatal. Everything else is logged and skipped.

use crate::at::command;
use crate::config::AppConfig;
use crate::modem::{ErrorCode, EventChannel, LinkController, ModemLibrary};

/// Fatal startup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// Modem library could not be initialized
    ModemInit(ErrorCode),
    /// System mode could not be written
    SystemMode(ErrorCode),
    /// Connect request could not be issued
    Connect(ErrorCode),
}

impl StartupError {
    /// Underlying collaborator error code
    pub const fn code(&self) -> ErrorCode {
        match *self {
            StartupError::ModemInit(code)
            | StartupError::SystemMode(code)
            | StartupError::Connect(code) => code,
        }
    }
}

/// Sequences modem bring-up and network registration
pub struct LifecycleCoordinator<M, L> {
    modem: M,
    link: L,
    config: AppConfig,
}

impl<'ch, M: ModemLibrary, L: LinkController<'ch>> LifecycleCoordinator<M, L> {
    /// Take ownership of both collaborators
    pub fn new(modem: M, link: L, config: AppConfig) -> Self {
        Self {
            modem,
            link,
            config,
        }
    }

    /// Modem library in use
    pub fn modem(&self) -> &M {
        &self.modem
    }

    /// Link controller in use
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Phase 1: initialize the modem and configure it for NTN
    pub async fn modem_init(&mut self) -> Result<(), StartupError> {
        info!("Initializing modem library");
        self.modem.init().await.map_err(|e| {
            error!("Failed to initialize modem library, error: {}", e.code());
            StartupError::ModemInit(e)
        })?;

        match self.modem.send_at_command(command::MODEM_UUID).await {
            Ok(uuid) => info!("Modem UUID: {}", uuid.as_str()),
            Err(e) => warn!("Failed to read modem UUID, error: {}", e.code()),
        }

        self.link
            .set_system_mode(self.config.system_mode, self.config.mode_preference)
            .await
            .map_err(|e| {
                error!("Failed to set NTN system mode, error: {}", e.code());
                StartupError::SystemMode(e)
            })?;
        info!("System mode set for NTN");

        if let Err(e) = self
            .link
            .request_power_saving_mode(self.config.psm_enabled)
            .await
        {
            warn!("Failed to request PSM, error: {}", e.code());
        }

        if let Err(e) = self.link.request_extended_drx(self.config.edrx_enabled).await {
            warn!("Failed to request eDRX, error: {}", e.code());
        }

        Ok(())
    }

    /// Phase 2: subscribe `handler` to link events and start registration.
    ///
    /// Returns as soon as the request is issued; registration progress
    /// arrives on `handler`.
    pub async fn connect(&mut self, handler: &'ch EventChannel) -> Result<(), StartupError> {
        self.link.register_event_handler(handler);

        info!("Connecting to NTN network...");
        self.link.connect_async(handler).await.map_err(|e| {
            error!("Failed to connect to NTN network, error: {}", e.code());
            StartupError::Connect(e)
        })
    }

    /// Run both phases
    pub async fn start(&mut self, handler: &'ch EventChannel) -> Result<(), StartupError> {
        self.modem_init().await?;
        self.connect(handler).await
    }
}
