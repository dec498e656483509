//! Service probe: reconciles the tray with the OS service manager.
//!
//! State is derived on demand from the OS and never cached. Start/stop first
//! go to the service manager directly; when the current principal lacks the
//! rights, the console executable is re-invoked elevated with `--Start` or
//! `--Stop`. A failed elevation is reported through the user surface and is
//! never retried.

use crate::config::ServiceConfig;
use crate::error::{Result, TrayError};
use crate::TrayContext;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Install/running state of the OS service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    NotInstalled,
    Stopped,
    Running,
}

impl ServiceState {
    pub fn is_installed(&self) -> bool {
        !matches!(self, ServiceState::NotInstalled)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::NotInstalled => "not installed",
            ServiceState::Stopped => "stopped",
            ServiceState::Running => "running",
        };
        write!(f, "{}", s)
    }
}

/// Command issued to the OS service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
}

impl ServiceAction {
    /// Verb understood by `sc.exe` and `systemctl`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
        }
    }

    /// Flag passed to an elevated console re-invocation.
    pub fn console_flag(&self) -> &'static str {
        match self {
            ServiceAction::Start => ServiceConfig::START_FLAG,
            ServiceAction::Stop => ServiceConfig::STOP_FLAG,
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Queries and controls the Jackett OS service.
pub struct ServiceProbe {
    ctx: Arc<TrayContext>,
}

impl ServiceProbe {
    pub fn new(ctx: Arc<TrayContext>) -> Self {
        Self { ctx }
    }

    /// Current service state. Query failures are logged and read as
    /// not installed.
    pub fn state(&self) -> ServiceState {
        let name = &self.ctx.config.service_name;
        match self.ctx.platform.query_service_state(name) {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to query service {}: {}", name, e);
                ServiceState::NotInstalled
            }
        }
    }

    pub fn exists(&self) -> bool {
        self.state().is_installed()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServiceState::Running
    }

    pub fn start(&self) -> Result<()> {
        self.control(ServiceAction::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.control(ServiceAction::Stop)
    }

    /// Stop the service when running, start it otherwise.
    ///
    /// Returns the action that was issued.
    pub fn toggle(&self) -> Result<ServiceAction> {
        let action = if self.is_running() {
            ServiceAction::Stop
        } else {
            ServiceAction::Start
        };
        self.control(action)?;
        Ok(action)
    }

    /// Issue a service command, falling back to an elevated console.
    pub fn control(&self, action: ServiceAction) -> Result<()> {
        let name = &self.ctx.config.service_name;
        let platform = &self.ctx.platform;

        match platform.control_service(name, action) {
            Ok(()) => {
                info!("Service {} {} issued", name, action);
                return Ok(());
            }
            Err(e) if platform.is_elevated() && !e.is_permission_denied() => {
                error!("Service {} {} failed: {}", name, action, e);
                self.notify_failure(action, &e);
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "Direct {} of service {} failed ({}), re-invoking console elevated",
                    action, name, e
                );
            }
        }

        let console = self.ctx.config.console_path();
        match platform.run_elevated(&console, &[action.console_flag()]) {
            Ok(()) => {
                info!(
                    "Elevated {} {} completed",
                    console.display(),
                    action.console_flag()
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    "Elevated {} {} failed: {}",
                    console.display(),
                    action.console_flag(),
                    e
                );
                let err = TrayError::ElevationFailed {
                    action,
                    message: e.to_string(),
                };
                self.notify_failure(action, &err);
                Err(err)
            }
        }
    }

    fn notify_failure(&self, action: ServiceAction, err: &TrayError) {
        let message = match err {
            TrayError::ElevationFailed { .. } => {
                format!("Failed to get admin rights to {} the service.", action)
            }
            other => format!("Failed to {} the service: {}", action, other),
        };
        self.ctx.surface.show_error("Error", &message);
    }
}
