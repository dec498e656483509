//! Platform abstraction layer for cross-platform compatibility.
//!
//! This module centralizes all platform-specific code. All `#[cfg]` blocks
//! for OS-specific behavior live here rather than being scattered through
//! the supervision logic.
//!
//! # Architecture
//!
//! The rest of the crate talks to the OS through the [`Platform`]
//! capability trait. [`NativePlatform`] is the one implementation per
//! target, assembled from these submodules:
//! - `paths` - Platform-specific directory and file paths
//! - `service` - OS service manager queries and control
//! - `elevation` - Privilege checks and elevated re-invocation
//! - `autostart` - Login autostart entries
//! - `browser` - Opening the web UI
//!
//! # Supported Platforms
//!
//! - **Windows**: Full support
//! - **Linux**: Full support (service control requires systemd)
//! - **macOS**: No service manager or autostart; reports NotInstalled

pub mod autostart;
pub mod browser;
#[cfg(target_os = "linux")]
pub mod desktop_entry;
pub mod elevation;
pub mod paths;
pub mod service;

use crate::error::Result;
use crate::service::{ServiceAction, ServiceState};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// OS capabilities the tray host depends on.
///
/// Platforms lacking a service manager report
/// [`ServiceState::NotInstalled`] unconditionally.
pub trait Platform: Send + Sync {
    /// Query the install/running state of a service.
    fn query_service_state(&self, service_name: &str) -> Result<ServiceState>;

    /// Issue a start/stop command with the current user's rights.
    fn control_service(&self, service_name: &str, action: ServiceAction) -> Result<()>;

    /// Whether the current principal may control services directly.
    fn is_elevated(&self) -> bool;

    /// Run a program with elevated rights and wait for it.
    fn run_elevated(&self, program: &Path, args: &[&str]) -> Result<()>;

    /// Location of the autostart entry (whether or not it exists).
    fn autostart_entry_path(&self) -> Result<PathBuf>;

    /// Create the autostart entry pointing at `target`.
    fn create_autostart_entry(&self, target: &Path) -> Result<()>;

    /// Remove the autostart entry if present.
    fn remove_autostart_entry(&self) -> Result<()>;

    /// Open a URL in the user's browser.
    fn open_url(&self, url: &str) -> Result<()>;
}

/// The platform the tray host is running on.
#[derive(Debug, Clone)]
pub struct NativePlatform {
    /// Autostart directory override; resolved lazily when `None`.
    autostart_dir: Option<PathBuf>,
}

impl NativePlatform {
    /// Create a platform handle using the OS default locations.
    pub fn new() -> Self {
        Self {
            autostart_dir: None,
        }
    }

    /// Use a custom directory for the autostart entry.
    pub fn with_autostart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.autostart_dir = Some(dir.into());
        self
    }

    /// Shared handle, as stored in the tray context.
    pub fn shared() -> Arc<dyn Platform> {
        Arc::new(Self::new())
    }

    fn resolve_autostart_dir(&self) -> Result<PathBuf> {
        match self.autostart_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => paths::autostart_dir(),
        }
    }
}

impl Default for NativePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for NativePlatform {
    fn query_service_state(&self, service_name: &str) -> Result<ServiceState> {
        service::query_state(service_name)
    }

    fn control_service(&self, service_name: &str, action: ServiceAction) -> Result<()> {
        service::control(service_name, action)
    }

    fn is_elevated(&self) -> bool {
        elevation::is_elevated()
    }

    fn run_elevated(&self, program: &Path, args: &[&str]) -> Result<()> {
        elevation::run_elevated(program, args)
    }

    fn autostart_entry_path(&self) -> Result<PathBuf> {
        Ok(autostart::entry_path(&self.resolve_autostart_dir()?))
    }

    fn create_autostart_entry(&self, target: &Path) -> Result<()> {
        autostart::create_entry(&self.resolve_autostart_dir()?, target)
    }

    fn remove_autostart_entry(&self) -> Result<()> {
        autostart::remove_entry(&self.resolve_autostart_dir()?)
    }

    fn open_url(&self, url: &str) -> Result<()> {
        browser::open_url(url)
    }
}

/// Returns true if login autostart entries are supported here.
pub fn autostart_supported() -> bool {
    cfg!(any(target_os = "linux", target_os = "windows"))
}
