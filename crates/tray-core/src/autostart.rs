//! Start-at-login toggle.
//!
//! The presence of the platform's autostart entry is the persisted state;
//! nothing else is stored.

use crate::error::Result;
use crate::platform::Platform;
use crate::TrayContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AutoStart {
    platform: Arc<dyn Platform>,
    target: PathBuf,
}

impl AutoStart {
    /// Autostart entry pointing at the tray executable.
    pub fn new(ctx: &TrayContext) -> Self {
        Self {
            platform: Arc::clone(&ctx.platform),
            target: ctx.config.tray_executable.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self.platform.autostart_entry_path() {
            Ok(path) => path.exists(),
            Err(e) => {
                warn!("Could not resolve autostart entry: {}", e);
                false
            }
        }
    }

    /// Enable or disable autostart. Returns whether anything changed.
    pub fn set(&self, enabled: bool) -> Result<bool> {
        if self.is_enabled() == enabled {
            debug!("Autostart already {}", if enabled { "on" } else { "off" });
            return Ok(false);
        }

        if enabled {
            self.platform.create_autostart_entry(&self.target)?;
        } else {
            self.platform.remove_autostart_entry()?;
        }
        info!("Autostart turned {}", if enabled { "on" } else { "off" });
        Ok(true)
    }

    /// Flip the setting and return the new state.
    pub fn toggle(&self) -> Result<bool> {
        let enabled = !self.is_enabled();
        self.set(enabled)?;
        Ok(enabled)
    }
}
