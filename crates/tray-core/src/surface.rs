//! User-facing surface seam.
//!
//! The tray's visible parts (error dialogs, the notification-area icon) sit
//! behind [`UserSurface`] so the supervision logic never touches a UI
//! toolkit directly.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

/// What the supervision core needs from the user interface.
pub trait UserSurface: Send + Sync {
    /// Show an error notice and wait for acknowledgement.
    fn show_error(&self, title: &str, message: &str);

    /// Release the display affordance (tray icon) before the host exits.
    fn release(&self);
}

/// Surface for headless runs: notices go to the log.
#[derive(Debug, Default)]
pub struct LogSurface {
    released: AtomicBool,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`UserSurface::release`] has been called.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl UserSurface for LogSurface {
    fn show_error(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            debug!("Display affordance released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_surface_release() {
        let surface = LogSurface::new();
        assert!(!surface.is_released());

        surface.release();
        surface.release();
        assert!(surface.is_released());
    }
}
