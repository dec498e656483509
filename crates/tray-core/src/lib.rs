//! Jackett Tray Core - headless supervision core for the Jackett tray host.
//!
//! The tray either runs the Jackett console server as a child process (when
//! no OS service is installed) or acts as a front-end for the installed
//! service. This crate holds everything except the visible tray icon:
//! launching and tearing down the child, probing and controlling the
//! service, the inter-process shutdown signal, and the menu model.
//!
//! # Example
//!
//! ```rust,no_run
//! use jackett_tray_core::{
//!     LifecycleController, LogSurface, NativePlatform, ServerConfig, TrayConfig, TrayContext,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> jackett_tray_core::Result<()> {
//!     let config = TrayConfig::from_environment()?;
//!     let server = ServerConfig::load(&config.data_folder)?;
//!     let ctx = Arc::new(TrayContext::new(
//!         config,
//!         server,
//!         NativePlatform::shared(),
//!         Arc::new(LogSurface::new()),
//!     ));
//!
//!     let mut controller = LifecycleController::new(ctx);
//!     controller.start()?;
//!     let outcome = controller.run().await;
//!     println!("Shut down: {}", outcome.trigger);
//!     Ok(())
//! }
//! ```

pub mod autostart;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod menu;
pub mod platform;
pub mod process;
pub mod service;
pub mod signal;
pub mod surface;

use std::sync::Arc;

// Re-export commonly used types
pub use autostart::AutoStart;
pub use config::{ServerConfig, TrayConfig, TrayConfigBuilder};
pub use error::{Result, TrayError};
pub use lifecycle::{
    ExitOutcome, LifecycleController, LifecycleEvent, LifecycleState, ShutdownHandle,
    ShutdownTrigger,
};
pub use menu::{MenuAction, MenuItem, MenuModel, TrayActions};
pub use platform::{NativePlatform, Platform};
pub use process::{LaunchConfig, ProcessHandle, ProcessLauncher, Termination};
pub use service::{ServiceAction, ServiceProbe, ServiceState};
pub use signal::{NamedSignal, SignalListener};
pub use surface::{LogSurface, UserSurface};

/// Everything the tray components share, passed explicitly.
pub struct TrayContext {
    pub config: TrayConfig,
    pub server: ServerConfig,
    pub platform: Arc<dyn Platform>,
    pub surface: Arc<dyn UserSurface>,
}

impl TrayContext {
    pub fn new(
        config: TrayConfig,
        server: ServerConfig,
        platform: Arc<dyn Platform>,
        surface: Arc<dyn UserSurface>,
    ) -> Self {
        Self {
            config,
            server,
            platform,
            surface,
        }
    }
}
