//! Child process supervision.
//!
//! Launches the console server with redirected streams and tears it down
//! with a graceful-then-forced sequence.
//!
//! # Shutdown Sequence
//!
//! 1. **Close input** - the console server exits when its stdin reaches EOF
//! 2. **Wait** - up to the configured grace period
//! 3. **Kill** - forced termination if the child is still alive
//!
//! # Example
//!
//! ```rust,no_run
//! use jackett_tray_core::process::ProcessLauncher;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> jackett_tray_core::Result<()> {
//!     let mut child = ProcessLauncher::start("/opt/jackett/JackettConsole", |line| {
//!         eprintln!("console: {}", line);
//!     })?;
//!
//!     let outcome = child.terminate(Duration::from_millis(1000)).await?;
//!     println!("forced: {}", outcome.forced);
//!     Ok(())
//! }
//! ```

mod launcher;

pub use launcher::{LaunchConfig, ProcessHandle, ProcessLauncher, Termination};
