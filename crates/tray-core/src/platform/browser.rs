//! Opening the web UI in the default browser.

use crate::error::{Result, TrayError};
use std::process::{Command, Stdio};
use tracing::debug;

/// Open a URL in the default system browser.
///
/// Only http and https URLs are allowed.
///
/// # Platform Behavior
/// - **Linux**: `xdg-open`
/// - **macOS**: `open`
/// - **Windows**: `cmd /C start`
pub fn open_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(TrayError::Other(format!(
            "Refusing to open non-http URL: {}",
            url
        )));
    }

    let mut cmd = browser_command(url);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match cmd.spawn() {
        Ok(mut child) => {
            // Don't block the caller on the opener
            std::thread::spawn(move || {
                let _ = child.wait();
            });
            debug!("Opened {}", url);
            Ok(())
        }
        Err(e) => Err(TrayError::Other(format!(
            "Failed to open browser for {}: {}",
            url, e
        ))),
    }
}

#[cfg(target_os = "windows")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(open_url("file:///etc/passwd").is_err());
        assert!(open_url("javascript:alert(1)").is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_browser_command_linux() {
        let cmd = browser_command("http://127.0.0.1:9117");
        assert_eq!(cmd.get_program(), "xdg-open");
    }
}
