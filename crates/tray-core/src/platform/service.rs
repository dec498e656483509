//! Platform-specific service manager access.
//!
//! # Platform Behavior
//! - **Windows**: Service Control Manager through `sc.exe`
//! - **Linux**: systemd through `systemctl`; hosts without `systemctl`
//!   report [`ServiceState::NotInstalled`]
//! - **Other**: always [`ServiceState::NotInstalled`]; control is rejected

use crate::error::{Result, TrayError};
use crate::service::{ServiceAction, ServiceState};
#[cfg(any(target_os = "linux", target_os = "windows"))]
use std::process::Command;
use tracing::debug;

/// Windows `sc.exe` exit code for a service that does not exist.
#[cfg_attr(not(windows), allow(dead_code))]
const SC_SERVICE_DOES_NOT_EXIST: i32 = 1060;
/// Windows `sc.exe` exit code for access denied.
#[cfg_attr(not(windows), allow(dead_code))]
const SC_ACCESS_DENIED: i32 = 5;
/// `systemctl` exit code for "access denied / authentication required".
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
const SYSTEMCTL_ACCESS_DENIED: i32 = 4;

/// Query the state of a named service.
pub fn query_state(service_name: &str) -> Result<ServiceState> {
    #[cfg(target_os = "windows")]
    {
        query_state_windows(service_name)
    }

    #[cfg(target_os = "linux")]
    {
        query_state_linux(service_name)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        debug!("No service manager on this platform for {}", service_name);
        Ok(ServiceState::NotInstalled)
    }
}

/// Start or stop a named service with the privileges of the current user.
///
/// Returns [`TrayError::PermissionDenied`] when the service manager refuses
/// the request for lack of rights.
pub fn control(service_name: &str, action: ServiceAction) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        control_windows(service_name, action)
    }

    #[cfg(target_os = "linux")]
    {
        control_linux(service_name, action)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Err(TrayError::Unsupported(format!(
            "cannot {} service {}: no service manager",
            action, service_name
        )))
    }
}

#[cfg(target_os = "windows")]
fn query_state_windows(service_name: &str) -> Result<ServiceState> {
    let output = Command::new("sc.exe")
        .args(["query", service_name])
        .output()
        .map_err(|e| TrayError::Other(format!("Failed to run sc.exe: {}", e)))?;

    if output.status.code() == Some(SC_SERVICE_DOES_NOT_EXIST) {
        return Ok(ServiceState::NotInstalled);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let state = parse_sc_query(&stdout);
    debug!("sc query {} -> {:?}", service_name, state);
    Ok(state)
}

#[cfg(target_os = "windows")]
fn control_windows(service_name: &str, action: ServiceAction) -> Result<()> {
    let output = Command::new("sc.exe")
        .args([action.as_str(), service_name])
        .output()
        .map_err(|e| TrayError::Other(format!("Failed to run sc.exe: {}", e)))?;

    if output.status.success() {
        return Ok(());
    }

    if output.status.code() == Some(SC_ACCESS_DENIED) {
        return Err(TrayError::PermissionDenied {
            operation: format!("sc.exe {} {}", action, service_name),
        });
    }

    Err(TrayError::ServiceControl {
        action,
        message: String::from_utf8_lossy(&output.stdout).trim().to_string(),
    })
}

#[cfg(target_os = "linux")]
fn query_state_linux(service_name: &str) -> Result<ServiceState> {
    let output = match Command::new("systemctl")
        .args(["show", service_name, "--property=LoadState,ActiveState"])
        .output()
    {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("systemctl not available, treating {} as not installed", service_name);
            return Ok(ServiceState::NotInstalled);
        }
        Err(e) => return Err(TrayError::Other(format!("Failed to run systemctl: {}", e))),
    };

    if !output.status.success() {
        // No reachable systemd instance (containers, non-systemd init).
        debug!(
            "systemctl show {} failed: {}",
            service_name,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(ServiceState::NotInstalled);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let state = parse_systemctl_show(&stdout);
    debug!("systemctl show {} -> {:?}", service_name, state);
    Ok(state)
}

#[cfg(target_os = "linux")]
fn control_linux(service_name: &str, action: ServiceAction) -> Result<()> {
    let output = Command::new("systemctl")
        .args(["--no-ask-password", action.as_str(), service_name])
        .output()
        .map_err(|e| TrayError::Other(format!("Failed to run systemctl: {}", e)))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if output.status.code() == Some(SYSTEMCTL_ACCESS_DENIED) || is_access_denied(&stderr) {
        return Err(TrayError::PermissionDenied {
            operation: format!("systemctl {} {}", action, service_name),
        });
    }

    Err(TrayError::ServiceControl {
        action,
        message: stderr.trim().to_string(),
    })
}

/// Interpret `sc.exe query` output for an installed service.
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_sc_query(output: &str) -> ServiceState {
    let running = output
        .lines()
        .filter(|line| line.trim_start().starts_with("STATE"))
        .any(|line| line.contains("RUNNING") || line.contains("START_PENDING"));

    if running {
        ServiceState::Running
    } else {
        ServiceState::Stopped
    }
}

/// Interpret `systemctl show --property=LoadState,ActiveState` output.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_systemctl_show(output: &str) -> ServiceState {
    let mut load_state = "";
    let mut active_state = "";

    for line in output.lines() {
        if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                "LoadState" => load_state = value.trim(),
                "ActiveState" => active_state = value.trim(),
                _ => {}
            }
        }
    }

    match (load_state, active_state) {
        ("not-found", _) | ("", _) => ServiceState::NotInstalled,
        (_, "active" | "activating" | "reloading") => ServiceState::Running,
        _ => ServiceState::Stopped,
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn is_access_denied(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("access denied") || lower.contains("authentication is required")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sc_query_running() {
        let output = "\
SERVICE_NAME: Jackett
        TYPE               : 10  WIN32_OWN_PROCESS
        STATE              : 4  RUNNING
                                (STOPPABLE, NOT_PAUSABLE, ACCEPTS_SHUTDOWN)
        WIN32_EXIT_CODE    : 0  (0x0)
";
        assert_eq!(parse_sc_query(output), ServiceState::Running);
    }

    #[test]
    fn test_parse_sc_query_stopped() {
        let output = "\
SERVICE_NAME: Jackett
        TYPE               : 10  WIN32_OWN_PROCESS
        STATE              : 1  STOPPED
        WIN32_EXIT_CODE    : 1077  (0x435)
";
        assert_eq!(parse_sc_query(output), ServiceState::Stopped);
    }

    #[test]
    fn test_parse_systemctl_show() {
        assert_eq!(
            parse_systemctl_show("LoadState=loaded\nActiveState=active\n"),
            ServiceState::Running
        );
        assert_eq!(
            parse_systemctl_show("LoadState=loaded\nActiveState=inactive\n"),
            ServiceState::Stopped
        );
        assert_eq!(
            parse_systemctl_show("LoadState=loaded\nActiveState=failed\n"),
            ServiceState::Stopped
        );
        assert_eq!(
            parse_systemctl_show("LoadState=not-found\nActiveState=inactive\n"),
            ServiceState::NotInstalled
        );
        assert_eq!(parse_systemctl_show(""), ServiceState::NotInstalled);
    }

    #[test]
    fn test_access_denied_detection() {
        assert!(is_access_denied(
            "Failed to stop jackett.service: Access denied"
        ));
        assert!(is_access_denied(
            "Failed to start jackett.service: Interactive authentication is required."
        ));
        assert!(!is_access_denied("Unit jackett.service not loaded."));
    }

    #[test]
    fn test_query_unknown_service_does_not_panic() {
        let result = query_state("jackett-tray-test-unit-that-does-not-exist");
        if let Ok(state) = result {
            assert_ne!(state, ServiceState::Running);
        }
    }
}
