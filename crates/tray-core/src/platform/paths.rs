//! Platform-specific path utilities.
//!
//! This module provides functions to get platform-specific paths for:
//! - Executable names (platform suffix)
//! - The Jackett data folder
//! - The per-user autostart location
//! - The runtime directory holding the named shutdown signal

use crate::config::AppConfig;
use crate::error::{Result, TrayError};
use std::path::PathBuf;

/// Append the platform executable suffix to a base name.
///
/// # Platform Behavior
/// - **Windows**: `{name}.exe`
/// - **Linux/macOS**: `{name}`
pub fn executable_name(base: &str) -> String {
    format!("{}{}", base, std::env::consts::EXE_SUFFIX)
}

/// Get the Jackett data folder.
///
/// # Platform Behavior
/// - **Windows**: `%ProgramData%\Jackett`
/// - **Linux/macOS**: `{config_dir}/Jackett` (e.g. `~/.config/Jackett`)
pub fn jackett_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let program_data = std::env::var_os("ProgramData")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"));
        Ok(program_data.join(AppConfig::DATA_FOLDER_NAME))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let config_dir = dirs::config_dir().ok_or_else(|| TrayError::Config {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join(AppConfig::DATA_FOLDER_NAME))
    }
}

/// Get the directory whose entries are launched at user login.
///
/// # Platform Behavior
/// - **Windows**: `%APPDATA%\Microsoft\Windows\Start Menu\Programs\Startup`
/// - **Linux**: `~/.config/autostart` (XDG autostart)
/// - **Other**: unsupported
pub fn autostart_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let data_dir = dirs::data_dir().ok_or_else(|| TrayError::Config {
            message: "Could not determine app data directory".to_string(),
        })?;
        Ok(data_dir
            .join("Microsoft")
            .join("Windows")
            .join("Start Menu")
            .join("Programs")
            .join("Startup"))
    }

    #[cfg(target_os = "linux")]
    {
        let config_dir = dirs::config_dir().ok_or_else(|| TrayError::Config {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("autostart"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Err(TrayError::Unsupported(
            "autostart entries are not available on this platform".to_string(),
        ))
    }
}

/// Get the directory holding per-session runtime files.
///
/// Uses `$XDG_RUNTIME_DIR` when available and the temp directory otherwise.
pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir().unwrap_or_else(std::env::temp_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_name() {
        let name = executable_name("JackettConsole");
        #[cfg(windows)]
        assert_eq!(name, "JackettConsole.exe");
        #[cfg(not(windows))]
        assert_eq!(name, "JackettConsole");
    }

    #[test]
    fn test_data_dir_ends_with_jackett() {
        if let Ok(dir) = jackett_data_dir() {
            assert!(dir.ends_with("Jackett"));
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_autostart_dir_linux() {
        if let Ok(dir) = autostart_dir() {
            assert!(dir.ends_with("autostart"));
        }
    }
}
