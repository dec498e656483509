//! Centralized configuration for the tray host.
//!
//! Constants live on associated-const structs; runtime settings are resolved
//! once at startup into a [`TrayConfig`] and a [`ServerConfig`], which are
//! read-only afterwards.

use crate::error::{Result, TrayError};
use crate::platform::paths;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Application-level constants.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "Jackett Tray";
    pub const CONSOLE_EXE_NAME: &'static str = "JackettConsole";
    pub const LOG_FILE_NAME: &'static str = "TrayLog.txt";
    pub const SERVER_CONFIG_FILE: &'static str = "ServerConfig.json";
    pub const DATA_FOLDER_NAME: &'static str = "Jackett";
    pub const DEFAULT_PORT: u16 = 9117;
    pub const LOCAL_HOST: &'static str = "127.0.0.1";
}

/// OS service manager configuration.
pub struct ServiceConfig;

impl ServiceConfig {
    /// Windows service name registered by the Jackett installer.
    pub const WINDOWS_SERVICE_NAME: &'static str = "Jackett";
    /// systemd unit name used by the Linux install script.
    pub const SYSTEMD_UNIT_NAME: &'static str = "jackett";
    /// Console flag asking an elevated console to start the service.
    pub const START_FLAG: &'static str = "--Start";
    /// Console flag asking an elevated console to stop the service.
    pub const STOP_FLAG: &'static str = "--Stop";

    /// Service name for the current platform.
    pub fn default_name() -> &'static str {
        if cfg!(windows) {
            Self::WINDOWS_SERVICE_NAME
        } else {
            Self::SYSTEMD_UNIT_NAME
        }
    }
}

/// Shutdown coordination configuration.
pub struct ShutdownConfig;

impl ShutdownConfig {
    /// How long the child gets to exit after its input is closed.
    pub const GRACE_PERIOD: Duration = Duration::from_millis(1000);
    /// Name of the inter-process shutdown signal.
    #[cfg(windows)]
    pub const SIGNAL_NAME: &'static str = r"Global\JACKETTTRAY";
    #[cfg(not(windows))]
    pub const SIGNAL_NAME: &'static str = "jackett-tray";
}

/// Autostart entry configuration.
pub struct AutostartConfig;

impl AutostartConfig {
    /// Shortcut placed in the Windows Startup folder.
    pub const WINDOWS_SHORTCUT_NAME: &'static str = "Jackett.lnk";
    /// XDG autostart entry file name.
    pub const DESKTOP_ENTRY_NAME: &'static str = "jackett-tray.desktop";
}

/// Server settings the tray needs from the Jackett configuration.
///
/// Only the port is read; every other field of `ServerConfig.json` is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    AppConfig::DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: AppConfig::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Load the server configuration from a Jackett data folder.
    ///
    /// A missing `ServerConfig.json` yields the defaults. A file that exists
    /// but cannot be read or parsed is a configuration error.
    pub fn load(data_folder: &Path) -> Result<Self> {
        let path = data_folder.join(AppConfig::SERVER_CONFIG_FILE);
        if !path.exists() {
            debug!(
                "No server config at {}, using port {}",
                path.display(),
                AppConfig::DEFAULT_PORT
            );
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| TrayError::io_with_path(e, &path))?;
        let config: ServerConfig =
            serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(|e| {
                TrayError::Config {
                    message: format!("invalid {}: {}", path.display(), e),
                }
            })?;

        info!("Loaded server config from {} (port {})", path.display(), config.port);
        Ok(config)
    }

    /// Address of the web UI served by the supervised server.
    pub fn web_ui_url(&self) -> String {
        format!("http://{}:{}", AppConfig::LOCAL_HOST, self.port)
    }
}

/// Tray host settings, built once at startup.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Directory holding the console executable.
    pub install_dir: PathBuf,
    /// Base name of the console executable (no platform suffix).
    pub console_name: String,
    /// Path the autostart entry points at.
    pub tray_executable: PathBuf,
    /// Jackett data folder (holds `ServerConfig.json`).
    pub data_folder: PathBuf,
    /// Directory the tray log is written to.
    pub log_dir: PathBuf,
    /// OS service name.
    pub service_name: String,
    /// Name of the inter-process shutdown signal.
    pub signal_name: String,
    /// Grace period between closing the child's input and killing it.
    pub grace_period: Duration,
}

impl TrayConfig {
    /// Start building a configuration rooted at an installation directory.
    pub fn builder(install_dir: impl Into<PathBuf>) -> TrayConfigBuilder {
        TrayConfigBuilder::new(install_dir)
    }

    /// Resolve the configuration for the running executable.
    ///
    /// The installation directory is the directory of the current
    /// executable; the data folder is the platform's Jackett data folder.
    pub fn from_environment() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|e| TrayError::Config {
            message: format!("Could not determine current executable: {}", e),
        })?;
        let install_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| TrayError::Config {
                message: format!("Executable has no parent directory: {}", exe.display()),
            })?;

        Ok(Self::builder(install_dir)
            .tray_executable(exe)
            .data_folder(paths::jackett_data_dir()?)
            .build())
    }

    /// Full path of the console executable.
    pub fn console_path(&self) -> PathBuf {
        self.install_dir
            .join(paths::executable_name(&self.console_name))
    }

    /// Full path of the tray log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(AppConfig::LOG_FILE_NAME)
    }
}

/// Builder for [`TrayConfig`].
pub struct TrayConfigBuilder {
    install_dir: PathBuf,
    console_name: String,
    tray_executable: Option<PathBuf>,
    data_folder: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    service_name: String,
    signal_name: String,
    grace_period: Duration,
}

impl TrayConfigBuilder {
    fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            console_name: AppConfig::CONSOLE_EXE_NAME.to_string(),
            tray_executable: None,
            data_folder: None,
            log_dir: None,
            service_name: ServiceConfig::default_name().to_string(),
            signal_name: ShutdownConfig::SIGNAL_NAME.to_string(),
            grace_period: ShutdownConfig::GRACE_PERIOD,
        }
    }

    pub fn install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = dir.into();
        self
    }

    pub fn console_name(mut self, name: impl Into<String>) -> Self {
        self.console_name = name.into();
        self
    }

    pub fn tray_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.tray_executable = Some(path.into());
        self
    }

    /// Set the Jackett data folder. The log directory follows it unless
    /// set explicitly.
    pub fn data_folder(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_folder = Some(dir.into());
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn signal_name(mut self, name: impl Into<String>) -> Self {
        self.signal_name = name.into();
        self
    }

    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    pub fn build(self) -> TrayConfig {
        let data_folder = self
            .data_folder
            .unwrap_or_else(|| self.install_dir.clone());
        let log_dir = self.log_dir.unwrap_or_else(|| data_folder.clone());
        let tray_executable = self
            .tray_executable
            .unwrap_or_else(|| self.install_dir.join(paths::executable_name("jackett-tray")));

        TrayConfig {
            install_dir: self.install_dir,
            console_name: self.console_name,
            tray_executable,
            data_folder,
            log_dir,
            service_name: self.service_name,
            signal_name: self.signal_name,
            grace_period: self.grace_period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_server_config_defaults_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.port, AppConfig::DEFAULT_PORT);
        assert_eq!(config.web_ui_url(), "http://127.0.0.1:9117");
    }

    #[test]
    fn test_server_config_reads_port() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("ServerConfig.json"),
            r#"{ "Port": 9200, "AllowExternal": false, "APIKey": "abc" }"#,
        )
        .unwrap();

        let config = ServerConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.port, 9200);
        assert_eq!(config.web_ui_url(), "http://127.0.0.1:9200");
    }

    #[test]
    fn test_server_config_tolerates_bom() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("ServerConfig.json"),
            "\u{feff}{\"Port\": 8080}",
        )
        .unwrap();

        assert_eq!(ServerConfig::load(temp_dir.path()).unwrap().port, 8080);
    }

    #[test]
    fn test_server_config_malformed_is_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("ServerConfig.json"), "{ not json").unwrap();

        let err = ServerConfig::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, TrayError::Config { .. }));
    }

    #[test]
    fn test_tray_config_defaults() {
        let config = TrayConfig::builder("/opt/jackett").build();

        assert_eq!(config.install_dir, PathBuf::from("/opt/jackett"));
        assert_eq!(config.data_folder, PathBuf::from("/opt/jackett"));
        assert_eq!(config.log_dir, config.data_folder);
        assert_eq!(config.grace_period, Duration::from_millis(1000));
        assert_eq!(config.service_name, ServiceConfig::default_name());
        assert!(config.log_file().ends_with("TrayLog.txt"));
    }

    #[test]
    fn test_console_path_has_platform_suffix() {
        let config = TrayConfig::builder("/opt/jackett").build();
        let expected = format!("JackettConsole{}", std::env::consts::EXE_SUFFIX);
        assert_eq!(config.console_path(), PathBuf::from("/opt/jackett").join(expected));
    }

    #[test]
    fn test_builder_overrides() {
        let config = TrayConfig::builder("/opt/jackett")
            .data_folder("/var/lib/jackett")
            .service_name("jackett-custom")
            .grace_period(Duration::from_millis(250))
            .build();

        assert_eq!(config.log_dir, PathBuf::from("/var/lib/jackett"));
        assert_eq!(config.service_name, "jackett-custom");
        assert_eq!(config.grace_period, Duration::from_millis(250));
    }
}
