//! Error types for the tray host.
//!
//! Every failure carries enough context (operation, target path, service
//! action) to be diagnosed from the tray log after the fact.

use crate::service::ServiceAction;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tray supervision core.
#[derive(Debug, Error)]
pub enum TrayError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Child process errors
    #[error("Failed to start {path}: {message}")]
    SpawnFailed { path: PathBuf, message: String },

    // Service manager errors
    #[error("Service {action} failed: {message}")]
    ServiceControl {
        action: ServiceAction,
        message: String,
    },

    #[error("Failed to get admin rights to {action} the service: {message}")]
    ElevationFailed {
        action: ServiceAction,
        message: String,
    },

    #[error("Permission denied: {operation}")]
    PermissionDenied { operation: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Shutdown signal errors
    #[error("Named signal {name}: {message}")]
    Signal { name: String, message: String },

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for tray operations.
pub type Result<T> = std::result::Result<T, TrayError>;

impl From<std::io::Error> for TrayError {
    fn from(err: std::io::Error) -> Self {
        TrayError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl TrayError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        TrayError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Whether the failure came from the current principal lacking rights.
    ///
    /// Callers use this to decide whether a re-invocation through the
    /// elevation helper is worth attempting.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            TrayError::PermissionDenied { .. } => true,
            TrayError::Io {
                source: Some(source),
                ..
            } => source.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrayError::SpawnFailed {
            path: PathBuf::from("/opt/jackett/JackettConsole"),
            message: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to start /opt/jackett/JackettConsole: No such file or directory"
        );

        let err = TrayError::ElevationFailed {
            action: ServiceAction::Stop,
            message: "cancelled".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to get admin rights to stop the service: cancelled"
        );
    }

    #[test]
    fn test_permission_denied_detection() {
        assert!(TrayError::PermissionDenied {
            operation: "sc stop".into()
        }
        .is_permission_denied());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(TrayError::io_with_path(io, "/etc/jackett").is_permission_denied());

        assert!(!TrayError::Other("boom".into()).is_permission_denied());
    }
}
