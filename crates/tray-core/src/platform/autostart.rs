//! Platform-specific autostart entries.
//!
//! # Platform Behavior
//! - **Windows**: `Jackett.lnk` shortcut in the user's Startup folder
//! - **Linux**: `jackett-tray.desktop` in `~/.config/autostart`
//! - **Other**: unsupported

use crate::config::{AppConfig, AutostartConfig};
use crate::error::{Result, TrayError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Path of the autostart entry inside an autostart directory.
pub fn entry_path(autostart_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        autostart_dir.join(AutostartConfig::WINDOWS_SHORTCUT_NAME)
    } else {
        autostart_dir.join(AutostartConfig::DESKTOP_ENTRY_NAME)
    }
}

/// Create the autostart entry pointing at `target`.
pub fn create_entry(autostart_dir: &Path, target: &Path) -> Result<()> {
    let path = entry_path(autostart_dir);

    #[cfg(target_os = "windows")]
    {
        create_shortcut(&path, target)?;
    }

    #[cfg(target_os = "linux")]
    {
        use super::desktop_entry::{quote_exec, DesktopEntry};

        DesktopEntry::builder()
            .name(AppConfig::APP_NAME)
            .comment("Start the Jackett tray at login")
            .exec(quote_exec(target))
            .terminal(false)
            .no_display(true)
            .build()
            .write_to_file(&path)?;
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        return Err(TrayError::Unsupported(format!(
            "autostart entry for {}",
            target.display()
        )));
    }

    info!(
        "Created autostart entry {} -> {}",
        path.display(),
        target.display()
    );
    Ok(())
}

/// Remove the autostart entry.
pub fn remove_entry(autostart_dir: &Path) -> Result<()> {
    let path = entry_path(autostart_dir);
    if path.exists() {
        fs::remove_file(&path).map_err(|e| TrayError::Io {
            message: "remove autostart entry".to_string(),
            path: Some(path.clone()),
            source: Some(e),
        })?;
        info!("Removed autostart entry {}", path.display());
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn create_shortcut(path: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TrayError::io_with_path(e, parent))?;
    }

    let shortcut = lnk::ShellLink::new_simple(target).map_err(|e| TrayError::Io {
        message: format!("build shortcut to {}: {:?}", target.display(), e),
        path: Some(path.to_path_buf()),
        source: None,
    })?;
    shortcut.save(path).map_err(|e| TrayError::Io {
        message: format!("save {} shortcut: {:?}", AppConfig::APP_NAME, e),
        path: Some(path.to_path_buf()),
        source: None,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(target_os = "linux")]
    #[test]
    fn test_create_and_remove_entry() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("autostart");
        let target = PathBuf::from("/opt/jackett/jackett-tray");

        create_entry(&dir, &target).unwrap();
        let path = entry_path(&dir);
        assert!(path.ends_with("jackett-tray.desktop"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Exec=/opt/jackett/jackett-tray"));

        remove_entry(&dir).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_missing_entry_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        assert!(remove_entry(temp_dir.path()).is_ok());
    }
}
