//! Shared fakes for integration tests.

#![allow(dead_code)]

use jackett_tray_core::{
    Platform, Result, ServerConfig, ServiceAction, ServiceState, TrayConfig, TrayContext,
    TrayError, UserSurface,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scriptable stand-in for the OS.
pub struct FakePlatform {
    pub state: Mutex<ServiceState>,
    pub elevated: bool,
    /// Whether direct service control succeeds.
    pub control_ok: bool,
    /// Whether the elevated console re-invocation succeeds.
    pub elevation_ok: bool,
    pub control_calls: Mutex<Vec<ServiceAction>>,
    pub elevated_calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    pub opened_urls: Mutex<Vec<String>>,
    pub autostart_dir: PathBuf,
}

impl FakePlatform {
    pub fn new(state: ServiceState, autostart_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: Mutex::new(state),
            elevated: false,
            control_ok: false,
            elevation_ok: false,
            control_calls: Mutex::new(Vec::new()),
            elevated_calls: Mutex::new(Vec::new()),
            opened_urls: Mutex::new(Vec::new()),
            autostart_dir: autostart_dir.into(),
        }
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock().unwrap()
    }

    fn apply(&self, action: ServiceAction) {
        *self.state.lock().unwrap() = match action {
            ServiceAction::Start => ServiceState::Running,
            ServiceAction::Stop => ServiceState::Stopped,
        };
    }
}

impl Platform for FakePlatform {
    fn query_service_state(&self, _service_name: &str) -> Result<ServiceState> {
        Ok(self.state())
    }

    fn control_service(&self, _service_name: &str, action: ServiceAction) -> Result<()> {
        self.control_calls.lock().unwrap().push(action);
        if self.control_ok {
            self.apply(action);
            Ok(())
        } else {
            Err(TrayError::PermissionDenied {
                operation: format!("{} service", action),
            })
        }
    }

    fn is_elevated(&self) -> bool {
        self.elevated
    }

    fn run_elevated(&self, program: &Path, args: &[&str]) -> Result<()> {
        self.elevated_calls.lock().unwrap().push((
            program.to_path_buf(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        if self.elevation_ok {
            let action = if args.contains(&"--Stop") {
                ServiceAction::Stop
            } else {
                ServiceAction::Start
            };
            self.apply(action);
            Ok(())
        } else {
            Err(TrayError::Other("elevation cancelled by user".into()))
        }
    }

    fn autostart_entry_path(&self) -> Result<PathBuf> {
        Ok(self.autostart_dir.join("jackett-tray.entry"))
    }

    fn create_autostart_entry(&self, target: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.autostart_dir)?;
        std::fs::write(
            self.autostart_entry_path()?,
            target.to_string_lossy().as_bytes(),
        )?;
        Ok(())
    }

    fn remove_autostart_entry(&self) -> Result<()> {
        let path = self.autostart_entry_path()?;
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        self.opened_urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Records notices and releases instead of showing them.
#[derive(Default)]
pub struct RecordingSurface {
    pub errors: Mutex<Vec<(String, String)>>,
    pub releases: AtomicUsize,
}

impl RecordingSurface {
    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl UserSurface for RecordingSurface {
    fn show_error(&self, title: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Config rooted at `install_dir` with a short grace period.
pub fn test_config(install_dir: &Path) -> TrayConfig {
    TrayConfig::builder(install_dir)
        .tray_executable(install_dir.join("jackett-tray"))
        .grace_period(Duration::from_millis(300))
        .build()
}

pub fn context(
    config: TrayConfig,
    platform: Arc<FakePlatform>,
    surface: Arc<RecordingSurface>,
) -> Arc<TrayContext> {
    Arc::new(TrayContext::new(
        config,
        ServerConfig::default(),
        platform,
        surface,
    ))
}

/// Install `target` as the console executable inside `install_dir`.
#[cfg(unix)]
pub fn install_console(install_dir: &Path, target: &Path) -> PathBuf {
    let console = install_dir.join("JackettConsole");
    std::os::unix::fs::symlink(target, &console).unwrap();
    console
}

/// First existing path among `candidates`.
pub fn find_binary(candidates: &[&str]) -> PathBuf {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .unwrap_or_else(|| panic!("none of {:?} found", candidates))
}
