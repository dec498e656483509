//! Inter-process shutdown signal.
//!
//! An uninstaller or updater raises the named signal to ask a running tray
//! to shut down. The tray blocks a dedicated thread on it.
//!
//! # Platform Behavior
//! - **Windows**: named manual-reset event; `wait` resets it, then waits
//! - **Unix**: FIFO in the runtime directory; `raise` writes one byte

use crate::error::{Result, TrayError};
use crate::lifecycle::{ShutdownHandle, ShutdownTrigger};
use std::thread::JoinHandle;
use tracing::{debug, error, info};

#[cfg(unix)]
use std::path::{Path, PathBuf};

/// A system-wide named signal.
#[derive(Debug, Clone)]
pub struct NamedSignal {
    name: String,
    #[cfg(unix)]
    path: PathBuf,
}

impl NamedSignal {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        #[cfg(unix)]
        {
            let file_name: String = name
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                .collect();
            let path = crate::platform::paths::runtime_dir().join(format!("{}.signal", file_name));
            Self { name, path }
        }
        #[cfg(not(unix))]
        {
            Self { name }
        }
    }

    /// Use an explicit FIFO location.
    #[cfg(unix)]
    pub fn at_path(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(unix)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, message: impl Into<String>) -> TrayError {
        TrayError::Signal {
            name: self.name.clone(),
            message: message.into(),
        }
    }

    /// Create the underlying OS object so a raise can reach the listener.
    #[cfg(unix)]
    pub fn prepare(&self) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::stat::Mode;
        use std::os::unix::fs::FileTypeExt;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TrayError::io_with_path(e, parent))?;
        }

        match nix::unistd::mkfifo(&self.path, Mode::S_IRUSR | Mode::S_IWUSR) {
            Ok(()) => {
                debug!("Created signal FIFO {}", self.path.display());
                Ok(())
            }
            Err(Errno::EEXIST) => {
                let meta = std::fs::symlink_metadata(&self.path)
                    .map_err(|e| TrayError::io_with_path(e, &self.path))?;
                if meta.file_type().is_fifo() {
                    Ok(())
                } else {
                    Err(self.error(format!("{} exists and is not a FIFO", self.path.display())))
                }
            }
            Err(e) => Err(self.error(format!("mkfifo {}: {}", self.path.display(), e))),
        }
    }

    #[cfg(not(unix))]
    pub fn prepare(&self) -> Result<()> {
        Ok(())
    }

    /// Block the calling thread until the signal is raised.
    #[cfg(unix)]
    pub fn wait(&self) -> Result<()> {
        use std::io::{ErrorKind, Read};

        self.prepare()?;
        let mut buf = [0u8; 16];
        loop {
            // Blocks until a writer opens the other end
            let mut fifo = match std::fs::File::open(&self.path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TrayError::io_with_path(e, &self.path)),
            };
            match fifo.read(&mut buf) {
                Ok(n) if n > 0 => break,
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TrayError::io_with_path(e, &self.path)),
            }
        }

        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("Could not remove {}: {}", self.path.display(), e);
        }
        Ok(())
    }

    /// Raise the signal. Returns false when nobody is listening.
    #[cfg(unix)]
    pub fn raise(&self) -> Result<bool> {
        use std::io::{ErrorKind, Write};
        use std::os::unix::fs::OpenOptionsExt;

        let opened = std::fs::OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path);

        let mut fifo = match opened {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) if e.raw_os_error() == Some(libc::ENXIO) => return Ok(false),
            Err(e) => return Err(TrayError::io_with_path(e, &self.path)),
        };
        fifo.write_all(b"1")
            .map_err(|e| TrayError::io_with_path(e, &self.path))?;
        debug!("Raised signal {}", self.name);
        Ok(true)
    }

    #[cfg(windows)]
    pub fn wait(&self) -> Result<()> {
        let event = win::Event::create(&self.name).map_err(|e| self.error(e))?;
        event.reset().map_err(|e| self.error(e))?;
        event.wait().map_err(|e| self.error(e))
    }

    #[cfg(windows)]
    pub fn raise(&self) -> Result<bool> {
        match win::Event::open(&self.name) {
            Some(event) => {
                event.set().map_err(|e| self.error(e))?;
                debug!("Raised signal {}", self.name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[cfg(not(any(unix, windows)))]
    pub fn wait(&self) -> Result<()> {
        Err(TrayError::Unsupported(format!("named signal {}", self.name)))
    }

    #[cfg(not(any(unix, windows)))]
    pub fn raise(&self) -> Result<bool> {
        Err(TrayError::Unsupported(format!("named signal {}", self.name)))
    }
}

/// Waits on a [`NamedSignal`] and turns it into a shutdown trigger.
pub struct SignalListener;

impl SignalListener {
    /// Start listening on a dedicated thread.
    ///
    /// The thread lives until the signal fires or the process exits.
    pub fn spawn(signal: NamedSignal, shutdown: ShutdownHandle) -> Result<JoinHandle<()>> {
        signal.prepare()?;
        let name = signal.name().to_string();

        std::thread::Builder::new()
            .name("shutdown-signal".to_string())
            .spawn(move || match signal.wait() {
                Ok(()) => {
                    info!("Shutdown signal {} received", signal.name());
                    shutdown.trigger(ShutdownTrigger::Signal);
                }
                Err(e) => error!("Listening for shutdown signal failed: {}", e),
            })
            .map_err(|e| TrayError::Signal {
                name,
                message: format!("spawn listener thread: {}", e),
            })
    }
}

#[cfg(windows)]
#[allow(unsafe_code)]
mod win {
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
    use windows_sys::Win32::System::Threading::{
        CreateEventW, OpenEventW, ResetEvent, SetEvent, WaitForSingleObject, EVENT_MODIFY_STATE,
        INFINITE,
    };

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// Owned event handle, closed on drop.
    pub struct Event(HANDLE);

    impl Event {
        pub fn create(name: &str) -> Result<Self, String> {
            let name = wide(name);
            // SAFETY: name is NUL-terminated and outlives the call; null
            // security attributes request the default descriptor.
            let handle = unsafe { CreateEventW(std::ptr::null(), 1, 0, name.as_ptr()) };
            if handle.is_null() {
                return Err(format!("CreateEventW: {}", std::io::Error::last_os_error()));
            }
            Ok(Self(handle))
        }

        pub fn open(name: &str) -> Option<Self> {
            let name = wide(name);
            // SAFETY: name is NUL-terminated and outlives the call.
            let handle = unsafe { OpenEventW(EVENT_MODIFY_STATE, 0, name.as_ptr()) };
            if handle.is_null() {
                None
            } else {
                Some(Self(handle))
            }
        }

        pub fn reset(&self) -> Result<(), String> {
            // SAFETY: self.0 is a valid event handle owned by this struct.
            if unsafe { ResetEvent(self.0) } == 0 {
                return Err(format!("ResetEvent: {}", std::io::Error::last_os_error()));
            }
            Ok(())
        }

        pub fn set(&self) -> Result<(), String> {
            // SAFETY: self.0 is a valid event handle owned by this struct.
            if unsafe { SetEvent(self.0) } == 0 {
                return Err(format!("SetEvent: {}", std::io::Error::last_os_error()));
            }
            Ok(())
        }

        pub fn wait(&self) -> Result<(), String> {
            // SAFETY: self.0 is a valid event handle owned by this struct.
            let rc = unsafe { WaitForSingleObject(self.0, INFINITE) };
            if rc != WAIT_OBJECT_0 {
                return Err(format!(
                    "WaitForSingleObject returned {}: {}",
                    rc,
                    std::io::Error::last_os_error()
                ));
            }
            Ok(())
        }
    }

    impl Drop for Event {
        fn drop(&mut self) {
            // SAFETY: the handle is valid and closed exactly once.
            unsafe {
                CloseHandle(self.0);
            }
        }
    }
}
