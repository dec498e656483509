//! Process launching functionality.

use crate::error::{Result, TrayError};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Windows process creation flag suppressing the console window.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Configuration for launching a supervised process.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Path to the executable.
    pub executable: PathBuf,
    /// Arguments to pass.
    pub args: Vec<String>,
    /// Working directory; defaults to the executable's directory.
    pub working_dir: Option<PathBuf>,
    /// Suppress the console window on Windows.
    pub no_window: bool,
}

impl LaunchConfig {
    /// Launch `executable` with no arguments and no window.
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
            args: vec![],
            working_dir: None,
            no_window: true,
        }
    }

    /// Set the arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the working directory.
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    fn resolved_working_dir(&self) -> Option<PathBuf> {
        self.working_dir.clone().or_else(|| {
            self.executable
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
        })
    }
}

/// How a supervised process ended during teardown.
#[derive(Debug, Clone, Copy)]
pub struct Termination {
    /// Exit status reported by the OS.
    pub status: ExitStatus,
    /// True when the grace period elapsed and the process was killed.
    pub forced: bool,
}

/// Launches supervised child processes.
pub struct ProcessLauncher;

impl ProcessLauncher {
    /// Start the console server at `executable`.
    ///
    /// Every non-empty line the child writes to standard error is passed to
    /// `on_error_line`.
    pub fn start<F>(executable: impl AsRef<Path>, on_error_line: F) -> Result<ProcessHandle>
    where
        F: Fn(String) + Send + 'static,
    {
        Self::launch(&LaunchConfig::new(executable), on_error_line)
    }

    /// Launch a process from an explicit configuration.
    ///
    /// Must be called from within a Tokio runtime, which drives the child
    /// and its stderr reader. Outside one this returns
    /// [`TrayError::SpawnFailed`] without starting anything.
    pub fn launch<F>(config: &LaunchConfig, on_error_line: F) -> Result<ProcessHandle>
    where
        F: Fn(String) + Send + 'static,
    {
        let executable = &config.executable;
        if !executable.is_file() {
            return Err(TrayError::SpawnFailed {
                path: executable.clone(),
                message: "executable not found".to_string(),
            });
        }

        let runtime = Handle::try_current().map_err(|e| TrayError::SpawnFailed {
            path: executable.clone(),
            message: format!("no async runtime: {}", e),
        })?;

        let mut cmd = Command::new(executable);
        cmd.args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = config.resolved_working_dir() {
            cmd.current_dir(dir);
        }

        #[cfg(windows)]
        if config.no_window {
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        debug!("Launching: {:?} {:?}", executable, config.args);

        let mut child = cmd.spawn().map_err(|e| TrayError::SpawnFailed {
            path: executable.clone(),
            message: e.to_string(),
        })?;

        let pid = child.id().unwrap_or(0);
        // Held by the handle so waiting on the child does not close it
        let stdin = child.stdin.take();

        if let Some(stderr) = child.stderr.take() {
            runtime.spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => {
                            if !line.trim().is_empty() {
                                on_error_line(line);
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            debug!("Stopped reading child stderr: {}", e);
                            break;
                        }
                    }
                }
            });
        }

        info!("Started {} (PID: {})", executable.display(), pid);

        Ok(ProcessHandle {
            child,
            stdin,
            pid,
            executable: executable.clone(),
            exit_status: None,
        })
    }
}

/// A running supervised child.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    stdin: Option<ChildStdin>,
    pid: u32,
    executable: PathBuf,
    exit_status: Option<ExitStatus>,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Close the child's standard input. The console server treats EOF as
    /// a request to shut down.
    pub fn close_input(&mut self) {
        if self.stdin.take().is_some() {
            debug!("Closed input of PID {}", self.pid);
        }
    }

    /// Whether the child has exited, without blocking.
    pub fn has_exited(&mut self) -> bool {
        if self.exit_status.is_some() {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exit_status = Some(status);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to poll PID {}: {}", self.pid, e);
                false
            }
        }
    }

    /// Wait for the child to exit.
    ///
    /// Cancel-safe; resolves immediately once the exit has been observed.
    pub async fn wait_exit(&mut self) -> Result<ExitStatus> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }
        let status = self.child.wait().await?;
        self.exit_status = Some(status);
        Ok(status)
    }

    /// Kill the child immediately and reap it.
    pub async fn kill(&mut self) -> Result<ExitStatus> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }
        if let Err(e) = self.child.start_kill() {
            // Already reaped between checks
            debug!("Kill of PID {} reported: {}", self.pid, e);
        }
        self.wait_exit().await
    }

    /// Close input, wait up to `grace`, then kill if still alive.
    pub async fn terminate(&mut self, grace: Duration) -> Result<Termination> {
        self.close_input();

        match tokio::time::timeout(grace, self.wait_exit()).await {
            Ok(status) => {
                let status = status?;
                info!(
                    "{} (PID {}) exited with {}",
                    self.executable.display(),
                    self.pid,
                    status
                );
                Ok(Termination {
                    status,
                    forced: false,
                })
            }
            Err(_) => {
                warn!(
                    "{} (PID {}) still alive after {:?}, killing",
                    self.executable.display(),
                    self.pid,
                    grace
                );
                let status = self.kill().await?;
                Ok(Termination {
                    status,
                    forced: true,
                })
            }
        }
    }
}
