//! Lifecycle controller for the tray host.
//!
//! Every shutdown trigger (menu request, named signal, host termination
//! signal, child exit) and every child error line arrives as a
//! [`LifecycleEvent`] on one channel. [`LifecycleController::run`] is the
//! only consumer, and teardown is additionally guarded by an atomic
//! check-and-set, so it runs exactly once however the triggers interleave.

use crate::error::Result;
use crate::process::{LaunchConfig, ProcessHandle, ProcessLauncher};
use crate::service::ServiceProbe;
use crate::TrayContext;
use serde::Serialize;
use std::fmt;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Supervision state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No child; the service (if any) runs the server.
    Idle,
    ChildRunning,
    ShuttingDown,
    Exited,
}

/// What caused the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownTrigger {
    /// Menu or host request.
    Requested,
    /// Named signal or host termination signal.
    Signal,
    /// The supervised child exited on its own.
    ChildExited,
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShutdownTrigger::Requested => "requested",
            ShutdownTrigger::Signal => "signal",
            ShutdownTrigger::ChildExited => "child exited",
        };
        write!(f, "{}", s)
    }
}

/// Message delivered to the controller loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Shutdown(ShutdownTrigger),
    /// One line the child wrote to standard error.
    ErrorLine(String),
}

/// Cloneable handle for requesting shutdown from other threads.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
    initiated: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Request shutdown (menu "Shutdown" / "Close tray icon").
    pub fn request(&self) -> bool {
        self.trigger(ShutdownTrigger::Requested)
    }

    /// Deliver a shutdown trigger. Returns false if shutdown is already
    /// under way or the controller has gone.
    pub fn trigger(&self, trigger: ShutdownTrigger) -> bool {
        if self.initiated.load(Ordering::SeqCst) {
            debug!("Ignoring late shutdown trigger: {}", trigger);
            return false;
        }
        self.tx.send(LifecycleEvent::Shutdown(trigger)).is_ok()
    }

    /// Whether teardown has started.
    pub fn is_initiated(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct ExitOutcome {
    pub trigger: ShutdownTrigger,
    /// Exit status of the child, if one was supervised.
    pub child_status: Option<ExitStatus>,
    /// True when the child had to be killed after the grace period.
    pub forced: bool,
}

/// Owns the supervised child and drives shutdown.
pub struct LifecycleController {
    ctx: Arc<TrayContext>,
    probe: ServiceProbe,
    state_tx: watch::Sender<LifecycleState>,
    events_tx: mpsc::UnboundedSender<LifecycleEvent>,
    events_rx: mpsc::UnboundedReceiver<LifecycleEvent>,
    initiated: Arc<AtomicBool>,
    child: Option<ProcessHandle>,
}

impl LifecycleController {
    pub fn new(ctx: Arc<TrayContext>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(LifecycleState::Idle);
        Self {
            probe: ServiceProbe::new(Arc::clone(&ctx)),
            ctx,
            state_tx,
            events_tx,
            events_rx,
            initiated: Arc::new(AtomicBool::new(false)),
            child: None,
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.events_tx.clone(),
            initiated: Arc::clone(&self.initiated),
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> LifecycleState {
        *self.state_tx.borrow()
    }

    pub fn has_child(&self) -> bool {
        self.child.is_some()
    }

    /// PID of the supervised child, if any.
    pub fn child_pid(&self) -> Option<u32> {
        self.child.as_ref().map(ProcessHandle::pid)
    }

    /// Decide between tray-only mode and running the server as a child.
    ///
    /// When the service is not installed the console server is launched
    /// once. A spawn failure is shown to the user and returned; the
    /// controller stays Idle. Launching needs a Tokio runtime; without one
    /// this fails with [`TrayError::SpawnFailed`](crate::TrayError::SpawnFailed).
    pub fn start(&mut self) -> Result<()> {
        if self.child.is_some() {
            return Ok(());
        }

        let service = self.probe.state();
        if service.is_installed() {
            info!(
                "Jackett service is {}, running in tray-only mode",
                service
            );
            return Ok(());
        }

        let config = &self.ctx.config;
        let launch = LaunchConfig::new(config.console_path()).with_working_dir(&config.install_dir);
        let tx = self.events_tx.clone();

        match ProcessLauncher::launch(&launch, move |line| {
            let _ = tx.send(LifecycleEvent::ErrorLine(line));
        }) {
            Ok(child) => {
                info!("Jackett server running from tray (PID: {})", child.pid());
                self.child = Some(child);
                self.state_tx.send_replace(LifecycleState::ChildRunning);
                Ok(())
            }
            Err(e) => {
                error!("Failed to start Jackett server: {}", e);
                self.ctx
                    .surface
                    .show_error("Error", &format!("Failed to start Jackett: {}", e));
                Err(e)
            }
        }
    }

    /// Run until a shutdown trigger arrives, then tear down.
    pub async fn run(mut self) -> ExitOutcome {
        let trigger = loop {
            let event = match self.child.as_mut() {
                Some(child) => tokio::select! {
                    event = self.events_rx.recv() => event,
                    status = child.wait_exit() => {
                        match status {
                            Ok(status) => warn!("Jackett server exited with {}", status),
                            Err(e) => warn!("Lost track of Jackett server: {}", e),
                        }
                        Some(LifecycleEvent::Shutdown(ShutdownTrigger::ChildExited))
                    }
                },
                None => self.events_rx.recv().await,
            };

            match event {
                Some(LifecycleEvent::ErrorLine(line)) => error!("{}", line),
                Some(LifecycleEvent::Shutdown(trigger)) => break trigger,
                None => break ShutdownTrigger::Requested,
            }
        };

        if trigger == ShutdownTrigger::ChildExited {
            info!("Tray not responsible for process exit");
        }

        self.teardown(trigger).await
    }

    async fn teardown(&mut self, trigger: ShutdownTrigger) -> ExitOutcome {
        let mut outcome = ExitOutcome {
            trigger,
            child_status: None,
            forced: false,
        };

        if self.initiated.swap(true, Ordering::SeqCst) {
            debug!("Teardown already performed, ignoring {}", trigger);
            return outcome;
        }

        self.state_tx.send_replace(LifecycleState::ShuttingDown);
        info!("Close of tray application initiated ({})", trigger);

        self.ctx.surface.release();

        if let Some(child) = self.child.as_mut() {
            match child.terminate(self.ctx.config.grace_period).await {
                Ok(termination) => {
                    outcome.child_status = Some(termination.status);
                    outcome.forced = termination.forced;
                }
                Err(e) => error!("Failed to stop Jackett server: {}", e),
            }
        }

        // Drain error lines written during shutdown
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                LifecycleEvent::ErrorLine(line) => error!("{}", line),
                LifecycleEvent::Shutdown(late) => debug!("Ignoring late shutdown trigger: {}", late),
            }
        }

        self.state_tx.send_replace(LifecycleState::Exited);
        info!("Tray shut down");
        outcome
    }
}
