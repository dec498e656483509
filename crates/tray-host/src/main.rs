//! Jackett Tray - resident host that supervises the Jackett server.
//!
//! Without a subcommand the tray runs resident: it starts the console
//! server as a child when no OS service is installed and waits for a
//! shutdown trigger. The subcommands expose the tray's menu actions and
//! the inter-process shutdown signal from the command line.

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jackett_tray_core::{
    AutoStart, LifecycleController, LogSurface, MenuAction, NamedSignal, NativePlatform,
    ServerConfig, ServiceProbe, ShutdownHandle, ShutdownTrigger, SignalListener, TrayActions,
    TrayConfig, TrayContext,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "jackett-tray")]
#[command(about = "Tray host for the Jackett server", version)]
struct Args {
    /// Directory containing JackettConsole (defaults to this executable's directory)
    #[arg(long, global = true)]
    install_dir: Option<PathBuf>,

    /// Jackett data folder holding ServerConfig.json
    #[arg(long, global = true)]
    data_folder: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run resident (default)
    Run,
    /// Ask a running tray to shut down
    Signal,
    /// Control the Jackett background service
    Service {
        #[command(subcommand)]
        action: ServiceCommand,
    },
    /// Start the tray at login
    Autostart {
        #[command(subcommand)]
        action: AutostartCommand,
    },
    /// Open the web UI in the browser
    Open,
    /// Print the tray menu as JSON
    Menu,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ServiceCommand {
    Start,
    Stop,
    Toggle,
    Status,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum AutostartCommand {
    On,
    Off,
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    let _log_guard = logging::init(&config.log_dir, args.debug);

    info!("Starting Jackett Tray v{}", env!("CARGO_PKG_VERSION"));
    info!("Install directory: {}", config.install_dir.display());

    let server = load_server_config(&config.data_folder);
    let ctx = Arc::new(TrayContext::new(
        config,
        server,
        NativePlatform::shared(),
        Arc::new(LogSurface::new()),
    ));

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(ctx).await,
        Command::Signal => raise_signal(&ctx),
        Command::Service { action } => service(ctx, action),
        Command::Autostart { action } => autostart(&ctx, action),
        Command::Open => {
            TrayActions::new(ctx).invoke(MenuAction::OpenWebUi)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Menu => {
            let menu = TrayActions::new(ctx).menu();
            println!("{}", serde_json::to_string_pretty(&menu)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Build the tray configuration from the environment and CLI overrides.
fn resolve_config(args: &Args) -> Result<TrayConfig> {
    let detected = TrayConfig::from_environment().context("Failed to resolve tray paths")?;

    let install_dir = args.install_dir.clone().unwrap_or(detected.install_dir);
    let data_folder = args.data_folder.clone().unwrap_or(detected.data_folder);

    Ok(TrayConfig::builder(install_dir)
        .tray_executable(detected.tray_executable)
        .data_folder(data_folder)
        .build())
}

/// Load `ServerConfig.json`, falling back to the default port.
fn load_server_config(data_folder: &Path) -> ServerConfig {
    ServerConfig::load(data_folder).unwrap_or_else(|e| {
        warn!("{}; using default port", e);
        ServerConfig::default()
    })
}

/// Resident mode.
async fn run(ctx: Arc<TrayContext>) -> Result<ExitCode> {
    let mut controller = LifecycleController::new(Arc::clone(&ctx));
    if let Err(e) = controller.start() {
        error!("Jackett Tray cannot continue: {}", e);
        return Ok(ExitCode::FAILURE);
    }

    let shutdown = controller.shutdown_handle();

    let signal = NamedSignal::new(&ctx.config.signal_name);
    if let Err(e) = SignalListener::spawn(signal, shutdown.clone()) {
        warn!("Shutdown signal unavailable: {}", e);
    }
    tokio::spawn(forward_termination(shutdown));

    let outcome = controller.run().await;
    info!(
        "Jackett Tray exiting (trigger: {}, forced: {})",
        outcome.trigger, outcome.forced
    );
    Ok(ExitCode::SUCCESS)
}

/// Route Ctrl-C and SIGTERM into the controller.
async fn forward_termination(shutdown: ShutdownHandle) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Termination signal received");
    shutdown.trigger(ShutdownTrigger::Signal);
}

fn raise_signal(ctx: &TrayContext) -> Result<ExitCode> {
    let signal = NamedSignal::new(&ctx.config.signal_name);
    if signal.raise()? {
        info!("Shutdown signal sent to running tray");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("No running tray is listening on {}", signal.name());
        Ok(ExitCode::FAILURE)
    }
}

fn service(ctx: Arc<TrayContext>, action: ServiceCommand) -> Result<ExitCode> {
    let probe = ServiceProbe::new(ctx);
    match action {
        ServiceCommand::Start => probe.start()?,
        ServiceCommand::Stop => probe.stop()?,
        ServiceCommand::Toggle => {
            let issued = probe.toggle()?;
            info!("Issued service {}", issued);
        }
        ServiceCommand::Status => println!("{}", probe.state()),
    }
    Ok(ExitCode::SUCCESS)
}

fn autostart(ctx: &TrayContext, action: AutostartCommand) -> Result<ExitCode> {
    let autostart = AutoStart::new(ctx);
    match action {
        AutostartCommand::On => {
            autostart.set(true)?;
        }
        AutostartCommand::Off => {
            autostart.set(false)?;
        }
        AutostartCommand::Status => {
            println!("{}", if autostart.is_enabled() { "on" } else { "off" });
        }
    }
    Ok(ExitCode::SUCCESS)
}
