//! Tray menu model and its actions.
//!
//! The model is rebuilt every time the menu opens, from the live service
//! state and autostart entry. Rendering is left to the host.

use crate::autostart::AutoStart;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::lifecycle::ShutdownHandle;
use crate::platform;
use crate::service::{ServiceProbe, ServiceState};
use crate::TrayContext;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Something the user can pick from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    OpenWebUi,
    ToggleService,
    ToggleAutostart,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// `None` for informational lines.
    pub action: Option<MenuAction>,
    pub label: String,
    pub enabled: bool,
    /// Check state for toggle items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl MenuItem {
    fn action(action: MenuAction, label: impl Into<String>) -> Self {
        Self {
            action: Some(action),
            label: label.into(),
            enabled: true,
            checked: None,
        }
    }

    fn info(label: impl Into<String>) -> Self {
        Self {
            action: None,
            label: label.into(),
            enabled: false,
            checked: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuModel {
    pub web_ui_url: String,
    pub service: ServiceState,
    pub items: Vec<MenuItem>,
}

impl MenuModel {
    /// Build the menu for the given service state.
    ///
    /// `autostart` is `None` where autostart entries are unsupported, which
    /// hides the toggle.
    pub fn build(service: ServiceState, autostart: Option<bool>, server: &ServerConfig) -> Self {
        let mut items = Vec::new();

        let mut web_ui = MenuItem::action(MenuAction::OpenWebUi, "Open Web UI");
        web_ui.enabled = service != ServiceState::Stopped;
        items.push(web_ui);

        if service.is_installed() {
            let (status, control) = if service == ServiceState::Running {
                (
                    "Jackett is running as a background service",
                    "Stop background service",
                )
            } else {
                (
                    "Jackett will run as a background service",
                    "Start background service",
                )
            };
            items.push(MenuItem::info(status));
            items.push(MenuItem::action(MenuAction::ToggleService, control));
        }

        if let Some(enabled) = autostart {
            let label = if cfg!(windows) {
                "Start with Windows"
            } else {
                "Start at login"
            };
            let mut item = MenuItem::action(MenuAction::ToggleAutostart, label);
            item.checked = Some(enabled);
            items.push(item);
        }

        let shutdown = if service.is_installed() {
            "Close tray icon"
        } else {
            "Shutdown"
        };
        items.push(MenuItem::action(MenuAction::Shutdown, shutdown));

        Self {
            web_ui_url: server.web_ui_url(),
            service,
            items,
        }
    }

    pub fn find(&self, action: MenuAction) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.action == Some(action))
    }
}

/// Executes menu actions against the live system.
///
/// `Shutdown` reaches a controller only when one is attached with
/// [`TrayActions::with_shutdown`]; one-shot hosts leave it detached.
pub struct TrayActions {
    ctx: Arc<TrayContext>,
    probe: ServiceProbe,
    autostart: AutoStart,
    shutdown: Option<ShutdownHandle>,
}

impl TrayActions {
    pub fn new(ctx: Arc<TrayContext>) -> Self {
        Self {
            probe: ServiceProbe::new(Arc::clone(&ctx)),
            autostart: AutoStart::new(&ctx),
            ctx,
            shutdown: None,
        }
    }

    /// Route `Shutdown` to a running controller.
    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Current menu model.
    pub fn menu(&self) -> MenuModel {
        let autostart = platform::autostart_supported().then(|| self.autostart.is_enabled());
        MenuModel::build(self.probe.state(), autostart, &self.ctx.server)
    }

    /// Run a menu action.
    pub fn invoke(&self, action: MenuAction) -> Result<()> {
        info!("Menu action: {:?}", action);
        match action {
            MenuAction::OpenWebUi => self.open_web_ui(),
            MenuAction::ToggleService => self.probe.toggle().map(|_| ()),
            MenuAction::ToggleAutostart => self.autostart.toggle().map(|_| ()),
            MenuAction::Shutdown => {
                match &self.shutdown {
                    Some(shutdown) => {
                        if !shutdown.request() {
                            warn!("Shutdown already in progress");
                        }
                    }
                    None => warn!("No running tray to shut down"),
                }
                Ok(())
            }
        }
    }

    pub fn open_web_ui(&self) -> Result<()> {
        let url = self.ctx.server.web_ui_url();
        self.ctx.platform.open_url(&url).map_err(|e| {
            self.ctx
                .surface
                .show_error("Error", &format!("Failed to open {}: {}", url, e));
            e
        })
    }
}
