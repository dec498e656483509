//! Service probe, autostart and menu action tests against a fake platform.

mod common;

use common::{context, test_config, FakePlatform, RecordingSurface};
use jackett_tray_core::{
    AutoStart, LifecycleController, MenuAction, Platform, ServiceAction, ServiceProbe,
    ServiceState, TrayActions, TrayContext, TrayError,
};
use jackett_tray_core::platform::paths::executable_name;
use std::sync::Arc;
use tempfile::TempDir;

fn setup(
    platform: FakePlatform,
) -> (TempDir, Arc<FakePlatform>, Arc<RecordingSurface>, Arc<TrayContext>) {
    let temp_dir = TempDir::new().unwrap();
    let platform = Arc::new(platform);
    let surface = Arc::new(RecordingSurface::default());
    let ctx = context(
        test_config(temp_dir.path()),
        Arc::clone(&platform),
        Arc::clone(&surface),
    );
    (temp_dir, platform, surface, ctx)
}

fn fake(state: ServiceState) -> FakePlatform {
    let autostart_dir = std::env::temp_dir().join("unused-autostart");
    FakePlatform::new(state, autostart_dir)
}

#[test]
fn test_probe_reports_state() {
    let (_dir, platform, _surface, ctx) = setup(fake(ServiceState::Stopped));
    let probe = ServiceProbe::new(ctx);

    assert!(probe.exists());
    assert!(!probe.is_running());

    *platform.state.lock().unwrap() = ServiceState::NotInstalled;
    assert!(!probe.exists());
    assert_eq!(probe.state(), ServiceState::NotInstalled);
}

#[test]
fn test_direct_control_when_privileged() {
    let mut platform = fake(ServiceState::Running);
    platform.elevated = true;
    platform.control_ok = true;
    let (_dir, platform, surface, ctx) = setup(platform);
    let probe = ServiceProbe::new(ctx);

    probe.stop().unwrap();

    assert_eq!(platform.state(), ServiceState::Stopped);
    assert_eq!(*platform.control_calls.lock().unwrap(), vec![ServiceAction::Stop]);
    assert!(platform.elevated_calls.lock().unwrap().is_empty());
    assert!(surface.errors().is_empty());
}

#[test]
fn test_unprivileged_stop_falls_back_to_elevated_console() {
    let mut platform = fake(ServiceState::Running);
    platform.elevation_ok = true;
    let (dir, platform, surface, ctx) = setup(platform);
    let probe = ServiceProbe::new(ctx);

    probe.stop().unwrap();

    let calls = platform.elevated_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, dir.path().join(executable_name("JackettConsole")));
    assert_eq!(calls[0].1, vec!["--Stop".to_string()]);
    assert_eq!(platform.state(), ServiceState::Stopped);
    assert!(surface.errors().is_empty());
}

#[test]
fn test_failed_elevation_shows_notice_and_keeps_state() {
    let (_dir, platform, surface, ctx) = setup(fake(ServiceState::Running));
    let probe = ServiceProbe::new(ctx);

    let err = probe.stop().unwrap_err();
    assert!(matches!(
        err,
        TrayError::ElevationFailed {
            action: ServiceAction::Stop,
            ..
        }
    ));

    // One direct attempt, one elevated attempt, no retry
    assert_eq!(platform.control_calls.lock().unwrap().len(), 1);
    assert_eq!(platform.elevated_calls.lock().unwrap().len(), 1);
    assert_eq!(platform.state(), ServiceState::Running);

    let errors = surface.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "Error");
    assert_eq!(errors[0].1, "Failed to get admin rights to stop the service.");
}

#[test]
fn test_toggle_starts_stopped_service() {
    let mut platform = fake(ServiceState::Stopped);
    platform.elevation_ok = true;
    let (_dir, platform, _surface, ctx) = setup(platform);
    let probe = ServiceProbe::new(ctx);

    assert_eq!(probe.toggle().unwrap(), ServiceAction::Start);
    assert_eq!(platform.state(), ServiceState::Running);
    assert_eq!(
        platform.elevated_calls.lock().unwrap()[0].1,
        vec!["--Start".to_string()]
    );
}

#[test]
fn test_autostart_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let autostart_dir = temp_dir.path().join("autostart");
    let (_dir, platform, _surface, ctx) =
        setup(FakePlatform::new(ServiceState::NotInstalled, &autostart_dir));
    let autostart = AutoStart::new(&ctx);

    assert!(!autostart.is_enabled());
    assert!(autostart.set(true).unwrap());
    assert!(!autostart.set(true).unwrap());
    assert!(autostart.is_enabled());
    assert_eq!(std::fs::read_dir(&autostart_dir).unwrap().count(), 1);

    let entry = std::fs::read_to_string(platform.autostart_entry_path().unwrap()).unwrap();
    assert!(entry.ends_with("jackett-tray"));

    assert!(autostart.set(false).unwrap());
    assert!(!autostart.set(false).unwrap());
    assert!(!autostart.is_enabled());

    assert!(autostart.toggle().unwrap());
    assert!(autostart.is_enabled());
}

#[test]
fn test_menu_actions() {
    let temp_dir = TempDir::new().unwrap();
    let mut platform = FakePlatform::new(ServiceState::Running, temp_dir.path().join("autostart"));
    platform.elevation_ok = true;
    let (_dir, platform, _surface, ctx) = setup(platform);

    let controller = LifecycleController::new(Arc::clone(&ctx));
    let shutdown = controller.shutdown_handle();
    let actions = TrayActions::new(ctx).with_shutdown(shutdown.clone());

    actions.invoke(MenuAction::OpenWebUi).unwrap();
    assert_eq!(
        *platform.opened_urls.lock().unwrap(),
        vec!["http://127.0.0.1:9117".to_string()]
    );

    actions.invoke(MenuAction::ToggleService).unwrap();
    assert_eq!(platform.state(), ServiceState::Stopped);

    let menu = actions.menu();
    assert!(!menu.find(MenuAction::OpenWebUi).unwrap().enabled);
    assert_eq!(
        menu.find(MenuAction::ToggleService).unwrap().label,
        "Start background service"
    );

    actions.invoke(MenuAction::Shutdown).unwrap();
    assert!(!shutdown.is_initiated());
}

#[test]
fn test_menu_actions_without_controller() {
    let temp_dir = TempDir::new().unwrap();
    let platform = FakePlatform::new(ServiceState::NotInstalled, temp_dir.path().join("autostart"));
    let (_dir, platform, surface, ctx) = setup(platform);

    let actions = TrayActions::new(ctx);

    let menu = actions.menu();
    assert_eq!(menu.find(MenuAction::Shutdown).unwrap().label, "Shutdown");

    actions.invoke(MenuAction::OpenWebUi).unwrap();
    assert_eq!(platform.opened_urls.lock().unwrap().len(), 1);

    // Nothing to shut down; not an error and nothing shown
    actions.invoke(MenuAction::Shutdown).unwrap();
    assert!(surface.errors().is_empty());
}
