use crate::controller::{ControllerSettings, SortOrder};
use crate::db::SqliteSettingsStore;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "sessionLoaded": state.session.is_some()
        }),
    )
}

/// Opens the workspace store and pulls saved preferences into the process.
pub fn select_workspace(state: &mut AppState, path: PathBuf) -> anyhow::Result<()> {
    let store = SqliteSettingsStore::open(&path)?;
    // Stored preferences that no longer parse fall back to defaults; they must not
    // keep the workspace from opening.
    let settings = ControllerSettings::load(&store).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable controller settings");
        ControllerSettings::default()
    });
    state.sort_order = SortOrder::load(&store).unwrap_or_default();
    if let Some(session) = state.session.as_mut() {
        session.set_settings(settings);
    }
    state.store = Box::new(store);
    info!(workspace = %path.to_string_lossy(), "workspace selected");
    state.workspace = Some(path);
    Ok(())
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match select_workspace(state, path.clone()) {
        Ok(()) => ok(&req.id, json!({ "workspacePath": path.to_string_lossy() })),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
