use crate::controller::{ControllerSettings, SortDirection, SortField, SortOrder};
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use tracing::info;

fn current_settings(state: &AppState) -> anyhow::Result<ControllerSettings> {
    match state.session.as_ref() {
        Some(s) => Ok(s.settings.clone()),
        None => ControllerSettings::load(state.store.as_ref()),
    }
}

fn handle_controller_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match current_settings(state) {
        Ok(s) => ok(&req.id, json!(s)),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_controller_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };
    let mut settings = match current_settings(state) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(e) = settings.apply_patch(patch_obj) {
        return core_err(&req.id, &e);
    }
    if let Err(e) = settings.save(state.store.as_ref()) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    if let Some(session) = state.session.as_mut() {
        session.set_settings(settings.clone());
    }
    info!(fields = patch_obj.len(), "controller settings updated");
    ok(&req.id, json!(settings))
}

fn handle_sort_order_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.sort_order))
}

fn handle_sort_order_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let field = match required_str(req, "field") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let direction = match required_str(req, "direction") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let field = match field.to_ascii_lowercase().as_str() {
        "date" => SortField::Date,
        "leader" => SortField::Leader,
        "progress" => SortField::Progress,
        _ => {
            return err(
                &req.id,
                "bad_params",
                "field must be one of: date, leader, progress",
                None,
            )
        }
    };
    let direction = match direction.to_ascii_lowercase().as_str() {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        _ => return err(&req.id, "bad_params", "direction must be asc or desc", None),
    };
    let order = SortOrder { field, direction };
    if let Err(e) = order.save(state.store.as_ref()) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    state.sort_order = order;
    let booking_order = state
        .session
        .as_ref()
        .map(|s| order.sort_bookings(&s.snapshot().bookings));
    ok(
        &req.id,
        json!({
            "sortOrder": order,
            "bookingOrder": booking_order
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "controller.get" => Some(handle_controller_get(state, req)),
        "controller.update" => Some(handle_controller_update(state, req)),
        "sortOrder.get" => Some(handle_sort_order_get(state, req)),
        "sortOrder.set" => Some(handle_sort_order_set(state, req)),
        _ => None,
    }
}
