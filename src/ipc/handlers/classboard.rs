use crate::calc::{booking_completion, booking_progress_bar, booking_status};
use crate::controller::{ClassboardSession, ControllerSettings};
use crate::duration::parse_date;
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::{
    optional_str, required_bool, required_date, required_str, session, session_mut,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{EventStatus, Snapshot};
use serde_json::json;
use tracing::warn;

pub fn queues_json(session: &ClassboardSession) -> serde_json::Value {
    let summaries: Vec<_> = session
        .queues()
        .values()
        .map(|q| q.summary(&session.settings))
        .collect();
    json!(summaries)
}

fn handle_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let date = match required_date(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let snapshot: Snapshot = match serde_json::from_value(req.params.clone()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", format!("snapshot: {}", e), None),
    };
    let settings = ControllerSettings::load(state.store.as_ref()).unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable controller settings");
        ControllerSettings::default()
    });
    let session = match ClassboardSession::load(snapshot, date, settings) {
        Ok(s) => s,
        Err(e) => return core_err(&req.id, &e),
    };
    let booking_order = state.sort_order.sort_bookings(&session.snapshot().bookings);
    let result = json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "adjustmentMode": session.adjustment_mode,
        "settings": session.settings,
        "queues": queues_json(&session),
        "bookingOrder": booking_order
    });
    state.session = Some(session);
    ok(&req.id, result)
}

fn handle_set_date(state: &mut AppState, req: &Request) -> serde_json::Value {
    let date = match required_date(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = match session_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    s.set_date(date);
    ok(
        &req.id,
        json!({ "date": date.format("%Y-%m-%d").to_string(), "queues": queues_json(s) }),
    )
}

fn handle_adjustment_mode(state: &mut AppState, req: &Request) -> serde_json::Value {
    let enabled = match required_bool(req, "enabled") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = match session_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    s.set_adjustment_mode(enabled);
    ok(&req.id, json!({ "adjustmentMode": s.adjustment_mode }))
}

fn handle_queues(state: &mut AppState, req: &Request) -> serde_json::Value {
    match session(state, req) {
        Ok(s) => ok(&req.id, json!({ "queues": queues_json(s) })),
        Err(e) => e,
    }
}

fn handle_booking_progress(state: &mut AppState, req: &Request) -> serde_json::Value {
    let booking_id = match required_str(req, "bookingId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let today = match optional_str(req, "today") {
        Ok(Some(raw)) => match parse_date(&raw) {
            Ok(d) => d,
            Err(e) => return core_err(&req.id, &e),
        },
        Ok(None) => s.selected_date,
        Err(e) => return e,
    };
    let Some(booking) = s.snapshot().booking(&booking_id) else {
        return err(&req.id, "not_found", "booking not found", None);
    };
    ok(
        &req.id,
        json!({
            "bookingId": booking.id,
            "progressBar": booking_progress_bar(&booking.lessons, booking.required_minutes()),
            "completion": booking_completion(booking),
            "status": booking_status(booking, today)
        }),
    )
}

fn handle_event_set_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let raw = match required_str(req, "status") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(status) = EventStatus::parse(&raw.to_ascii_lowercase()) else {
        return err(
            &req.id,
            "bad_params",
            "status must be one of: planned, tbc, completed, uncompleted",
            None,
        );
    };
    let s = match session_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match s.update_event_status(&event_id, status) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => core_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classboard.load" => Some(handle_load(state, req)),
        "classboard.setDate" => Some(handle_set_date(state, req)),
        "classboard.adjustmentMode" => Some(handle_adjustment_mode(state, req)),
        "classboard.queues" => Some(handle_queues(state, req)),
        "booking.progress" => Some(handle_booking_progress(state, req)),
        "event.setStatus" => Some(handle_event_set_status(state, req)),
        _ => None,
    }
}
