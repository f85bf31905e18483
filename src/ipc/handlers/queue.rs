use crate::duration::minutes_to_time;
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::{optional_str, required_str, session, session_mut};
use crate::ipc::types::{AppState, Request};
use crate::queue::Direction;
use serde_json::json;

fn queue_json(state: &AppState, req: &Request, teacher: &str) -> serde_json::Value {
    let s = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match s.queue(teacher) {
        Ok(q) => ok(&req.id, json!({ "queue": q.summary(&s.settings) })),
        Err(e) => core_err(&req.id, &e),
    }
}

fn handle_next_slot(state: &mut AppState, req: &Request) -> serde_json::Value {
    let teacher = match required_str(req, "teacherUsername") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let queue = match s.queue(&teacher) {
        Ok(v) => v,
        Err(e) => return core_err(&req.id, &e),
    };
    let start = match s.settings.start_minutes() {
        Ok(v) => v,
        Err(e) => return core_err(&req.id, &e),
    };
    let next = queue
        .next_slot(start, s.settings.gap_minutes)
        .map(minutes_to_time);
    ok(&req.id, json!({ "teacherUsername": teacher, "nextSlot": next }))
}

fn handle_assign(state: &mut AppState, req: &Request) -> serde_json::Value {
    let teacher = match required_str(req, "teacherUsername") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let booking_id = match required_str(req, "bookingId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = match session_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match s.assign_booking(&teacher, &booking_id) {
        Ok(event) => {
            let queue = s.queue(&teacher).map(|q| q.summary(&s.settings)).ok();
            ok(&req.id, json!({ "event": event, "queue": queue }))
        }
        Err(e) => core_err(&req.id, &e),
    }
}

fn handle_move(state: &mut AppState, req: &Request) -> serde_json::Value {
    let teacher = match required_str(req, "teacherUsername") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let raw = match required_str(req, "direction") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(direction) = Direction::parse(&raw.to_ascii_lowercase()) else {
        return err(&req.id, "bad_params", "direction must be earlier or later", None);
    };
    let s = match session_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = s.move_event(&teacher, &event_id, direction) {
        return core_err(&req.id, &e);
    }
    queue_json(state, req, &teacher)
}

fn handle_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let teacher = match required_str(req, "teacherUsername") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let event_id = match required_str(req, "eventId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = match session_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = s.remove_event(&teacher, &event_id) {
        return core_err(&req.id, &e);
    }
    queue_json(state, req, &teacher)
}

fn handle_compact(state: &mut AppState, req: &Request) -> serde_json::Value {
    let teacher = match required_str(req, "teacherUsername") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = match session_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = s.compact_queue(&teacher) {
        return core_err(&req.id, &e);
    }
    queue_json(state, req, &teacher)
}

fn handle_drag_compatibility(state: &mut AppState, req: &Request) -> serde_json::Value {
    let teacher = match required_str(req, "teacherUsername") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let booking_id = match optional_str(req, "bookingId") {
        Ok(v) => v.filter(|s| !s.is_empty()),
        Err(e) => return e,
    };
    let s = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match s.drag_compatibility(&teacher, booking_id.as_deref()) {
        Ok(c) => ok(&req.id, json!({ "compatibility": c })),
        Err(e) => core_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "queue.nextSlot" => Some(handle_next_slot(state, req)),
        "queue.assign" => Some(handle_assign(state, req)),
        "queue.move" => Some(handle_move(state, req)),
        "queue.remove" => Some(handle_remove(state, req)),
        "queue.compact" => Some(handle_compact(state, req)),
        "drag.compatibility" => Some(handle_drag_compatibility(state, req)),
        _ => None,
    }
}
