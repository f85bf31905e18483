use crate::calc::{school_leftover, school_revenue, teacher_commission};
use crate::controller::ControllerSettings;
use crate::duration::{calculate_event_time, pretty_duration};
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::{required_date, required_f64, required_i64, required_str, required_u32};
use crate::ipc::types::{AppState, Request};
use crate::model::CommissionType;
use serde_json::json;

fn handle_event_time(state: &mut AppState, req: &Request) -> serde_json::Value {
    let capacity = match required_u32(req, "capacityStudents") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let slot = match required_str(req, "nextSlot") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let date = match required_date(req, "date") {
        Ok(v) => v,
        Err(e) => return e,
    };
    // Explicit settings win over the session's, which win over defaults.
    let settings = match req.params.get("settings") {
        Some(raw) if !raw.is_null() => {
            let Some(fields) = raw.as_object() else {
                return err(&req.id, "bad_params", "settings must be an object", None);
            };
            match ControllerSettings::from_patch(fields) {
                Ok(s) => s,
                Err(e) => return core_err(&req.id, &e),
            }
        }
        _ => state
            .session
            .as_ref()
            .map(|s| s.settings.clone())
            .unwrap_or_default(),
    };
    match calculate_event_time(capacity, &slot, date, &settings) {
        Ok(t) => ok(&req.id, json!(t)),
        Err(e) => core_err(&req.id, &e),
    }
}

fn handle_commission(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw_type = match required_str(req, "commissionType") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(commission_type) = CommissionType::parse(&raw_type.to_ascii_lowercase()) else {
        return err(&req.id, "bad_params", "commissionType must be fixed or percentage", None);
    };
    let cph = match required_f64(req, "cph") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let minutes = match required_i64(req, "durationMinutes") {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({ "commission": teacher_commission(commission_type, cph, minutes) }),
    )
}

fn handle_revenue(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let price = match required_f64(req, "pricePerStudent") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let students = match required_u32(req, "studentCount") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let minutes = match required_i64(req, "durationMinutes") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let package_minutes = match required_i64(req, "packageDurationMinutes") {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({ "revenue": school_revenue(price, students, minutes, package_minutes) }),
    )
}

fn handle_leftover(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let revenue = match required_f64(req, "totalRevenue") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let commission = match required_f64(req, "teacherCommission") {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!({ "leftover": school_leftover(revenue, commission) }))
}

fn handle_pretty(_state: &mut AppState, req: &Request) -> serde_json::Value {
    match required_i64(req, "minutes") {
        Ok(m) => ok(&req.id, json!({ "pretty": pretty_duration(m) })),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "calc.eventTime" => Some(handle_event_time(state, req)),
        "calc.commission" => Some(handle_commission(state, req)),
        "calc.revenue" => Some(handle_revenue(state, req)),
        "calc.leftover" => Some(handle_leftover(state, req)),
        "duration.pretty" => Some(handle_pretty(state, req)),
        _ => None,
    }
}
