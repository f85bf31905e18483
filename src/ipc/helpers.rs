use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use crate::controller::ClassboardSession;
use crate::duration::parse_date;
use crate::ipc::error::{core_err, err};
use crate::ipc::types::{AppState, Request};

pub fn required_str(req: &Request, key: &str) -> Result<String, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> Result<Option<String>, JsonValue> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.trim().to_string()))
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be string or null", key), None)),
    }
}

pub fn required_f64(req: &Request, key: &str) -> Result<f64, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be a number", key), None))
}

pub fn required_i64(req: &Request, key: &str) -> Result<i64, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be integer", key), None))
}

pub fn required_u32(req: &Request, key: &str) -> Result<u32, JsonValue> {
    let n = required_i64(req, key)?;
    u32::try_from(n)
        .map_err(|_| err(&req.id, "bad_params", format!("{} must be >= 0", key), None))
}

pub fn required_bool(req: &Request, key: &str) -> Result<bool, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be boolean", key), None))
}

pub fn required_date(req: &Request, key: &str) -> Result<NaiveDate, JsonValue> {
    let raw = required_str(req, key)?;
    parse_date(&raw).map_err(|e| core_err(&req.id, &e))
}

pub fn session<'a>(state: &'a AppState, req: &Request) -> Result<&'a ClassboardSession, JsonValue> {
    state
        .session
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_session", "load the classboard first", None))
}

pub fn session_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut ClassboardSession, JsonValue> {
    state
        .session
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_session", "load the classboard first", None))
}
