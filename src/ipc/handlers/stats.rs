use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::{required_str, session};
use crate::ipc::types::{AppState, Request};
use crate::stats::{stats_for, StatKind, StatRows};
use serde_json::json;

fn parse_kind(req: &Request) -> Result<StatKind, serde_json::Value> {
    let raw = required_str(req, "kind")?;
    StatKind::parse(&raw.to_ascii_lowercase()).map_err(|e| core_err(&req.id, &e))
}

fn handle_compute(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match parse_kind(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let s = match session(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let rows = stats_for(kind, s.snapshot());
    ok(
        &req.id,
        json!({
            "kind": rows.kind(),
            "totals": rows.totals(),
            "rows": rows
        }),
    )
}

fn handle_reduce(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match parse_kind(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(raw) = req.params.get("rows").cloned() else {
        return err(&req.id, "bad_params", "missing rows", None);
    };
    match StatRows::from_json(kind, raw) {
        Ok(rows) => ok(&req.id, json!({ "kind": kind, "totals": rows.totals() })),
        Err(e) => core_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "stats.compute" => Some(handle_compute(state, req)),
        "stats.reduce" => Some(handle_reduce(state, req)),
        _ => None,
    }
}
