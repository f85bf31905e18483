mod calc;
mod controller;
mod db;
mod duration;
mod error;
mod ipc;
mod model;
mod queue;
mod stats;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{error, info};

/// Logs go to stderr; stdout carries the IPC responses.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CLASSBOARD_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let mut state = ipc::AppState::default();

    if let Ok(path) = std::env::var("CLASSBOARD_WORKSPACE") {
        if let Err(e) = ipc::select_workspace(&mut state, PathBuf::from(&path)) {
            error!(workspace = %path, error = %e, "could not open workspace from environment");
        }
    }
    info!(version = env!("CARGO_PKG_VERSION"), "classboardd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to echo back.
                let _ = writeln!(
                    stdout,
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed, shutting down");
}
