#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_classboardd");
    let mut child = Command::new(exe)
        .env_remove("CLASSBOARD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn classboardd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Sends a request expected to fail and returns its error code.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Two kite bookings on 2024-06-10: one group of two already half-taught by `tom`,
/// one private booking with lessons for both teachers but nothing scheduled yet.
pub fn sample_roster() -> serde_json::Value {
    json!({
        "date": "2024-06-10",
        "teachers": [
            { "username": "tom", "firstName": "Tom", "equipmentCategories": ["kite"] },
            { "username": "ann", "firstName": "Ann", "equipmentCategories": ["wing"] }
        ],
        "bookings": [
            {
                "id": "b-group",
                "dateStart": "2024-06-10",
                "dateEnd": "2024-06-12",
                "leaderName": "Marta",
                "package": {
                    "id": "pkg-kite-6h",
                    "durationMinutes": 360,
                    "pricePerStudent": 300.0,
                    "capacityStudents": 3,
                    "categoryEquipment": "kite"
                },
                "students": [
                    { "id": "s1", "firstName": "Marta" },
                    { "id": "s2", "firstName": "Leo" }
                ],
                "referral": { "code": "HOTEL", "commission": 20.0 },
                "lessons": [
                    {
                        "id": "l-group-tom",
                        "teacherUsername": "tom",
                        "commission": { "id": "c1", "commissionType": "fixed", "cph": 30.0 },
                        "events": [
                            {
                                "id": "e-done",
                                "date": "2024-06-10T09:00:00",
                                "duration": 120,
                                "location": "Beach",
                                "status": "completed",
                                "equipmentIds": ["kite-9m"]
                            },
                            {
                                "id": "e-next",
                                "date": "2024-06-10T12:00:00",
                                "duration": 60,
                                "location": "Beach",
                                "status": "planned"
                            }
                        ]
                    }
                ]
            },
            {
                "id": "b-private",
                "dateStart": "2024-06-10",
                "dateEnd": "2024-06-10",
                "leaderName": "Zoe",
                "package": {
                    "id": "pkg-kite-private",
                    "durationMinutes": 120,
                    "pricePerStudent": 150.0,
                    "capacityStudents": 1,
                    "categoryEquipment": "kite"
                },
                "students": [ { "id": "s3", "firstName": "Zoe" } ],
                "lessons": [
                    {
                        "id": "l-private-tom",
                        "teacherUsername": "tom",
                        "commission": { "id": "c2", "commissionType": "fixed", "cph": 40.0 }
                    },
                    { "id": "l-private-ann", "teacherUsername": "ann" }
                ]
            }
        ]
    })
}
