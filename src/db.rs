use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

pub const DB_FILE: &str = "classboard.sqlite3";

/// Key/value persistence for session preferences (controller settings, sort order).
pub trait SettingsStore {
    fn get_json(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>>;
    fn set_json(&self, key: &str, value: &serde_json::Value) -> anyhow::Result<()>;
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let conn = Connection::open(workspace.join(DB_FILE))?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;
    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

pub struct SqliteSettingsStore {
    conn: Connection,
}

impl SqliteSettingsStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: open_db(workspace)?,
        })
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn get_json(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        settings_get_json(&self.conn, key)
    }

    fn set_json(&self, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
        settings_set_json(&self.conn, key, value)
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    values: RefCell<HashMap<String, serde_json::Value>>,
}

impl SettingsStore for MemorySettingsStore {
    fn get_json(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set_json(&self, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
        self.values.borrow_mut().insert(key.to_string(), value.clone());
        Ok(())
    }
}
