use std::path::PathBuf;

use serde::Deserialize;

use crate::controller::{ClassboardSession, SortOrder};
use crate::db::{MemorySettingsStore, SettingsStore};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Box<dyn SettingsStore>,
    pub sort_order: SortOrder,
    pub session: Option<ClassboardSession>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            workspace: None,
            store: Box::new(MemorySettingsStore::default()),
            sort_order: SortOrder::default(),
            session: None,
        }
    }
}
