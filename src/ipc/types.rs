use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store_path: Option<PathBuf>,
    pub db: Option<Connection>,
}

impl AppState {
    pub fn empty() -> Self {
        Self {
            store_path: None,
            db: None,
        }
    }
}
