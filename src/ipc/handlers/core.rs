use crate::constants::GradeLevel;
use crate::db;
use crate::ipc::error::{err, ok, pta_err};
use crate::ipc::types::{AppState, Request};
use crate::permissions::allowed_grade_levels;
use crate::store;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

use super::{db_conn, optional_i64, required_str};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "storePath": state.store_path.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_store_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };

    match db::open_db(&path) {
        Ok(conn) => {
            info!(path = %path.display(), "store opened");
            state.store_path = Some(path.clone());
            state.db = Some(conn);
            ok(&req.id, json!({ "storePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

fn handle_calendar_years(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    match store::calendar_years(conn) {
        Ok(years) => ok(&req.id, json!({ "years": years })),
        Err(e) => pta_err(&req.id, &e),
    }
}

fn handle_grade_levels_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user_id = match optional_i64(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let levels = match user_id {
        None => GradeLevel::ALL.to_vec(),
        Some(id) => {
            let conn = match db_conn(state, req) {
                Ok(c) => c,
                Err(e) => return e,
            };
            match store::user(conn, id) {
                Ok(Some(user)) => allowed_grade_levels(&user),
                Ok(None) => {
                    warn!(user_id = id, "unknown user");
                    return err(&req.id, "forbidden", format!("unknown user: {}", id), None);
                }
                Err(e) => return pta_err(&req.id, &e),
            }
        }
    };

    let rows: Vec<serde_json::Value> = levels
        .iter()
        .map(|g| {
            json!({
                "id": g.id(),
                "short": g.short_code(),
                "label": g.label(),
                "sector": g.sector(),
            })
        })
        .collect();
    ok(&req.id, json!({ "gradeLevels": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "store.open" => Some(handle_store_open(state, req)),
        "calendar.years" => Some(handle_calendar_years(state, req)),
        "gradeLevels.list" => Some(handle_grade_levels_list(state, req)),
        _ => None,
    }
}
