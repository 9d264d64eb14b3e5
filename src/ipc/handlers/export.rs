use crate::export::{export_document, resolve_grade_level, write_document};
use crate::ipc::error::{ok, pta_err};
use crate::ipc::types::{AppState, Request};
use crate::permissions::authorize;
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

use super::{db_conn, optional_i64, required_i64, required_str};

fn handle_export_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(e) => return e,
    };
    let year = match required_i64(req, "year") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let grade_level_id = match required_i64(req, "gradeLevel") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let out_dir = match required_str(req, "outDir") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    let user_id = match optional_i64(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let result = resolve_grade_level(grade_level_id).and_then(|grade_level| {
        if let Some(id) = user_id {
            authorize(conn, id, grade_level)?;
        }
        let doc = export_document(conn, year, grade_level)?;
        let path = write_document(&doc, &out_dir)?;
        Ok((doc, path))
    });

    match result {
        Ok((doc, path)) => ok(
            &req.id,
            json!({
                "filename": doc.filename,
                "contentType": doc.content_type,
                "path": path.to_string_lossy(),
                "bytes": doc.bytes.len(),
                "subjects": doc.subjects,
                "pages": doc.pages,
            }),
        ),
        Err(e) => {
            warn!(year, grade_level_id, code = e.code(), "export rejected: {e}");
            pta_err(&req.id, &e)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.create" => Some(handle_export_create(state, req)),
        _ => None,
    }
}
