use serde_json::json;

use crate::error::PtaError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn pta_err(id: &str, e: &PtaError) -> serde_json::Value {
    let details = match e {
        PtaError::ColumnMismatch {
            header,
            row,
            actual,
        } => Some(json!({ "header": header, "row": row, "actual": actual })),
        _ => None,
    };
    err(id, e.code(), e.to_string(), details)
}

/// Reply for a line that is not a request at all.
pub fn bad_json(message: impl Into<String>) -> serde_json::Value {
    json!({
        "ok": false,
        "error": {
            "code": "bad_json",
            "message": message.into(),
        }
    })
}
