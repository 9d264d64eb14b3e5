use rusqlite::Connection;

use crate::constants::{AccessMode, GradeLevel};
use crate::error::{PtaError, Result};
use crate::model::User;
use crate::store;

/// Grade levels the user may export, in id order.
pub fn allowed_grade_levels(user: &User) -> Vec<GradeLevel> {
    match (user.access, user.sector) {
        (AccessMode::ExportAny, _) => GradeLevel::ALL.to_vec(),
        (AccessMode::ExportBySector, Some(sector)) => sector.grade_levels(),
        _ => Vec::new(),
    }
}

pub fn check_export_allowed(user: &User, grade_level: GradeLevel) -> Result<()> {
    if allowed_grade_levels(user).contains(&grade_level) {
        Ok(())
    } else {
        Err(PtaError::Forbidden(grade_level.label()))
    }
}

/// Looks the user up and checks the grade level; unknown users may export nothing.
pub fn authorize(conn: &Connection, user_id: i64, grade_level: GradeLevel) -> Result<()> {
    match store::user(conn, user_id)? {
        Some(user) => check_export_allowed(&user, grade_level),
        None => Err(PtaError::Forbidden(grade_level.label())),
    }
}
