use thiserror::Error;

#[derive(Debug, Error)]
pub enum PtaError {
    #[error("invalid weighting code: {0}")]
    InvalidWeightCode(i64),

    #[error("grade level {0} belongs to neither the havo nor the vwo track")]
    UnknownTrack(&'static str),

    #[error("invalid grade level id: {0}")]
    UnknownGradeLevel(i64),

    #[error("no calendar exists for year {0}")]
    NoCalendar(i64),

    #[error("not allowed to export grade level {0}")]
    Forbidden(&'static str),

    #[error("header and row columns mismatch: header has {header}, row {row} has {actual}")]
    ColumnMismatch {
        header: usize,
        row: usize,
        actual: usize,
    },

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl PtaError {
    /// Stable code reported over the JSON-lines API.
    pub fn code(&self) -> &'static str {
        match self {
            PtaError::InvalidWeightCode(_) => "invalid_weight_code",
            PtaError::UnknownTrack(_) => "unknown_track",
            PtaError::UnknownGradeLevel(_) => "unknown_grade_level",
            PtaError::NoCalendar(_) => "no_calendar",
            PtaError::Forbidden(_) => "forbidden",
            PtaError::ColumnMismatch { .. } => "table_shape",
            PtaError::Db(_) => "db_query_failed",
            PtaError::Io(_) | PtaError::Zip(_) => "io_failed",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            PtaError::InvalidWeightCode(_)
            | PtaError::UnknownGradeLevel(_)
            | PtaError::NoCalendar(_)
            | PtaError::Forbidden(_) => 2,
            _ => 1,
        }
    }

    /// Rejections caused by the request itself, as opposed to defects or I/O.
    pub fn is_input_error(&self) -> bool {
        self.exit_code() == 2
    }
}

pub type Result<T> = std::result::Result<T, PtaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_exit_with_two() {
        assert_eq!(PtaError::UnknownGradeLevel(99).exit_code(), 2);
        assert_eq!(PtaError::NoCalendar(2019).exit_code(), 2);
        assert!(PtaError::Forbidden("4 TL").is_input_error());
    }

    #[test]
    fn defects_exit_with_one() {
        let e = PtaError::ColumnMismatch {
            header: 8,
            row: 1,
            actual: 7,
        };
        assert_eq!(e.exit_code(), 1);
        assert_eq!(e.code(), "table_shape");
        assert_eq!(PtaError::UnknownTrack("3 TL").exit_code(), 1);
    }

    #[test]
    fn message_names_the_grade_level_id() {
        assert_eq!(
            PtaError::UnknownGradeLevel(42).to_string(),
            "invalid grade level id: 42"
        );
    }
}
