use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::GradeLevel;
use crate::docx::{Document, CONTENT_TYPE};
use crate::error::{PtaError, Result};
use crate::render::{render_subject, RenderContext, Strategy, SubjectData};
use crate::store;
use crate::weighting::blends_prior_years;

#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    /// Subjects that produced at least one page.
    pub subjects: usize,
    pub pages: usize,
}

pub fn resolve_grade_level(id: i64) -> Result<GradeLevel> {
    GradeLevel::from_id(id).ok_or(PtaError::UnknownGradeLevel(id))
}

/// `2019-H5.docx`
pub fn export_filename(year: i64, grade_level: GradeLevel) -> String {
    format!("{}-{}.docx", year, grade_level.short_code())
}

/// Builds the PTA document of every subject for `(year, grade_level)`.
pub fn export_document(
    conn: &Connection,
    year: i64,
    grade_level: GradeLevel,
) -> Result<ExportedDocument> {
    let calendar = store::calendar(conn, year)?.ok_or(PtaError::NoCalendar(year))?;
    let periods = calendar.test_week_periods();
    let strategy = Strategy::for_grade_level(grade_level);
    info!(year, grade_level = grade_level.short_code(), ?strategy, "export started");

    let ctx = RenderContext {
        year,
        grade_level,
        periods: &periods,
    };
    let mut doc = Document::new();
    let mut subjects = 0;

    for subject in store::subjects(conn)? {
        let tests =
            store::tests_for_subject(conn, year, grade_level, subject.id, subject.sort_mode)?;
        let history = if blends_prior_years(grade_level) {
            store::weight_history(conn, year, subject.id)?
        } else {
            Vec::new()
        };
        let footnotes = match strategy {
            Strategy::Regular => store::footnotes(conn, subject.id)?,
            _ => Vec::new(),
        };
        let cross_overs = if grade_level.is_cross_over() {
            store::cross_overs(conn, year, grade_level, subject.id)?
        } else {
            Vec::new()
        };
        let havo5_tests = if strategy == Strategy::CrossOver6 {
            store::tests_for_subject(
                conn,
                year,
                GradeLevel::Havo5,
                subject.id,
                subject.sort_mode,
            )?
        } else {
            Vec::new()
        };

        let data = SubjectData {
            subject: &subject,
            tests: &tests,
            history: &history,
            footnotes: &footnotes,
            cross_overs: &cross_overs,
            havo5_tests: &havo5_tests,
        };
        let produced = render_subject(&mut doc, &ctx, &data)?;
        debug!(subject = %subject.name, tests = tests.len(), pages = produced, "subject done");
        if produced > 0 {
            subjects += 1;
        }
    }

    let pages = doc.page_break_count();
    let bytes = doc.to_bytes()?;
    let filename = export_filename(year, grade_level);
    info!(%filename, subjects, pages, bytes = bytes.len(), "export finished");

    Ok(ExportedDocument {
        filename,
        content_type: CONTENT_TYPE,
        bytes,
        subjects,
        pages,
    })
}

/// Writes the document into `out_dir` under its own file name.
pub fn write_document(doc: &ExportedDocument, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&doc.filename);
    std::fs::write(&path, &doc.bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_db;
    use std::io::{Cursor, Read};

    fn seeded() -> Connection {
        let conn = open_db(Path::new(":memory:")).unwrap();
        conn.execute_batch(
            "INSERT INTO OC_kalender(OCK_Jaar, OCK_TW11, OCK_TW12) VALUES (2019, 44, 45);
             INSERT INTO OC_vakken(OCV_ID, OCV_Naam, OCV_Afkorting, OCV_Weergeven, OCV_Sortering, OCV_Export)
               VALUES (1, 'scheikunde', 'SK', 0, 1, '0'), (2, 'duits', 'DU', 0, 1, '0');
             INSERT INTO OC_toetsen(OCT_ID, OCT_Jaar, OCT_Klas, OCT_Vak, OCT_Code, OCT_Omschrijving, OCT_Pct, OCT_Periode, OCT_Week)
               VALUES (1, 2018, 1, 1, 'SK401', 'Redoxreacties', 40, 1, 44),
                      (2, 2019, 2, 1, 'SK501', 'Zuren &amp; basen', 0, 1, 45);",
        )
        .unwrap();
        conn
    }

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn exports_havo_5_with_weighting_note() {
        let conn = seeded();
        let doc = export_document(&conn, 2019, GradeLevel::Havo5).unwrap();
        assert_eq!(doc.filename, "2019-H5.docx");
        assert_eq!(doc.content_type, CONTENT_TYPE);
        assert_eq!((doc.subjects, doc.pages), (1, 1));

        let xml = document_xml(&doc.bytes);
        assert!(xml.contains("Scheikunde"));
        assert!(xml.contains("Zuren &amp; basen"));
        assert!(xml.contains("berekening SE cijfer: (2x ED4 + 3x ED5) / 5"));
        assert!(xml.contains("1 (tw)"));
        assert!(!xml.contains("Duits"));
    }

    #[test]
    fn missing_calendar_is_rejected() {
        let conn = seeded();
        assert!(matches!(
            export_document(&conn, 2020, GradeLevel::Havo5),
            Err(PtaError::NoCalendar(2020))
        ));
    }

    #[test]
    fn empty_grade_level_still_produces_a_document() {
        let conn = seeded();
        let doc = export_document(&conn, 2019, GradeLevel::Tl3).unwrap();
        assert_eq!((doc.subjects, doc.pages), (0, 0));
        assert!(document_xml(&doc.bytes).contains("<w:sectPr>"));
    }

    #[test]
    fn grade_level_ids_are_validated() {
        assert_eq!(resolve_grade_level(19).unwrap(), GradeLevel::Tl4);
        let err = resolve_grade_level(8).unwrap_err();
        assert_eq!(err.to_string(), "invalid grade level id: 8");
    }
}
