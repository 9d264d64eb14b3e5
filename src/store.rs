use chrono::{DateTime, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::constants::{
    AccessMode, CrossOverAction, ExportMode, GradeLevel, Sector, SortMode,
};
use crate::error::Result;
use crate::model::{Calendar, CrossOver, Footnote, Subject, Test, User, WorkKind};

const TEST_COLUMNS: &str = "t.OCT_ID, t.OCT_Jaar, t.OCT_Klas, t.OCT_Type, t.OCT_Code,
    t.OCT_Omschrijving, t.OCT_Domein, t.OCT_Week, t.OCT_InleverDatum, t.OCT_Datum,
    t.OCT_Periode, t.OCT_SoortWerk, w.OCW_Naam, t.OCT_Tijd,
    t.OCT_Weging_ED3, t.OCT_Weging_ED4, t.OCT_Weging_ED5, t.OCT_Weging_ED6,
    t.OCT_Weging_R4, t.OCT_Pct, t.OCT_Herkansbaar, t.OCT_Voetnoot";

/// Unix timestamps; 0 means no date.
fn timestamp_date(value: Option<i64>) -> Option<NaiveDate> {
    match value {
        Some(ts) if ts != 0 => DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn test_from_row(row: &Row) -> rusqlite::Result<Test> {
    let work_kind_id: Option<i64> = row.get(11)?;
    let work_kind_name: Option<String> = row.get(12)?;
    let work_kind = match (work_kind_id, work_kind_name) {
        (Some(id), Some(name)) => Some(WorkKind { id, name }),
        _ => None,
    };
    Ok(Test {
        id: row.get(0)?,
        year: row.get(1)?,
        grade_level: row.get::<_, Option<i64>>(2)?.and_then(GradeLevel::from_id),
        type_code: row.get(3)?,
        code: row.get(4)?,
        description: row.get(5)?,
        domain: row.get(6)?,
        week: row.get(7)?,
        due_date: timestamp_date(row.get(8)?),
        date: timestamp_date(row.get(9)?),
        period: row.get(10)?,
        work_kind,
        duration: row.get(13)?,
        weighting_ed3: row.get(14)?,
        weighting_ed4: row.get(15)?,
        weighting_ed5: row.get(16)?,
        weighting_ed6: row.get(17)?,
        weighting_r4: row.get(18)?,
        pct: row.get(19)?,
        resit: row.get(20)?,
        footnote: row.get(21)?,
    })
}

pub fn calendar(conn: &Connection, year: i64) -> Result<Option<Calendar>> {
    let cal = conn
        .query_row(
            "SELECT OCK_TW11, OCK_TW12, OCK_TW21, OCK_TW22,
                    OCK_TW31, OCK_TW32, OCK_TW41, OCK_TW42
             FROM OC_kalender WHERE OCK_Jaar = ? ORDER BY OCK_ID LIMIT 1",
            [year],
            |r| {
                Ok(Calendar {
                    test_weeks: [
                        [r.get(0)?, r.get(1)?],
                        [r.get(2)?, r.get(3)?],
                        [r.get(4)?, r.get(5)?],
                        [r.get(6)?, r.get(7)?],
                    ],
                })
            },
        )
        .optional()?;
    Ok(cal)
}

pub fn calendar_years(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT DISTINCT OCK_Jaar FROM OC_kalender ORDER BY OCK_Jaar")?;
    let years = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(years)
}

/// All subjects, case-insensitively by name.
pub fn subjects(conn: &Connection) -> Result<Vec<Subject>> {
    let mut stmt = conn.prepare(
        "SELECT OCV_ID, OCV_Naam, OCV_Afkorting, OCV_Weergeven, OCV_Sortering, OCV_Export
         FROM OC_vakken
         ORDER BY LOWER(OCV_Naam), OCV_ID",
    )?;
    let subjects = stmt
        .query_map([], |r| {
            let export: Option<String> = r.get(5)?;
            Ok(Subject {
                id: r.get(0)?,
                name: r.get(1)?,
                abbreviation: r.get(2)?,
                display: r.get(3)?,
                sort_mode: SortMode::from_id(r.get(4)?),
                export_mode: ExportMode::from_code(export.as_deref()),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(subjects)
}

/// Tests of one subject at `(year, grade_level)` in the subject's order.
pub fn tests_for_subject(
    conn: &Connection,
    year: i64,
    grade_level: GradeLevel,
    subject_id: i64,
    sort_mode: SortMode,
) -> Result<Vec<Test>> {
    let order = match sort_mode {
        SortMode::Chronological => "t.OCT_Lesweek, t.OCT_Code, t.OCT_ID",
        SortMode::ByType => "t.OCT_Type, t.OCT_Lesweek, t.OCT_Code, t.OCT_ID",
    };
    let sql = format!(
        "SELECT {} FROM OC_toetsen t
         LEFT JOIN OC_werk w ON w.OCW_ID = t.OCT_SoortWerk
         WHERE t.OCT_Jaar = ? AND t.OCT_Klas = ? AND t.OCT_Vak = ?
         ORDER BY {}",
        TEST_COLUMNS, order
    );
    let mut stmt = conn.prepare(&sql)?;
    let tests = stmt
        .query_map(params![year, grade_level.id(), subject_id], test_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tests)
}

/// Every test of a subject in `year - 2 ..= year`, by id.
pub fn weight_history(conn: &Connection, year: i64, subject_id: i64) -> Result<Vec<Test>> {
    let sql = format!(
        "SELECT {} FROM OC_toetsen t
         LEFT JOIN OC_werk w ON w.OCW_ID = t.OCT_SoortWerk
         WHERE t.OCT_Vak = ? AND t.OCT_Jaar BETWEEN ? AND ?
         ORDER BY t.OCT_ID",
        TEST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let tests = stmt
        .query_map(params![subject_id, year - 2, year], test_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tests)
}

pub fn test_by_id(conn: &Connection, id: i64) -> Result<Option<Test>> {
    let sql = format!(
        "SELECT {} FROM OC_toetsen t
         LEFT JOIN OC_werk w ON w.OCW_ID = t.OCT_SoortWerk
         WHERE t.OCT_ID = ?",
        TEST_COLUMNS
    );
    Ok(conn.query_row(&sql, [id], test_from_row).optional()?)
}

/// Cross-over records of one subject, with old and linked tests resolved.
pub fn cross_overs(
    conn: &Connection,
    year: i64,
    grade_level: GradeLevel,
    subject_id: i64,
) -> Result<Vec<CrossOver>> {
    let mut stmt = conn.prepare(
        "SELECT OCO_Weging_ED4, OCO_Actie, OCO_Oudetoets, OCO_Koppeltoets
         FROM OC_overstap
         WHERE OCO_Jaar = ? AND OCO_Klas = ? AND OCO_Vak = ?
         ORDER BY OCO_ID",
    )?;
    let raw = stmt
        .query_map(params![year, grade_level.id(), subject_id], |r| {
            Ok((
                CrossOver {
                    weighting: r.get(0)?,
                    action: r.get::<_, Option<i64>>(1)?.and_then(CrossOverAction::from_id),
                    old_test_id: r.get(2)?,
                    old_test: None,
                    linked_test: None,
                },
                r.get::<_, Option<i64>>(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut out = Vec::with_capacity(raw.len());
    for (mut cross_over, linked_id) in raw {
        if let Some(id) = cross_over.old_test_id {
            cross_over.old_test = test_by_id(conn, id)?;
        }
        if let Some(id) = linked_id {
            cross_over.linked_test = test_by_id(conn, id)?;
        }
        out.push(cross_over);
    }
    Ok(out)
}

pub fn footnotes(conn: &Connection, subject_id: i64) -> Result<Vec<Footnote>> {
    let mut stmt = conn.prepare(
        "SELECT OCVN_Noot FROM OC_voetnoot WHERE OCVN_Vak = ? ORDER BY OCVN_ID",
    )?;
    let notes = stmt
        .query_map([subject_id], |r| Ok(Footnote { text: r.get(0)? }))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

pub fn user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT OCU_Access, OCU_Sector FROM OC_users WHERE OCU_ID = ?",
            [id],
            |r| {
                Ok(User {
                    access: AccessMode::from_id(r.get(0)?),
                    sector: r.get::<_, Option<i64>>(1)?.and_then(Sector::from_id),
                })
            },
        )
        .optional()?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_db;
    use std::path::Path;

    fn store() -> Connection {
        let conn = open_db(Path::new(":memory:")).unwrap();
        conn.execute_batch(
            "INSERT INTO OC_werk(OCW_ID, OCW_Naam) VALUES (1, 'schriftelijk'), (12, 'geen');
             INSERT INTO OC_vakken(OCV_ID, OCV_Naam, OCV_Afkorting, OCV_Weergeven, OCV_Sortering, OCV_Export)
               VALUES (1, 'wiskunde', 'WI', 0, 2, '1'),
                      (2, 'Biologie', 'BI', 1, 1, NULL),
                      (3, 'aardrijkskunde', NULL, NULL, NULL, '2');
             INSERT INTO OC_kalender(OCK_Jaar, OCK_TW11, OCK_TW12, OCK_TW21, OCK_TW22)
               VALUES (2019, 44, 45, 4, NULL), (2017, 1, 2, NULL, NULL);",
        )
        .unwrap();
        conn
    }

    fn insert_test(conn: &Connection, id: i64, year: i64, grade: i64, subject: i64, kind: i64, lesson_week: i64, code: &str) {
        conn.execute(
            "INSERT INTO OC_toetsen(OCT_ID, OCT_Jaar, OCT_Klas, OCT_Vak, OCT_Type, OCT_Lesweek, OCT_Code, OCT_SoortWerk, OCT_Datum)
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, 1583366400)",
            params![id, year, grade, subject, kind, lesson_week, code],
        )
        .unwrap();
    }

    #[test]
    fn calendar_lookup_and_years() {
        let conn = store();
        let cal = calendar(&conn, 2019).unwrap().unwrap();
        assert_eq!(cal.test_weeks[0], [Some(44), Some(45)]);
        assert_eq!(cal.test_weeks[1], [Some(4), None]);
        assert!(calendar(&conn, 2030).unwrap().is_none());
        assert_eq!(calendar_years(&conn).unwrap(), vec![2017, 2019]);
    }

    #[test]
    fn subjects_sorted_case_insensitively() {
        let conn = store();
        let names: Vec<String> = subjects(&conn).unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["aardrijkskunde", "Biologie", "wiskunde"]);
        let all = subjects(&conn).unwrap();
        assert_eq!(all[0].export_mode, ExportMode::RemarkCompletedEarlier);
        assert_eq!(all[1].export_mode, ExportMode::Unrecognised);
        assert_eq!(all[2].sort_mode, SortMode::ByType);
    }

    #[test]
    fn tests_follow_sort_mode() {
        let conn = store();
        insert_test(&conn, 1, 2019, 2, 1, 4, 10, "B");
        insert_test(&conn, 2, 2019, 2, 1, 1, 20, "A");
        insert_test(&conn, 3, 2019, 2, 1, 1, 10, "C");
        insert_test(&conn, 4, 2018, 2, 1, 1, 1, "X");

        let ids = |mode| -> Vec<i64> {
            tests_for_subject(&conn, 2019, GradeLevel::Havo5, 1, mode)
                .unwrap()
                .iter()
                .map(|t| t.id)
                .collect()
        };
        assert_eq!(ids(SortMode::Chronological), vec![1, 3, 2]);
        assert_eq!(ids(SortMode::ByType), vec![3, 2, 1]);
    }

    #[test]
    fn test_rows_resolve_work_kind_and_dates() {
        let conn = store();
        insert_test(&conn, 1, 2019, 2, 1, 1, 10, "B");
        let t = test_by_id(&conn, 1).unwrap().unwrap();
        assert_eq!(t.grade_level, Some(GradeLevel::Havo5));
        assert_eq!(t.work_kind.unwrap().name, "schriftelijk");
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2020, 3, 5));
        assert_eq!(t.due_date, None);
    }

    #[test]
    fn weight_history_spans_three_years() {
        let conn = store();
        insert_test(&conn, 1, 2016, 1, 1, 1, 1, "A");
        insert_test(&conn, 2, 2017, 1, 1, 1, 1, "B");
        insert_test(&conn, 3, 2019, 5, 1, 1, 1, "C");
        insert_test(&conn, 4, 2019, 5, 2, 1, 1, "D");
        let ids: Vec<i64> = weight_history(&conn, 2019, 1).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn cross_overs_resolve_tests() {
        let conn = store();
        insert_test(&conn, 10, 2018, 3, 1, 1, 1, "V4-1");
        insert_test(&conn, 20, 2019, 2, 1, 1, 1, "H5-1");
        conn.execute_batch(
            "INSERT INTO OC_overstap(OCO_ID, OCO_Jaar, OCO_Klas, OCO_Vak, OCO_Weging_ED4, OCO_Oudetoets, OCO_Koppeltoets, OCO_Actie)
               VALUES (2, 2019, 7, 1, NULL, 20, 10, 1), (1, 2019, 7, 1, 5, 99, NULL, 3);",
        )
        .unwrap();
        let list = cross_overs(&conn, 2019, GradeLevel::CrossOverVwo6, 1).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].action, Some(CrossOverAction::CatchUp));
        assert!(list[0].old_test.is_none());
        assert_eq!(list[1].old_test.as_ref().unwrap().code.as_deref(), Some("H5-1"));
        assert_eq!(list[1].linked_test.as_ref().unwrap().grade_level, Some(GradeLevel::Vwo4));
    }

    #[test]
    fn users_and_footnotes() {
        let conn = store();
        conn.execute_batch(
            "INSERT INTO OC_users(OCU_ID, OCU_Naam, OCU_Access, OCU_Sector) VALUES (1, 'Jansen', 2, 3);
             INSERT INTO OC_voetnoot(OCVN_ID, OCVN_Vak, OCVN_Noot) VALUES (2, 1, 'tweede'), (1, 1, 'eerste'), (3, 2, 'ander vak');",
        )
        .unwrap();
        let u = user(&conn, 1).unwrap().unwrap();
        assert_eq!(u.access, AccessMode::ExportBySector);
        assert_eq!(u.sector, Some(Sector::Vmbo));
        assert!(user(&conn, 2).unwrap().is_none());

        let notes: Vec<String> = footnotes(&conn, 1).unwrap().into_iter().map(|n| n.text).collect();
        assert_eq!(notes, vec!["eerste", "tweede"]);
    }
}
