use rusqlite::Connection;
use std::path::Path;

/// Opens the PTA store, creating the legacy tables when they are missing.
pub fn open_db(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS OC_kalender(
            OCK_ID INTEGER PRIMARY KEY,
            OCK_Jaar INTEGER NOT NULL,
            OCK_TW11 INTEGER,
            OCK_TW12 INTEGER,
            OCK_TW21 INTEGER,
            OCK_TW22 INTEGER,
            OCK_TW31 INTEGER,
            OCK_TW32 INTEGER,
            OCK_TW41 INTEGER,
            OCK_TW42 INTEGER
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_kalender_jaar ON OC_kalender(OCK_Jaar)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS OC_vakken(
            OCV_ID INTEGER PRIMARY KEY,
            OCV_Naam TEXT NOT NULL,
            OCV_Afkorting TEXT,
            OCV_Weergeven INTEGER,
            OCV_Sortering INTEGER,
            OCV_Export TEXT DEFAULT '0'
        )",
        [],
    )?;
    // Stores exported before the per-subject export mode existed lack this column.
    if !table_has_column(&conn, "OC_vakken", "OCV_Export")? {
        conn.execute(
            "ALTER TABLE OC_vakken ADD COLUMN OCV_Export TEXT DEFAULT '0'",
            [],
        )?;
    }

    conn.execute(
        "CREATE TABLE IF NOT EXISTS OC_werk(
            OCW_ID INTEGER PRIMARY KEY,
            OCW_Naam TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS OC_toetsen(
            OCT_ID INTEGER PRIMARY KEY,
            OCT_Jaar INTEGER NOT NULL,
            OCT_Klas INTEGER,
            OCT_Vak INTEGER,
            OCT_Type INTEGER,
            OCT_Code TEXT,
            OCT_Omschrijving TEXT,
            OCT_Domein TEXT,
            OCT_Week INTEGER,
            OCT_Lesweek INTEGER,
            OCT_InleverDatum INTEGER,
            OCT_Datum INTEGER,
            OCT_Periode INTEGER,
            OCT_SoortWerk INTEGER,
            OCT_Tijd INTEGER,
            OCT_Weging_ED3 INTEGER,
            OCT_Weging_ED4 INTEGER,
            OCT_Weging_ED5 INTEGER,
            OCT_Weging_ED6 INTEGER,
            OCT_Weging_R4 INTEGER,
            OCT_Pct INTEGER,
            OCT_Herkansbaar INTEGER,
            OCT_Voetnoot TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_toetsen_jaar_klas ON OC_toetsen(OCT_Jaar, OCT_Klas)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_toetsen_vak ON OC_toetsen(OCT_Vak)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS OC_overstap(
            OCO_ID INTEGER PRIMARY KEY,
            OCO_Jaar INTEGER NOT NULL,
            OCO_Klas INTEGER,
            OCO_Vak INTEGER,
            OCO_Weging_ED4 INTEGER,
            OCO_Oudetoets INTEGER,
            OCO_Koppeltoets INTEGER,
            OCO_Actie INTEGER
        )",
        [],
    )?;
    if !table_has_column(&conn, "OC_overstap", "OCO_Koppeltoets")? {
        conn.execute("ALTER TABLE OC_overstap ADD COLUMN OCO_Koppeltoets INTEGER", [])?;
    }
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_overstap_jaar_klas ON OC_overstap(OCO_Jaar, OCO_Klas)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS OC_voetnoot(
            OCVN_ID INTEGER PRIMARY KEY,
            OCVN_Vak INTEGER,
            OCVN_Noot TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS OC_users(
            OCU_ID INTEGER PRIMARY KEY,
            OCU_Naam TEXT,
            OCU_Afkorting TEXT,
            OCU_Access INTEGER,
            OCU_Sector INTEGER
        )",
        [],
    )?;

    Ok(conn)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
