mod config;
mod constants;
mod db;
mod docx;
mod error;
mod export;
mod ipc;
mod model;
mod permissions;
mod render;
mod store;
mod table;
mod telemetry;
mod text;
mod weighting;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};

use config::{Command, Config};
use error::PtaError;

fn main() -> ExitCode {
    let cfg = Config::parse();
    if let Err(e) = telemetry::init(&cfg.log_level) {
        eprintln!("{e}");
        return ExitCode::from(1);
    }

    match cfg.command {
        Command::Export {
            year,
            grade_level_id,
            ref out_dir,
        } => run_export(&cfg.db_path, year, grade_level_id, out_dir),
        Command::GradeLevels => match list_grade_levels(&mut io::stdout().lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("cannot write grade levels: {e}");
                eprintln!("error: {e}");
                ExitCode::from(1)
            }
        },
        Command::Serve => {
            serve(&cfg.db_path);
            ExitCode::SUCCESS
        }
    }
}

fn list_grade_levels(out: &mut impl Write) -> io::Result<()> {
    for g in constants::GradeLevel::ALL {
        writeln!(out, "{}\t{}\t{}", g.id(), g.short_code(), g.label())?;
    }
    out.flush()
}

fn run_export(db_path: &Path, year: i64, grade_level_id: i64, out_dir: &Path) -> ExitCode {
    // Unknown ids fail before the store is opened.
    let grade_level = match export::resolve_grade_level(grade_level_id) {
        Ok(g) => g,
        Err(e) => return fail(&e),
    };
    let conn = match db::open_db(db_path) {
        Ok(c) => c,
        Err(e) => {
            error!(path = %db_path.display(), "cannot open store: {e:#}");
            eprintln!("cannot open store {}: {e:#}", db_path.display());
            return ExitCode::from(1);
        }
    };

    let written = export::export_document(&conn, year, grade_level)
        .and_then(|doc| export::write_document(&doc, out_dir));
    match written {
        Ok(path) => {
            info!(path = %path.display(), "document written");
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &PtaError) -> ExitCode {
    if e.is_input_error() {
        warn!(code = e.code(), "{e}");
    } else {
        error!(code = e.code(), "{e}");
    }
    eprintln!("error: {e}");
    ExitCode::from(e.exit_code() as u8)
}

fn serve(db_path: &Path) {
    let mut state = ipc::AppState::empty();
    match db::open_db(db_path) {
        Ok(conn) => {
            state.store_path = Some(db_path.to_path_buf());
            state.db = Some(conn);
        }
        Err(e) => warn!(path = %db_path.display(), "starting without a store: {e:#}"),
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => ipc::bad_json(e.to_string()),
        };
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
