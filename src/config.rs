use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(name = "ptaexport", version, about = "Exports PTA documents from the school store")]
pub struct Config {
    /// SQLite store holding the legacy OC_* tables.
    #[clap(long = "db", env = "PTA_DB", default_value = "pta.sqlite3", global = true)]
    pub db_path: PathBuf,

    /// Log filter, e.g. `info` or `ptaexport=debug`. `RUST_LOG` wins when set.
    #[clap(long = "log", env = "PTA_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Write `{year}-{short}.docx` for one grade level
    Export {
        year: i64,
        grade_level_id: i64,

        #[clap(long = "out", env = "PTA_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// List the grade levels that can be exported
    GradeLevels,
    /// Answer JSON-lines requests on stdin/stdout
    Serve,
}
