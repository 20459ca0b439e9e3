//! Seeds the built-in Portuguese course into an LMDB document store.
//!
//! Usage: `load_course [db-name]` (default `course_seed`, stored in `<db-name>.lmdb`).
//! Log verbosity follows `RUST_LOG`, defaulting to `info`.

use std::process::ExitCode;

use course_seed_core::course_data::portuguese_course;
use course_seed_core::loader::load;
use course_seed_core::local_db_state::LmdbDocumentStore;
use log::{error, info, LevelFilter};

const DEFAULT_DB_NAME: &str = "course_seed";

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let db_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

    match run(&db_name) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let course = portuguese_course()?;
    let mut store = LmdbDocumentStore::init(db_name)?;

    let summary = load(&course, &store)?;
    store.close_database()?;

    info!("Total: {summary} ({} documents)", summary.documents());
    Ok(())
}
