// Blue Book / Fellowship Cross-Reference - Core Library
// Exposes all modules for use in the CLI and tests

pub mod crosscheck;
pub mod db;
pub mod ingest;
pub mod matcher;
pub mod normalize;
pub mod records;
pub mod report;

// Re-export commonly used types
pub use crosscheck::{run_crosscheck, sql_match_keys, CrossCheckReport, CrossCheckResult};
pub use db::{
    count_bluebook, count_fellowship, get_all_bluebook, get_all_fellowship, get_import_batches,
    insert_bluebook, insert_fellowship, record_import_batch, setup_database, ImportBatch,
    InsertOutcome,
};
pub use ingest::{load_bluebook, load_fellowship, read_bluebook, read_fellowship_csv, Ingested};
pub use matcher::{MatchEngine, MatchKey};
pub use normalize::{first_name_prefix, normalize};
pub use records::{BlueBookRecord, FellowshipRecord, MatchRecord, ACTIVE_STATUS};
pub use report::MatchReport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
