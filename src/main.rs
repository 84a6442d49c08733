use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rusqlite::Connection;

use bluebook_crossref::{
    count_bluebook, count_fellowship, insert_bluebook, insert_fellowship, load_bluebook,
    load_fellowship, record_import_batch, run_crosscheck, setup_database, ImportBatch, MatchEngine,
    MatchReport, VERSION,
};

const DEFAULT_DB: &str = "bluebook_crossref.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(&args[2..]),
        Some("match") => run_match(&args[2..]),
        Some("crosscheck") => run_crosscheck_cmd(&args[2..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    eprintln!("bluebook-crossref {VERSION}");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  bluebook-crossref import <bluebook.csv> <fellowship.xlsx> [db]");
    eprintln!("      Ingest both snapshots into the SQLite store (idempotent)");
    eprintln!("  bluebook-crossref match <bluebook.csv> <fellowship.xlsx> [--csv OUT] [--json OUT]");
    eprintln!("      Match in memory and report to console, optionally export");
    eprintln!("  bluebook-crossref crosscheck [db]");
    eprintln!("      Diff the SQL join against the match engine over the store");
}

// ============================================================================
// IMPORT
// ============================================================================

fn run_import(args: &[String]) -> Result<()> {
    let Some(bluebook_path) = args.first().map(Path::new) else {
        print_usage();
        return Ok(());
    };
    let fellowship_path = args.get(1).map(Path::new);
    let db_path = args.get(2).cloned().unwrap_or_else(|| DEFAULT_DB.into());

    println!("🗄️  Importing snapshots into {db_path}");

    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    // Blue Book CSV
    println!("\n📂 Loading Blue Book snapshot...");
    match load_bluebook(bluebook_path)? {
        Some(ingested) => {
            let outcome = insert_bluebook(&conn, &ingested.records)?;
            let batch = ImportBatch::new(
                &bluebook_path.display().to_string(),
                "bluebook",
                outcome,
                ingested.dropped_rows,
            );
            record_import_batch(&conn, &batch)?;
            println!("✓ {}", batch.summary());
        }
        None => {
            println!("  Skipping: {} not found", bluebook_path.display());
        }
    }

    // Fellowship spreadsheet
    println!("\n📂 Loading Fellowship snapshot...");
    match fellowship_path {
        Some(path) => match load_fellowship(path)? {
            Some(ingested) => {
                let outcome = insert_fellowship(&conn, &ingested.records)?;
                let batch = ImportBatch::new(
                    &path.display().to_string(),
                    "fellowship",
                    outcome,
                    ingested.dropped_rows,
                );
                record_import_batch(&conn, &batch)?;
                println!("✓ {}", batch.summary());
            }
            None => {
                println!("  Skipping: {} not found", path.display());
                println!("  Place the fellowship roster there to import it.");
            }
        },
        None => println!("  Skipping: no fellowship snapshot given"),
    }

    println!("\n🔍 Verifying store...");
    println!(
        "✓ Store contains {} Blue Book rows, {} Fellowship rows",
        count_bluebook(&conn)?,
        count_fellowship(&conn)?
    );

    Ok(())
}

// ============================================================================
// MATCH
// ============================================================================

fn run_match(args: &[String]) -> Result<()> {
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let (Some(bluebook_path), Some(fellowship_path)) =
        (positional.first().map(|s| Path::new(s.as_str())), positional.get(1).map(|s| Path::new(s.as_str())))
    else {
        print_usage();
        return Ok(());
    };

    let csv_out = flag_value(args, "--csv");
    let json_out = flag_value(args, "--json");

    println!("Loading Blue Book snapshot...");
    let Some(bluebook) = load_bluebook(bluebook_path)? else {
        println!("  Skipping: {} not found", bluebook_path.display());
        return Ok(());
    };
    println!(
        "  Loaded {} representatives ({} rows dropped)",
        bluebook.records.len(),
        bluebook.dropped_rows
    );

    println!("Loading Fellowship snapshot...");
    let Some(fellowship) = load_fellowship(fellowship_path)? else {
        println!("  Skipping: {} not found", fellowship_path.display());
        println!("\nTo run matching, place the fellowship roster at that path.");
        return Ok(());
    };
    println!(
        "  Loaded {} alumni ({} rows dropped)",
        fellowship.records.len(),
        fellowship.dropped_rows
    );

    println!("\nFinding matches...");
    let matches = MatchEngine::new().find_matches(&fellowship.records, &bluebook.records);
    let report = MatchReport::new(matches, fellowship.records.len(), bluebook.records.len());
    println!("  Found {} matches\n", report.matches.len());

    print!("{}", report.render_console());

    if let Some(path) = csv_out {
        report.write_csv_file(&path)?;
        println!("✓ Saved CSV to {}", path.display());
    }
    if let Some(path) = json_out {
        report.write_json_file(&path)?;
        println!("✓ Saved JSON to {}", path.display());
    }

    Ok(())
}

/// Value of `--flag PATH`, if present.
fn flag_value(args: &[String], flag: &str) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

// ============================================================================
// CROSSCHECK
// ============================================================================

fn run_crosscheck_cmd(args: &[String]) -> Result<()> {
    let db_path = args.first().cloned().unwrap_or_else(|| DEFAULT_DB.into());

    if !Path::new(&db_path).exists() {
        println!("Skipping: store {db_path} not found");
        println!("Run: bluebook-crossref import <bluebook.csv> <fellowship.xlsx>");
        return Ok(());
    }

    let conn = Connection::open(&db_path)?;

    println!("Running SQL join...");
    println!("Running match engine...");
    let report = run_crosscheck(&conn)?;

    println!("\n{}", "=".repeat(50));
    println!("{}", report.summary());

    Ok(())
}
