// 🗄️ Store - SQLite persistence for both snapshots
// An intermediate cache between ingestion and matching, not a system of
// record: every table is rebuilt from snapshots and matching works off
// in-memory slices just as well. Re-importing the same snapshot is
// idempotent — each row carries a UNIQUE content hash.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::records::{BlueBookRecord, FellowshipRecord};

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bluebook (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            row_hash TEXT UNIQUE NOT NULL,
            country TEXT NOT NULL,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            title TEXT NOT NULL,
            rank TEXT NOT NULL,
            function TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS fellowship (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            row_hash TEXT UNIQUE NOT NULL,
            year INTEGER,
            region TEXT NOT NULL,
            country TEXT NOT NULL,
            salutation TEXT NOT NULL,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Import provenance: one row per snapshot ingestion run
    conn.execute(
        "CREATE TABLE IF NOT EXISTS import_batches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id TEXT UNIQUE NOT NULL,
            source_file TEXT NOT NULL,
            target_table TEXT NOT NULL,
            inserted INTEGER NOT NULL,
            duplicates INTEGER NOT NULL,
            dropped_rows INTEGER NOT NULL,
            imported_at TEXT NOT NULL
        )",
        [],
    )?;

    // Join-key indexes
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bluebook_key ON bluebook(country, last_name)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bluebook_status ON bluebook(status)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_fellowship_key ON fellowship(country, last_name)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW HASHES
// ============================================================================

// Content hashes for idempotent re-import. Fields are joined with a unit
// separator so ("ab","c") and ("a","bc") hash differently.

fn bluebook_row_hash(record: &BlueBookRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(
        [
            record.country.as_str(),
            record.last_name.as_str(),
            record.first_name.as_str(),
            record.title.as_str(),
            record.rank.as_str(),
            record.function.as_str(),
            record.status.as_str(),
        ]
        .join("\u{1f}"),
    );
    format!("{:x}", hasher.finalize())
}

fn fellowship_row_hash(record: &FellowshipRecord) -> String {
    let year = record.year.map(|y| y.to_string()).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(
        [
            year.as_str(),
            record.region.as_str(),
            record.country.as_str(),
            record.salutation.as_str(),
            record.last_name.as_str(),
            record.first_name.as_str(),
        ]
        .join("\u{1f}"),
    );
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// IMPORT BATCHES
// ============================================================================

/// Outcome of inserting one snapshot's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Provenance for one snapshot ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub source_file: String,
    pub target_table: String,
    pub inserted: usize,
    pub duplicates: usize,
    pub dropped_rows: usize,
    pub imported_at: DateTime<Utc>,
}

impl ImportBatch {
    pub fn new(
        source_file: &str,
        target_table: &str,
        outcome: InsertOutcome,
        dropped_rows: usize,
    ) -> Self {
        ImportBatch {
            batch_id: uuid::Uuid::new_v4().to_string(),
            source_file: source_file.to_string(),
            target_table: target_table.to_string(),
            inserted: outcome.inserted,
            duplicates: outcome.duplicates,
            dropped_rows,
            imported_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} → {}: {} inserted, {} duplicates skipped, {} rows dropped",
            self.source_file, self.target_table, self.inserted, self.duplicates, self.dropped_rows
        )
    }
}

pub fn record_import_batch(conn: &Connection, batch: &ImportBatch) -> Result<()> {
    conn.execute(
        "INSERT INTO import_batches (
            batch_id, source_file, target_table, inserted, duplicates, dropped_rows, imported_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            batch.batch_id,
            batch.source_file,
            batch.target_table,
            batch.inserted as i64,
            batch.duplicates as i64,
            batch.dropped_rows as i64,
            batch.imported_at.to_rfc3339(),
        ],
    )?;

    Ok(())
}

pub fn get_import_batches(conn: &Connection) -> Result<Vec<ImportBatch>> {
    let mut stmt = conn.prepare(
        "SELECT batch_id, source_file, target_table, inserted, duplicates, dropped_rows, imported_at
         FROM import_batches
         ORDER BY imported_at DESC",
    )?;

    let batches = stmt
        .query_map([], |row| {
            let imported_at: String = row.get(6)?;
            Ok(ImportBatch {
                batch_id: row.get(0)?,
                source_file: row.get(1)?,
                target_table: row.get(2)?,
                inserted: row.get::<_, i64>(3)? as usize,
                duplicates: row.get::<_, i64>(4)? as usize,
                dropped_rows: row.get::<_, i64>(5)? as usize,
                imported_at: DateTime::parse_from_rfc3339(&imported_at)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(batches)
}

// ============================================================================
// INSERTS
// ============================================================================

pub fn insert_bluebook(conn: &Connection, records: &[BlueBookRecord]) -> Result<InsertOutcome> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for record in records {
        let hash = bluebook_row_hash(record);

        let result = conn.execute(
            "INSERT INTO bluebook (
                row_hash, country, last_name, first_name, title, rank, function, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                hash,
                record.country,
                record.last_name,
                record.first_name,
                record.title,
                record.rank,
                record.function,
                record.status,
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(InsertOutcome {
        inserted,
        duplicates,
    })
}

pub fn insert_fellowship(conn: &Connection, records: &[FellowshipRecord]) -> Result<InsertOutcome> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for record in records {
        let hash = fellowship_row_hash(record);

        let result = conn.execute(
            "INSERT INTO fellowship (
                row_hash, year, region, country, salutation, last_name, first_name
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                hash,
                record.year,
                record.region,
                record.country,
                record.salutation,
                record.last_name,
                record.first_name,
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(InsertOutcome {
        inserted,
        duplicates,
    })
}

// ============================================================================
// READBACK
// ============================================================================

pub fn get_all_bluebook(conn: &Connection) -> Result<Vec<BlueBookRecord>> {
    let mut stmt = conn.prepare(
        "SELECT country, last_name, first_name, title, rank, function, status
         FROM bluebook
         ORDER BY id",
    )?;

    let records = stmt
        .query_map([], |row| {
            Ok(BlueBookRecord {
                country: row.get(0)?,
                last_name: row.get(1)?,
                first_name: row.get(2)?,
                title: row.get(3)?,
                rank: row.get(4)?,
                function: row.get(5)?,
                status: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn get_all_fellowship(conn: &Connection) -> Result<Vec<FellowshipRecord>> {
    let mut stmt = conn.prepare(
        "SELECT year, region, country, salutation, last_name, first_name
         FROM fellowship
         ORDER BY id",
    )?;

    let records = stmt
        .query_map([], |row| {
            Ok(FellowshipRecord {
                year: row.get(0)?,
                region: row.get(1)?,
                country: row.get(2)?,
                salutation: row.get(3)?,
                last_name: row.get(4)?,
                first_name: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn count_bluebook(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM bluebook", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_fellowship(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM fellowship", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
