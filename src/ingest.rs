// 📂 Ingest - snapshot loading
// Blue Book arrives as the extractor's CSV export (header-mapped columns);
// the Fellowship roster arrives as a spreadsheet (first worksheet, positional
// columns: Year, Region, Country, Salutation, LastName, FirstName), with a
// CSV export of the same layout accepted as a convenience.
//
// Policies:
// - MissingSource: absent file → Ok(None), caller prints a skip message
// - MalformedRow: missing country/surname → row dropped silently, counted

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader as SpreadsheetReader};

use crate::records::{BlueBookRecord, FellowshipRecord};

/// One loaded snapshot plus ingestion statistics.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub dropped_rows: usize,
}

// ============================================================================
// BLUE BOOK (CSV)
// ============================================================================

/// Load the Blue Book CSV snapshot. Returns Ok(None) if the file is absent.
pub fn load_bluebook(path: &Path) -> Result<Option<Ingested<BlueBookRecord>>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open Blue Book snapshot {}", path.display()))?;
    Ok(Some(read_bluebook(file)?))
}

/// Parse Blue Book rows from any reader. Column mapping lives on the serde
/// renames of BlueBookRecord; extra snapshot columns are ignored.
pub fn read_bluebook<R: Read>(reader: R) -> Result<Ingested<BlueBookRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut records = Vec::new();
    let mut dropped_rows = 0;

    for result in rdr.deserialize() {
        let record: BlueBookRecord = result.context("Failed to deserialize Blue Book row")?;
        if record.is_valid() {
            records.push(record);
        } else {
            dropped_rows += 1;
        }
    }

    Ok(Ingested {
        records,
        dropped_rows,
    })
}

// ============================================================================
// FELLOWSHIP (XLSX or CSV)
// ============================================================================

/// Load the Fellowship roster snapshot. Returns Ok(None) if the file is
/// absent — the historical source is not always present, and its absence is
/// an expected, recoverable condition.
pub fn load_fellowship(path: &Path) -> Result<Option<Ingested<FellowshipRecord>>> {
    if !path.exists() {
        return Ok(None);
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let ingested = if extension == "csv" {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Fellowship snapshot {}", path.display()))?;
        read_fellowship_csv(file)?
    } else {
        read_fellowship_spreadsheet(path)?
    };

    Ok(Some(ingested))
}

/// Parse the roster from the first worksheet of a spreadsheet file
/// (xlsx, xls, xlsb, ods — whatever calamine auto-detects).
fn read_fellowship_spreadsheet(path: &Path) -> Result<Ingested<FellowshipRecord>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet {}", path.display()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first_sheet = sheet_names
        .first()
        .context("Spreadsheet contains no sheets")?;

    let range = workbook
        .worksheet_range(first_sheet)
        .with_context(|| format!("Failed to read sheet '{first_sheet}'"))?;

    let mut records = Vec::new();
    let mut dropped_rows = 0;

    for row in range.rows() {
        if is_header_row(&cell_to_string(row.first())) {
            continue;
        }

        let record = FellowshipRecord {
            year: cell_to_year(row.first()),
            region: cell_to_string(row.get(1)),
            country: cell_to_string(row.get(2)),
            salutation: cell_to_string(row.get(3)),
            last_name: cell_to_string(row.get(4)),
            first_name: cell_to_string(row.get(5)),
        };

        if record.is_valid() {
            records.push(record);
        } else {
            dropped_rows += 1;
        }
    }

    Ok(Ingested {
        records,
        dropped_rows,
    })
}

/// Parse the roster from a CSV export with the same positional columns.
pub fn read_fellowship_csv<R: Read>(reader: R) -> Result<Ingested<FellowshipRecord>> {
    // Positional columns, so no header mapping; the header row (if present)
    // is recognized by its literal "Year" cell instead.
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut dropped_rows = 0;

    for result in rdr.records() {
        let row = result.context("Failed to read Fellowship CSV row")?;
        let field = |i: usize| row.get(i).unwrap_or("").trim().to_string();

        if is_header_row(&field(0)) {
            continue;
        }

        let record = FellowshipRecord {
            year: parse_year(&field(0)),
            region: field(1),
            country: field(2),
            salutation: field(3),
            last_name: field(4),
            first_name: field(5),
        };

        if record.is_valid() {
            records.push(record);
        } else {
            dropped_rows += 1;
        }
    }

    Ok(Ingested {
        records,
        dropped_rows,
    })
}

// ============================================================================
// CELL HELPERS
// ============================================================================

/// A row whose Year column literally reads "Year" is the header.
fn is_header_row(year_cell: &str) -> bool {
    year_cell == "Year"
}

fn cell_to_string(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.trim().to_string(),
        Some(Data::Float(n)) => {
            // Integers without a trailing ".0"
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Some(Data::Int(n)) => n.to_string(),
        Some(Data::Bool(b)) => b.to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Year cell → integer. Spreadsheets store years as floats ("1979.0");
/// anything non-numeric yields None and the row is kept with a null year.
fn cell_to_year(cell: Option<&Data>) -> Option<i64> {
    match cell {
        Some(Data::Float(n)) => Some(*n as i64),
        Some(Data::Int(n)) => Some(*n),
        Some(Data::String(s)) => parse_year(s),
        _ => None,
    }
}

fn parse_year(s: &str) -> Option<i64> {
    s.trim().parse::<f64>().ok().map(|v| v as i64)
}

// ============================================================================
// TESTS
// ============================================================================
