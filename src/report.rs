// 📋 Reporter - render matches to console, CSV and JSON
// Console output is for reading, CSV for spreadsheets (fixed column
// order), JSON for downstream tooling (matches plus run metadata).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::MatchRecord;

const BANNER_WIDTH: usize = 100;

/// One matching run's output: the match set plus run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub generated_at: DateTime<Utc>,
    pub fellowship_rows: usize,
    pub bluebook_rows: usize,
    pub matches: Vec<MatchRecord>,
}

impl MatchReport {
    pub fn new(matches: Vec<MatchRecord>, fellowship_rows: usize, bluebook_rows: usize) -> Self {
        MatchReport {
            generated_at: Utc::now(),
            fellowship_rows,
            bluebook_rows,
            matches,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} matches ({} alumni × {} representatives)",
            self.matches.len(),
            self.fellowship_rows,
            self.bluebook_rows
        )
    }

    // ========================================================================
    // CONSOLE
    // ========================================================================

    /// Banner plus one block per match:
    ///
    ///   MWANGI, John (1979, Kenya)
    ///     Now: H.E. Mr. Johnathan Mwangi - Permanent Representative (Ambassador)
    pub fn render_console(&self) -> String {
        let mut out = String::new();
        let banner = "=".repeat(BANNER_WIDTH);

        out.push_str(&banner);
        out.push('\n');
        out.push_str("MATCHES: Fellowship Alumni Currently in the Blue Book\n");
        out.push_str(&banner);
        out.push('\n');

        for m in &self.matches {
            let year = m
                .fellowship_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "?".to_string());

            out.push_str(&format!(
                "\n{}, {} ({}, {})\n",
                m.fellowship_last_name, m.fellowship_first_name, year, m.fellowship_country
            ));
            out.push_str(&format!(
                "  Now: {} {} {} - {} ({})\n",
                m.bluebook_title,
                m.bluebook_first_name,
                m.bluebook_last_name,
                m.bluebook_function,
                m.bluebook_rank
            ));
        }

        out.push_str(&format!("\n{}\n", self.summary()));
        out
    }

    // ========================================================================
    // CSV
    // ========================================================================

    /// CSV with the twelve match columns, fellowship_* then bluebook_*.
    /// Header order comes from the MatchRecord field order.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for m in &self.matches {
            wtr.serialize(m).context("Failed to serialize match row")?;
        }
        wtr.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_csv(file)
    }

    // ========================================================================
    // JSON
    // ========================================================================

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
    }

    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(self.to_json()?.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match() -> MatchRecord {
        MatchRecord {
            fellowship_year: Some(1979),
            fellowship_country: "Kenya".to_string(),
            fellowship_salutation: "Mr.".to_string(),
            fellowship_last_name: "Mwangi".to_string(),
            fellowship_first_name: "John".to_string(),
            bluebook_country: "KENYA".to_string(),
            bluebook_title: "H.E. Mr.".to_string(),
            bluebook_first_name: "Johnathan".to_string(),
            bluebook_last_name: "MWANGI".to_string(),
            bluebook_rank: "Ambassador".to_string(),
            bluebook_function: "Permanent Representative".to_string(),
            bluebook_status: "Active".to_string(),
        }
    }

    #[test]
    fn test_csv_header_column_order() {
        let report = MatchReport::new(vec![sample_match()], 1, 1);

        let mut buffer = Vec::new();
        report.write_csv(&mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "fellowship_year,fellowship_country,fellowship_salutation,\
             fellowship_last_name,fellowship_first_name,bluebook_country,\
             bluebook_title,bluebook_first_name,bluebook_last_name,\
             bluebook_rank,bluebook_function,bluebook_status"
        );

        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("1979,Kenya,Mr.,Mwangi,John,"));
    }

    #[test]
    fn test_csv_null_year_serializes_empty() {
        let mut m = sample_match();
        m.fellowship_year = None;
        let report = MatchReport::new(vec![m], 1, 1);

        let mut buffer = Vec::new();
        report.write_csv(&mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();

        assert!(csv.lines().nth(1).unwrap().starts_with(",Kenya,"));
    }

    #[test]
    fn test_console_rendering() {
        let report = MatchReport::new(vec![sample_match()], 120, 900);
        let text = report.render_console();

        assert!(text.contains("MATCHES: Fellowship Alumni Currently in the Blue Book"));
        assert!(text.contains("Mwangi, John (1979, Kenya)"));
        assert!(text.contains(
            "Now: H.E. Mr. Johnathan MWANGI - Permanent Representative (Ambassador)"
        ));
        assert!(text.contains("1 matches (120 alumni × 900 representatives)"));
    }

    #[test]
    fn test_console_rendering_unknown_year() {
        let mut m = sample_match();
        m.fellowship_year = None;
        let report = MatchReport::new(vec![m], 1, 1);

        assert!(report.render_console().contains("Mwangi, John (?, Kenya)"));
    }

    #[test]
    fn test_json_roundtrip() {
        let report = MatchReport::new(vec![sample_match()], 1, 1);
        let json = report.to_json().unwrap();

        let parsed: MatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.matches, report.matches);
        assert_eq!(parsed.fellowship_rows, 1);
    }
}
