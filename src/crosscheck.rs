// ⚖️ Cross-check - validate the matcher against a declarative SQL join
// Re-expresses the join semantics as one SQL query over the store and
// compares the resulting match-key sets. The in-memory engine stays the
// authoritative implementation; a disagreement here is surfaced as a
// symmetric-difference report and never auto-resolved.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{get_all_bluebook, get_all_fellowship};
use crate::matcher::{MatchEngine, MatchKey};
use crate::records::ACTIVE_STATUS;

// ============================================================================
// CROSS-CHECK RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CrossCheckResult {
    /// Both formulations found identical match-key sets
    Agreement { total: usize },

    /// The formulations disagree; both sides of the symmetric difference
    Disagreement {
        only_in_sql: Vec<MatchKey>,
        only_in_engine: Vec<MatchKey>,
    },
}

impl CrossCheckResult {
    pub fn is_agreement(&self) -> bool {
        matches!(self, CrossCheckResult::Agreement { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossCheckReport {
    pub result: CrossCheckResult,
    pub sql_matches: usize,
    pub engine_matches: usize,
    pub checked_at: DateTime<Utc>,
}

impl CrossCheckReport {
    pub fn is_agreement(&self) -> bool {
        self.result.is_agreement()
    }

    /// Human-readable verdict, one block
    pub fn summary(&self) -> String {
        match &self.result {
            CrossCheckResult::Agreement { total } => format!(
                "✓ VALIDATED: both formulations found identical matches\n  Total matches: {total}"
            ),
            CrossCheckResult::Disagreement {
                only_in_sql,
                only_in_engine,
            } => {
                let mut lines = vec!["✗ MISMATCH DETECTED".to_string()];
                lines.push(format!(
                    "  SQL join: {} matches, engine: {} matches",
                    self.sql_matches, self.engine_matches
                ));
                if !only_in_sql.is_empty() {
                    lines.push(format!("  Only in SQL ({}):", only_in_sql.len()));
                    for key in only_in_sql {
                        lines.push(format!("    {key}"));
                    }
                }
                if !only_in_engine.is_empty() {
                    lines.push(format!("  Only in engine ({}):", only_in_engine.len()));
                    for key in only_in_engine {
                        lines.push(format!("    {key}"));
                    }
                }
                lines.join("\n")
            }
        }
    }
}

// ============================================================================
// SQL FORMULATION
// ============================================================================

/// The join as one declarative query. Mirrors the engine's four conditions:
/// normalized country + surname equality, non-empty 4-char first-name
/// prefix equality, exact Active status.
const MATCH_QUERY: &str = "
    SELECT f.country, f.last_name, f.first_name
    FROM fellowship f
    JOIN bluebook b ON
        UPPER(TRIM(f.country)) = UPPER(TRIM(b.country))
        AND UPPER(TRIM(f.last_name)) = UPPER(TRIM(b.last_name))
        AND UPPER(SUBSTR(TRIM(f.first_name), 1, 4)) = UPPER(SUBSTR(TRIM(b.first_name), 1, 4))
        AND TRIM(f.first_name) <> ''
        AND TRIM(b.first_name) <> ''
    WHERE b.status = ?1
    ORDER BY f.country, f.last_name
";

/// Match keys found by the SQL formulation of the join.
pub fn sql_match_keys(conn: &Connection) -> Result<BTreeSet<MatchKey>> {
    let mut stmt = conn.prepare(MATCH_QUERY)?;

    let keys = stmt
        .query_map([ACTIVE_STATUS], |row| {
            let country: String = row.get(0)?;
            let last_name: String = row.get(1)?;
            let first_name: String = row.get(2)?;
            Ok(MatchKey::from_fields(&country, &last_name, &first_name))
        })?
        .collect::<Result<BTreeSet<_>, _>>()?;

    Ok(keys)
}

// ============================================================================
// CROSS-CHECK
// ============================================================================

/// Run both formulations of the join over the stored snapshots and diff
/// their match-key sets.
pub fn run_crosscheck(conn: &Connection) -> Result<CrossCheckReport> {
    let sql_keys = sql_match_keys(conn)?;

    let fellowship = get_all_fellowship(conn)?;
    let bluebook = get_all_bluebook(conn)?;
    let engine_keys = MatchEngine::new().match_keys(&fellowship, &bluebook);

    let result = if sql_keys == engine_keys {
        CrossCheckResult::Agreement {
            total: sql_keys.len(),
        }
    } else {
        CrossCheckResult::Disagreement {
            only_in_sql: sql_keys.difference(&engine_keys).cloned().collect(),
            only_in_engine: engine_keys.difference(&sql_keys).cloned().collect(),
        }
    };

    Ok(CrossCheckReport {
        result,
        sql_matches: sql_keys.len(),
        engine_matches: engine_keys.len(),
        checked_at: Utc::now(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
