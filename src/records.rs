// 📇 Record Types - Blue Book, Fellowship, Match
// The three tabular shapes flowing through the pipeline:
// snapshot rows in, matched pairs out. All immutable after ingestion.

use serde::{Deserialize, Serialize};

/// The one Blue Book status value that participates in matching.
/// Compared exactly, case-sensitive, never normalized.
pub const ACTIVE_STATUS: &str = "Active";

// ============================================================================
// BLUE BOOK RECORD
// ============================================================================

/// One currently accredited diplomatic representative, as exported by the
/// registry extractor. Serde renames map the extractor's CSV column names;
/// extra columns in the snapshot are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueBookRecord {
    #[serde(rename = "_country", default)]
    pub country: String,

    #[serde(rename = "BB_LastName", default)]
    pub last_name: String,

    #[serde(rename = "BB_FirstName", default)]
    pub first_name: String,

    #[serde(rename = "BB_Title", default)]
    pub title: String,

    #[serde(rename = "BB_Dipl_Rank", default)]
    pub rank: String,

    #[serde(rename = "BB_Function", default)]
    pub function: String,

    #[serde(rename = "BB_Status", default)]
    pub status: String,
}

impl BlueBookRecord {
    /// Required-field validation: country and surname must be present.
    /// Rows failing this are dropped at ingestion (MalformedRow policy).
    pub fn is_valid(&self) -> bool {
        !self.country.trim().is_empty() && !self.last_name.trim().is_empty()
    }

    /// Exact, case-sensitive status check.
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }
}

// ============================================================================
// FELLOWSHIP RECORD
// ============================================================================

/// One historical program alumnus from the Fellowship roster.
/// Source columns, in order: Year, Region, Country, Salutation,
/// LastName, FirstName.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FellowshipRecord {
    /// Fellowship year. A non-numeric Year cell yields None; the row is kept.
    pub year: Option<i64>,

    pub region: String,
    pub country: String,
    pub salutation: String,
    pub last_name: String,
    pub first_name: String,
}

impl FellowshipRecord {
    /// Required-field validation: country and surname must be present.
    pub fn is_valid(&self) -> bool {
        !self.country.trim().is_empty() && !self.last_name.trim().is_empty()
    }
}

// ============================================================================
// MATCH RECORD
// ============================================================================

/// One (alumnus, representative) pair judged to refer to the same person.
/// Field order here IS the export column order — csv::Writer serializes
/// struct fields in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub fellowship_year: Option<i64>,
    pub fellowship_country: String,
    pub fellowship_salutation: String,
    pub fellowship_last_name: String,
    pub fellowship_first_name: String,
    pub bluebook_country: String,
    pub bluebook_title: String,
    pub bluebook_first_name: String,
    pub bluebook_last_name: String,
    pub bluebook_rank: String,
    pub bluebook_function: String,
    pub bluebook_status: String,
}

impl MatchRecord {
    /// Combine one pair of source records. Fields are copied verbatim:
    /// the normalized keys are comparison-only and never stored.
    pub fn from_pair(fellowship: &FellowshipRecord, bluebook: &BlueBookRecord) -> Self {
        MatchRecord {
            fellowship_year: fellowship.year,
            fellowship_country: fellowship.country.clone(),
            fellowship_salutation: fellowship.salutation.clone(),
            fellowship_last_name: fellowship.last_name.clone(),
            fellowship_first_name: fellowship.first_name.clone(),
            bluebook_country: bluebook.country.clone(),
            bluebook_title: bluebook.title.clone(),
            bluebook_first_name: bluebook.first_name.clone(),
            bluebook_last_name: bluebook.last_name.clone(),
            bluebook_rank: bluebook.rank.clone(),
            bluebook_function: bluebook.function.clone(),
            bluebook_status: bluebook.status.clone(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bluebook(country: &str, last: &str, status: &str) -> BlueBookRecord {
        BlueBookRecord {
            country: country.to_string(),
            last_name: last.to_string(),
            first_name: "Jean".to_string(),
            title: "H.E. Mr.".to_string(),
            rank: "Ambassador".to_string(),
            function: "Permanent Representative".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_bluebook_validity() {
        assert!(bluebook("France", "Dupont", "Active").is_valid());
        assert!(!bluebook("", "Dupont", "Active").is_valid());
        assert!(!bluebook("France", "   ", "Active").is_valid());
    }

    #[test]
    fn test_active_is_case_sensitive() {
        assert!(bluebook("France", "Dupont", "Active").is_active());
        assert!(!bluebook("France", "Dupont", "ACTIVE").is_active());
        assert!(!bluebook("France", "Dupont", "active").is_active());
        assert!(!bluebook("France", "Dupont", "Departed").is_active());
    }

    #[test]
    fn test_fellowship_validity() {
        let record = FellowshipRecord {
            year: Some(1979),
            region: "Africa".to_string(),
            country: "Kenya".to_string(),
            salutation: "Mr.".to_string(),
            last_name: "Mwangi".to_string(),
            first_name: "John".to_string(),
        };
        assert!(record.is_valid());

        let missing_country = FellowshipRecord {
            country: "".to_string(),
            ..record.clone()
        };
        assert!(!missing_country.is_valid());

        // Year is optional: a row with no parseable year is still valid
        let no_year = FellowshipRecord {
            year: None,
            ..record
        };
        assert!(no_year.is_valid());
    }

    #[test]
    fn test_match_record_copies_fields_verbatim() {
        let fellowship = FellowshipRecord {
            year: Some(1979),
            region: "Africa".to_string(),
            country: " Kenya ".to_string(),
            salutation: "Mr.".to_string(),
            last_name: "Mwangi".to_string(),
            first_name: "John".to_string(),
        };
        let bb = bluebook("KENYA", "MWANGI", "Active");

        let m = MatchRecord::from_pair(&fellowship, &bb);

        // Original casing and whitespace survive into the match record
        assert_eq!(m.fellowship_country, " Kenya ");
        assert_eq!(m.bluebook_country, "KENYA");
        assert_eq!(m.fellowship_year, Some(1979));
        assert_eq!(m.bluebook_status, "Active");
    }
}
