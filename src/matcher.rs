// 🔍 Match Engine - join Fellowship alumni against Blue Book representatives
// Equi-join on (normalized country, normalized surname), refined by a
// 4-character first-name prefix filter, restricted to Active status.
//
// This is the single authoritative implementation of the join.
// crosscheck::run_crosscheck re-expresses it in SQL purely as a diagnostic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::normalize::{first_name_prefix, normalize};
use crate::records::{BlueBookRecord, FellowshipRecord, MatchRecord};

// ============================================================================
// MATCH KEY
// ============================================================================

/// Identity of one match under the join semantics: normalized country,
/// normalized surname, first-name prefix. Used by the cross-check to compare
/// result sets without caring about the non-key payload columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchKey {
    pub country: String,
    pub last_name: String,
    pub first_name_prefix: String,
}

impl MatchKey {
    /// Build a key from raw (un-normalized) field values.
    pub fn from_fields(country: &str, last_name: &str, first_name: &str) -> Self {
        MatchKey {
            country: normalize(country),
            last_name: normalize(last_name),
            first_name_prefix: first_name_prefix(first_name),
        }
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.country, self.last_name, self.first_name_prefix
        )
    }
}

// ============================================================================
// MATCH ENGINE
// ============================================================================

pub struct MatchEngine;

impl MatchEngine {
    pub fn new() -> Self {
        MatchEngine
    }

    /// Join the two snapshots and return every qualifying pair, sorted by
    /// (fellowship country, fellowship surname). Conditions, all required:
    ///
    /// 1. normalized countries equal
    /// 2. normalized surnames equal
    /// 3. first-name prefixes equal AND non-empty
    /// 4. Blue Book status exactly "Active"
    ///
    /// One Fellowship row can match several representatives and vice versa;
    /// every qualifying pair is emitted, with no deduplication and no
    /// best-match selection.
    pub fn find_matches(
        &self,
        fellowship: &[FellowshipRecord],
        bluebook: &[BlueBookRecord],
    ) -> Vec<MatchRecord> {
        // Bucket Active representatives by (country, surname) key.
        // The Active filter at index time is equivalent to filtering at
        // lookup time; indexing fewer rows is the cheaper of the two.
        let mut index: HashMap<(String, String), Vec<&BlueBookRecord>> = HashMap::new();
        for record in bluebook.iter().filter(|r| r.is_active()) {
            let key = (normalize(&record.country), normalize(&record.last_name));
            index.entry(key).or_default().push(record);
        }

        let mut matches = Vec::new();

        for person in fellowship {
            let prefix = first_name_prefix(&person.first_name);
            if prefix.is_empty() {
                // Two blank first names must not count as a match
                continue;
            }

            let key = (normalize(&person.country), normalize(&person.last_name));
            let Some(candidates) = index.get(&key) else {
                continue;
            };

            for candidate in candidates {
                if first_name_prefix(&candidate.first_name) == prefix {
                    matches.push(MatchRecord::from_pair(person, candidate));
                }
            }
        }

        // Fixed output order; sort is stable so ties keep input order
        matches.sort_by(|a, b| {
            a.fellowship_country
                .cmp(&b.fellowship_country)
                .then_with(|| a.fellowship_last_name.cmp(&b.fellowship_last_name))
        });

        matches
    }

    /// The match-key set for a run, for set-level comparison in crosscheck.
    pub fn match_keys(
        &self,
        fellowship: &[FellowshipRecord],
        bluebook: &[BlueBookRecord],
    ) -> std::collections::BTreeSet<MatchKey> {
        self.find_matches(fellowship, bluebook)
            .iter()
            .map(|m| {
                MatchKey::from_fields(
                    &m.fellowship_country,
                    &m.fellowship_last_name,
                    &m.fellowship_first_name,
                )
            })
            .collect()
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fellow(country: &str, last: &str, first: &str, year: i64) -> FellowshipRecord {
        FellowshipRecord {
            year: Some(year),
            region: "".to_string(),
            country: country.to_string(),
            salutation: "Mr.".to_string(),
            last_name: last.to_string(),
            first_name: first.to_string(),
        }
    }

    fn rep(country: &str, last: &str, first: &str, status: &str) -> BlueBookRecord {
        BlueBookRecord {
            country: country.to_string(),
            last_name: last.to_string(),
            first_name: first.to_string(),
            title: "H.E. Mr.".to_string(),
            rank: "Ambassador".to_string(),
            function: "Permanent Representative".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_match_is_case_insensitive_with_prefix() {
        // Scenario 1: prefixes "JOHN" == "JOHN" despite casing differences
        let engine = MatchEngine::new();
        let fellowship = vec![fellow("Kenya", "Mwangi", "John", 1979)];
        let bluebook = vec![rep("KENYA", "MWANGI", "Johnathan", "Active")];

        let matches = engine.find_matches(&fellowship, &bluebook);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].fellowship_year, Some(1979));
        assert_eq!(matches[0].bluebook_first_name, "Johnathan");
    }

    #[test]
    fn test_no_match_on_different_prefix() {
        // Scenario 2: "JANE" != "JOHN"
        let engine = MatchEngine::new();
        let fellowship = vec![fellow("Kenya", "Mwangi", "John", 1979)];
        let bluebook = vec![rep("KENYA", "MWANGI", "Jane", "Active")];

        assert!(engine.find_matches(&fellowship, &bluebook).is_empty());
    }

    #[test]
    fn test_no_match_on_inactive_status() {
        // Scenario 3: Departed representatives never match
        let engine = MatchEngine::new();
        let fellowship = vec![fellow("Kenya", "Mwangi", "John", 1979)];
        let bluebook = vec![rep("KENYA", "MWANGI", "Johnathan", "Departed")];

        assert!(engine.find_matches(&fellowship, &bluebook).is_empty());
    }

    #[test]
    fn test_empty_first_names_never_match() {
        // Scenario 4: two blank first names are NOT proof of identity
        let engine = MatchEngine::new();
        let fellowship = vec![fellow("Kenya", "Mwangi", "", 1979)];
        let bluebook = vec![rep("Kenya", "Mwangi", "", "Active")];

        assert!(engine.find_matches(&fellowship, &bluebook).is_empty());

        // Whitespace-only is the same as empty
        let fellowship = vec![fellow("Kenya", "Mwangi", "   ", 1979)];
        assert!(engine.find_matches(&fellowship, &bluebook).is_empty());
    }

    #[test]
    fn test_multiple_candidates_emit_multiple_matches() {
        // Scenario 5: two Active Duponts, one alumnus, exactly two matches
        let engine = MatchEngine::new();
        let fellowship = vec![fellow("France", "Dupont", "Jean", 1979)];
        let mut first_rep = rep("France", "Dupont", "Jean-Pierre", "Active");
        first_rep.function = "Permanent Representative".to_string();
        let mut second_rep = rep("France", "Dupont", "Jeanne", "Active");
        second_rep.function = "Deputy Permanent Representative".to_string();

        // "JEAN" is the common 4-char prefix of Jean, Jean-Pierre and Jeanne
        let matches = engine.find_matches(&fellowship, &[first_rep, second_rep]);

        assert_eq!(matches.len(), 2);
        assert_ne!(matches[0].bluebook_function, matches[1].bluebook_function);
    }

    #[test]
    fn test_duplicate_fellowship_rows_are_not_deduplicated() {
        let engine = MatchEngine::new();
        let fellowship = vec![
            fellow("Kenya", "Mwangi", "John", 1979),
            fellow("Kenya", "Mwangi", "John", 1979),
        ];
        let bluebook = vec![rep("Kenya", "Mwangi", "John", "Active")];

        // Two identical source rows produce two identical match records
        assert_eq!(engine.find_matches(&fellowship, &bluebook).len(), 2);
    }

    #[test]
    fn test_surname_and_country_must_match_exactly_after_normalization() {
        let engine = MatchEngine::new();
        let fellowship = vec![fellow("Kenya", "Mwangi", "John", 1979)];

        // Same surname, different country: no match
        let bluebook = vec![rep("Uganda", "Mwangi", "John", "Active")];
        assert!(engine.find_matches(&fellowship, &bluebook).is_empty());

        // Prefix matching applies to first names only, never surnames
        let bluebook = vec![rep("Kenya", "Mwangika", "John", "Active")];
        assert!(engine.find_matches(&fellowship, &bluebook).is_empty());
    }

    #[test]
    fn test_output_sorted_by_fellowship_country_then_surname() {
        let engine = MatchEngine::new();
        let fellowship = vec![
            fellow("Zambia", "Banda", "Mary", 1980),
            fellow("Austria", "Zimmer", "Karl", 1981),
            fellow("Austria", "Abel", "Hans", 1982),
        ];
        let bluebook = vec![
            rep("Zambia", "Banda", "Mary", "Active"),
            rep("Austria", "Zimmer", "Karl", "Active"),
            rep("Austria", "Abel", "Hans", "Active"),
        ];

        let matches = engine.find_matches(&fellowship, &bluebook);

        let order: Vec<(&str, &str)> = matches
            .iter()
            .map(|m| {
                (
                    m.fellowship_country.as_str(),
                    m.fellowship_last_name.as_str(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ("Austria", "Abel"),
                ("Austria", "Zimmer"),
                ("Zambia", "Banda"),
            ]
        );
    }

    #[test]
    fn test_determinism() {
        let engine = MatchEngine::new();
        let fellowship = vec![
            fellow("Kenya", "Mwangi", "John", 1979),
            fellow("France", "Dupont", "Jean", 1980),
        ];
        let bluebook = vec![
            rep("France", "Dupont", "Jean", "Active"),
            rep("Kenya", "Mwangi", "Johnathan", "Active"),
        ];

        let first_run = engine.find_matches(&fellowship, &bluebook);
        let second_run = engine.find_matches(&fellowship, &bluebook);

        assert_eq!(first_run, second_run);
    }

    #[test]
    fn test_input_order_does_not_change_match_set() {
        let engine = MatchEngine::new();
        let fellowship = vec![
            fellow("Kenya", "Mwangi", "John", 1979),
            fellow("France", "Dupont", "Jean", 1980),
        ];
        let bluebook = vec![
            rep("France", "Dupont", "Jean", "Active"),
            rep("Kenya", "Mwangi", "Johnathan", "Active"),
            rep("France", "Dupont", "Jeanne", "Active"),
        ];

        let keys_forward = engine.match_keys(&fellowship, &bluebook);

        let fellowship_reversed: Vec<_> = fellowship.iter().rev().cloned().collect();
        let bluebook_reversed: Vec<_> = bluebook.iter().rev().cloned().collect();
        let keys_reversed = engine.match_keys(&fellowship_reversed, &bluebook_reversed);

        assert_eq!(keys_forward, keys_reversed);
    }
}
