// 🔤 Normalizer - canonical comparison keys
// Trim + uppercase only. No locale folding, no diacritic stripping:
// "Côte d'Ivoire" and "côte d'ivoire" agree, "Cote d'Ivoire" does not.

/// Canonical comparison key: leading/trailing whitespace removed,
/// every character upper-cased. Empty input normalizes to "".
pub fn normalize(s: &str) -> String {
    s.trim().to_uppercase()
}

/// First-name comparison key: `normalize(s)` truncated to its first 4
/// characters (fewer if shorter). Truncation is per character, not per
/// byte. Used only for first names, never for surname or country.
pub fn first_name_prefix(s: &str) -> String {
    normalize(s).chars().take(4).collect()
}
