//! Total coercions from free-text spreadsheet cells into schema-constrained
//! values. Every function here accepts arbitrary text and defaults rather
//! than failing; row-level anomalies must never abort a sync.

use serde::Serialize;

/// Language enumeration used by the output schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Php,
    Typescript,
    Javascript,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Php => "php",
            Language::Typescript => "typescript",
            Language::Javascript => "javascript",
        }
    }
}

/// Map a language cell onto the schema enumeration. Unrecognized or empty
/// input falls back to PHP, the primary ecosystem.
pub fn normalize_language(raw: &str) -> Language {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ts" | "typescript" => Language::Typescript,
        "js" | "javascript" => Language::Javascript,
        _ => Language::Php,
    }
}

/// Parse a score cell, defaulting non-numeric input to 0.0 and clamping the
/// result to the schema's [0.0, 5.0] range.
pub fn coerce_score(raw: &str) -> f64 {
    let score = raw.trim().parse::<f64>().unwrap_or(0.0);
    if score.is_nan() {
        return 0.0;
    }
    // Overflowing literals like "1e400" parse to infinity; the clamp rule
    // applies to them like any other out-of-range number.
    score.clamp(0.0, 5.0)
}

/// Tri-state boolean: recognized affirmatives and negatives map to a value,
/// everything else (including empty cells) is absent.
pub fn tri_state_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Reduce a milestone cell to the schema's `m[1-6]` short code.
///
/// Exact codes (any case) are accepted first; otherwise the first digit in
/// the 1-6 range found anywhere in the text is used. No digit means absent.
pub fn normalize_milestone(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let mut chars = lowered.chars();
    if chars.next() == Some('m') {
        let rest = chars.as_str();
        if rest.len() == 1 && matches!(rest.as_bytes()[0], b'1'..=b'6') {
            return Some(lowered);
        }
    }

    lowered
        .chars()
        .find(|c| matches!(c, '1'..='6'))
        .map(|digit| format!("m{digit}"))
}

/// Trim a free-text cell and treat the empty result as absent.
pub fn blank_to_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_parse_and_clamp() {
        assert_eq!(coerce_score("4.2"), 4.2);
        assert_eq!(coerce_score(" 3 "), 3.0);
        assert_eq!(coerce_score("-1"), 0.0);
        assert_eq!(coerce_score("11.5"), 5.0);
        assert_eq!(coerce_score("n/a"), 0.0);
        assert_eq!(coerce_score(""), 0.0);
        // Overflowing numerics clamp; only NaN zeroes out.
        assert_eq!(coerce_score("1e400"), 5.0);
        assert_eq!(coerce_score("-1e400"), 0.0);
        assert_eq!(coerce_score("NaN"), 0.0);
    }

    #[test]
    fn tri_state_bool_table() {
        for raw in ["yes", "Y", "TRUE", "1"] {
            assert_eq!(tri_state_bool(raw), Some(true), "{raw}");
        }
        for raw in ["no", "N", "False", "0"] {
            assert_eq!(tri_state_bool(raw), Some(false), "{raw}");
        }
        for raw in ["", "  ", "maybe", "2"] {
            assert_eq!(tri_state_bool(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn language_normalization_is_idempotent() {
        for lang in [Language::Php, Language::Typescript, Language::Javascript] {
            assert_eq!(normalize_language(lang.as_str()), lang);
        }
    }

    #[test]
    fn language_aliases_and_default() {
        assert_eq!(normalize_language("TS"), Language::Typescript);
        assert_eq!(normalize_language("js"), Language::Javascript);
        assert_eq!(normalize_language(""), Language::Php);
        assert_eq!(normalize_language("rust"), Language::Php);
    }

    #[test]
    fn milestone_canonical_forms_agree() {
        assert_eq!(normalize_milestone("m3").as_deref(), Some("m3"));
        assert_eq!(normalize_milestone("M3").as_deref(), Some("m3"));
        assert_eq!(normalize_milestone("milestone 3").as_deref(), Some("m3"));
    }

    #[test]
    fn milestone_rejects_out_of_range() {
        assert_eq!(normalize_milestone("m9"), None);
        assert_eq!(normalize_milestone("none"), None);
        assert_eq!(normalize_milestone(""), None);
        // 7 is outside the range but the trailing 2 is not.
        assert_eq!(normalize_milestone("phase 7.2").as_deref(), Some("m2"));
    }

    #[test]
    fn blank_cells_become_absent() {
        assert_eq!(blank_to_none("  "), None);
        assert_eq!(blank_to_none(" keep me "), Some("keep me".to_string()));
    }
}
