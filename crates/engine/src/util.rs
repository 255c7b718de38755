//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and normalization logic so the engine enforces consistent
//! invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::NotFound(format!("{label} {value}")))
}

/// Normalize a user-facing name for display: NFC, trimmed, inner whitespace
/// collapsed. Rejects empty input.
pub(crate) fn normalize_display_name(value: &str, label: &str) -> ResultEngine<String> {
    let collapsed = collapse_whitespace(&value.nfc().collect::<String>());
    if collapsed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    Ok(collapsed)
}

/// Normalize a name into its matching key.
///
/// Arabic labels arrive in several presentation forms; NFKC plus tatweel
/// stripping and digit folding makes `"مصروف  عام"` and `"مصروف عام"` (and
/// their Arabic-Indic-digit variants) compare equal. ASCII input is
/// lowercased on the way through.
pub(crate) fn normalize_name_key(value: &str) -> String {
    let folded: String = value
        .nfkc()
        .filter(|ch| *ch != '\u{0640}') // tatweel is purely presentational
        .map(fold_arabic_digit)
        .flat_map(char::to_lowercase)
        .collect();
    collapse_whitespace(&folded)
}

fn fold_arabic_digit(ch: char) -> char {
    match ch {
        '\u{0660}'..='\u{0669}' => {
            char::from_u32('0' as u32 + (ch as u32 - 0x0660)).unwrap_or(ch)
        }
        '\u{06F0}'..='\u{06F9}' => {
            char::from_u32('0' as u32 + (ch as u32 - 0x06F0)).unwrap_or(ch)
        }
        other => other,
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_trims_and_collapses() {
        assert_eq!(
            normalize_display_name("  مشروع   التوسعة ", "project").unwrap(),
            "مشروع التوسعة"
        );
        assert!(normalize_display_name("   ", "project").is_err());
    }

    #[test]
    fn name_key_folds_presentation_forms() {
        assert_eq!(normalize_name_key("مصروف  عام"), normalize_name_key("مصروف عام"));
        assert_eq!(normalize_name_key("رواتــب"), normalize_name_key("رواتب"));
        assert_eq!(normalize_name_key("Fuel ٢"), normalize_name_key("fuel 2"));
    }
}
