//! Internal helpers for input validation and conversion.
//!
//! Validation helpers push into a [`FieldErrors`] instead of returning early,
//! so a request reports every bad field at once.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, FieldErrors, ResultEngine};

pub(crate) const NAME_MAX_CHARS: usize = 100;
pub(crate) const DESCRIPTION_MAX_CHARS: usize = 1000;
pub(crate) const NOTE_MAX_CHARS: usize = 100;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Trim `value` and check it is non-empty and at most `max` characters.
///
/// Returns the trimmed text, or `None` after recording the failure.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max: usize,
) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, format!("{field} must not be empty"));
        return None;
    }
    if trimmed.chars().count() > max {
        errors.push(field, format!("{field} must be at most {max} characters"));
        return None;
    }
    Some(trimmed.to_string())
}

/// Record a failure when `value` is negative.
pub(crate) fn non_negative(errors: &mut FieldErrors, field: &str, value: i64) {
    if value < 0 {
        errors.push(field, format!("{field} must be >= 0"));
    }
}

/// Collapse inner whitespace and trim a category name for display.
pub fn normalize_category_display(input: &str) -> ResultEngine<String> {
    let mut out = String::new();
    for token in input.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() {
        return Err(EngineError::invalid("name", "category name must not be empty"));
    }
    if out.chars().count() > NAME_MAX_CHARS {
        return Err(EngineError::invalid(
            "name",
            format!("name must be at most {NAME_MAX_CHARS} characters"),
        ));
    }
    Ok(out)
}

/// Comparison key of a category name: lowercase, no diacritics, punctuation
/// folded to single spaces.
///
/// `"Épée"`, `"epee"` and `" EPEE "` share the key `"epee"`.
pub fn normalize_category_key(input: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        return Err(EngineError::invalid(
            "name",
            "category name must contain a letter or digit",
        ));
    }
    Ok(normalized.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims() {
        let mut errors = FieldErrors::default();
        assert_eq!(
            required_text(&mut errors, "name", "  Sword ", NAME_MAX_CHARS),
            Some("Sword".to_string())
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn required_text_collects_empty_and_long() {
        let mut errors = FieldErrors::default();
        assert_eq!(required_text(&mut errors, "name", "   ", 10), None);
        assert_eq!(
            required_text(&mut errors, "description", &"x".repeat(11), 10),
            None
        );
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "description"]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut errors = FieldErrors::default();
        assert!(required_text(&mut errors, "note", &"é".repeat(100), NOTE_MAX_CHARS).is_some());
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut errors = FieldErrors::default();
        non_negative(&mut errors, "value", 0);
        assert!(errors.is_empty());
        non_negative(&mut errors, "value", -1);
        assert!(!errors.is_empty());
    }

    #[test]
    fn category_display_collapses_whitespace() {
        assert_eq!(
            normalize_category_display("  Magic   Items ").unwrap(),
            "Magic Items"
        );
        assert!(normalize_category_display("   ").is_err());
    }

    #[test]
    fn category_key_ignores_case_and_diacritics() {
        assert_eq!(normalize_category_key("Épée").unwrap(), "epee");
        assert_eq!(normalize_category_key(" EPEE ").unwrap(), "epee");
        assert_eq!(normalize_category_key("Light-Armor").unwrap(), "light armor");
        assert!(normalize_category_key("--").is_err());
    }
}
