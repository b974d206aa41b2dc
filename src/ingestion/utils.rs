//! Value-level rewrite helpers used by the cleaning stages

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// "555 123-4567" style: area code separated by a space
static SPACED_AREA_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3}) (\d{3}-\d{4})").expect("valid phone pattern"));

static ZERO_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s0000$").expect("valid extension pattern"));

static DIRECTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(Sw|Nw|Se|Ne)\b").expect("valid directional pattern"));

/// Capitalize the first letter of every word, lowercase the rest.
/// Any non-letter (space, digit, apostrophe, hyphen) starts a new word.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_is_letter = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }

    out
}

/// Insert the missing hyphen after the area code
pub fn format_phone_number(value: &str) -> String {
    SPACED_AREA_CODE.replace_all(value, "${1}-${2}").into_owned()
}

/// Drop a trailing " 0000" extension placeholder
pub fn strip_zero_extension(value: &str) -> String {
    ZERO_EXTENSION.replace(value, "").into_owned()
}

/// Whole-word Sw/Nw/Se/Ne to SW/NW/SE/NE
pub fn uppercase_directionals(value: &str) -> String {
    DIRECTIONAL
        .replace_all(value, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("JOHN SMITH"), "John Smith");
        assert_eq!(title_case("mary-jane o'neil"), "Mary-Jane O'Neil");
        assert_eq!(title_case("123 sw main st"), "123 Sw Main St");
        assert_eq!(title_case("3rd ave"), "3Rd Ave");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_idempotent() {
        for input in ["ACME MOTORS, INC.", "o'brien", "1st st nw", "Émile ZOLA"] {
            let once = title_case(input);
            assert_eq!(title_case(&once), once);
        }
    }

    #[test]
    fn test_format_phone_number() {
        assert_eq!(format_phone_number("555 123-4567"), "555-123-4567");
        assert_eq!(format_phone_number("555-123-4567"), "555-123-4567");
        assert_eq!(format_phone_number("(555) 123-4567"), "(555) 123-4567");
        assert_eq!(format_phone_number("555 1234567"), "555 1234567");
    }

    #[test]
    fn test_strip_zero_extension() {
        assert_eq!(strip_zero_extension("555-123-4567 0000"), "555-123-4567");
        assert_eq!(strip_zero_extension("555-123-4567 0001"), "555-123-4567 0001");
        assert_eq!(strip_zero_extension("555-123-45670000"), "555-123-45670000");
    }

    #[test]
    fn test_uppercase_directionals() {
        assert_eq!(uppercase_directionals("123 Sw Main St"), "123 SW Main St");
        assert_eq!(uppercase_directionals("9 Ne Oak Ave Se"), "9 NE Oak Ave SE");
        assert_eq!(uppercase_directionals("Swanson Ave"), "Swanson Ave");
        assert_eq!(uppercase_directionals("12 sw Elm"), "12 sw Elm");
        assert_eq!(uppercase_directionals("Nw-Pkwy"), "NW-Pkwy");
    }
}
