use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

/// Indentation used when the user formats the outbound buffer
pub const FORMAT_INDENT: &[u8] = b"    ";

/// Indentation used when logging received JSON
pub const RECEIVED_INDENT: &[u8] = b"  ";

pub const EMPTY_INPUT_MESSAGE: &str = "Input is empty";
pub const VALID_MESSAGE: &str = "Valid JSON";
pub const FORMATTED_MESSAGE: &str = "Formatted";
pub const NOTHING_TO_FORMAT_MESSAGE: &str = "Nothing to format";

/// Outcome of checking the outbound buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// A payload that is not well-formed JSON
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Check whether `text` parses as JSON
pub fn validate(text: &str) -> ValidationResult {
    if text.trim().is_empty() {
        return ValidationResult::invalid(EMPTY_INPUT_MESSAGE);
    }

    match serde_json::from_str::<Value>(text) {
        Ok(_) => ValidationResult::valid(VALID_MESSAGE),
        Err(e) => ValidationResult::invalid(e.to_string()),
    }
}

/// Re-serialise `text` as JSON indented with four spaces
pub fn format(text: &str) -> Result<String, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError {
            message: NOTHING_TO_FORMAT_MESSAGE.to_string(),
        });
    }

    let value: Value = serde_json::from_str(text)?;
    to_indented(&value, FORMAT_INDENT)
}

/// Render a received payload for the log.
///
/// JSON is pretty-printed with two-space indentation; anything else is
/// returned unchanged.
pub fn pretty_received(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| to_indented(&value, RECEIVED_INDENT).ok())
        .unwrap_or_else(|| raw.to_string())
}

fn to_indented(value: &Value, indent: &[u8]) -> Result<String, ParseError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent));
    value.serialize(&mut serializer)?;

    String::from_utf8(out).map_err(|e| ParseError {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn blank_input_is_invalid(#[case] text: &str) {
        let result = validate(text);
        assert!(!result.valid);
        assert_eq!(result.message, EMPTY_INPUT_MESSAGE);
    }

    #[rstest]
    #[case(r#"{"a":1}"#)]
    #[case("[1, 2, 3]")]
    #[case("  \"text\"  ")]
    #[case("42")]
    fn well_formed_json_is_valid(#[case] text: &str) {
        assert_eq!(validate(text), ValidationResult::valid(VALID_MESSAGE));
    }

    #[rstest]
    #[case("{a:1}")]
    #[case(r#"{"a":}"#)]
    #[case("hello")]
    fn malformed_json_reports_parser_diagnostic(#[case] text: &str) {
        let expected = serde_json::from_str::<Value>(text)
            .expect_err("input should not parse")
            .to_string();
        let result = validate(text);
        assert!(!result.valid);
        assert_eq!(result.message, expected);
    }

    #[test]
    fn format_uses_four_space_indent() {
        let formatted = format(r#"{"a":1,"b":[true,null]}"#).expect("valid json");
        assert_eq!(
            formatted,
            "{\n    \"a\": 1,\n    \"b\": [\n        true,\n        null\n    ]\n}"
        );
    }

    #[test]
    fn format_keeps_key_order() {
        let formatted = format(r#"{"z":1,"a":2}"#).expect("valid json");
        let z = formatted.find("\"z\"").expect("z present");
        let a = formatted.find("\"a\"").expect("a present");
        assert!(z < a);
    }

    #[test]
    fn formatted_output_validates_and_round_trips() {
        let original = r#"{"a":1}"#;
        let formatted = format(original).expect("valid json");
        assert!(validate(&formatted).valid);

        let before: Value = serde_json::from_str(original).expect("parse original");
        let after: Value = serde_json::from_str(&formatted).expect("parse formatted");
        assert_eq!(before, after);
    }

    #[test]
    fn format_rejects_blank_and_malformed_input() {
        assert_eq!(
            format("  ").expect_err("blank").message,
            NOTHING_TO_FORMAT_MESSAGE
        );
        assert!(format("{a:1}").is_err());
    }

    #[test]
    fn received_json_is_pretty_printed_with_two_spaces() {
        assert_eq!(pretty_received(r#"{"x":[1]}"#), "{\n  \"x\": [\n    1\n  ]\n}");
    }

    #[test]
    fn received_text_passes_through_unchanged() {
        assert_eq!(pretty_received("hello"), "hello");
        assert_eq!(pretty_received("{oops"), "{oops");
    }
}
