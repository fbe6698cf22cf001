//! Input validators
//!
//! A validator is a predicate over a finished line of input. The text field
//! evaluates it once per submitted attempt, never per keystroke.

use std::sync::OnceLock;

use regex::Regex;

/// Accepts or rejects a submitted value.
pub trait Validator {
    fn validate(&self, input: &str) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&str) -> bool,
{
    fn validate(&self, input: &str) -> bool {
        self(input)
    }
}

/// `local@domain.tld` shape: no whitespace, exactly one `@`, a dot in the domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl Validator for EmailValidator {
    fn validate(&self, input: &str) -> bool {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN
            .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("email pattern is valid"))
            .is_match(input)
    }
}

/// Optionally signed decimal integer that fits in an `i64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerValidator;

impl Validator for IntegerValidator {
    fn validate(&self, input: &str) -> bool {
        input.parse::<i64>().is_ok()
    }
}

/// Decimal number with optional sign, fraction and exponent.
///
/// Rejects the `inf`/`NaN` spellings that `f64::from_str` would take.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatValidator;

impl Validator for FloatValidator {
    fn validate(&self, input: &str) -> bool {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN
            .get_or_init(|| {
                Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("float pattern is valid")
            })
            .is_match(input)
            && input.parse::<f64>().is_ok()
    }
}
