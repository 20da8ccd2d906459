//! Parsing of comma-separated number input.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::error::DomainError;

fn number_regex() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("valid number regex")
    })
}

/// Parse comma-separated numbers, e.g. `"10, 5,15"`.
///
/// Every token must be a finite decimal literal; one bad token rejects the
/// whole input. Positions in errors are 1-based.
pub fn parse_numbers(text: &str) -> Result<Vec<f64>, DomainError> {
    text.split(',')
        .enumerate()
        .map(|(i, raw)| parse_token(raw.trim(), i + 1))
        .collect()
}

fn parse_token(token: &str, position: usize) -> Result<f64, DomainError> {
    if token.is_empty() {
        return Err(DomainError::EmptyNumber { position });
    }
    let invalid = || DomainError::InvalidNumber {
        token: token.to_string(),
        position,
    };
    if !number_regex().is_match(token) {
        return Err(invalid());
    }
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid()),
    }
}
