//! Error types

use std::fmt;
use std::num::ParseIntError;

/// Error returned when parsing a hex color string fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseColorError {
    /// Hex string must have 3 or 6 digits after stripping '#'
    InvalidLength,
    /// Invalid hexadecimal character encountered
    InvalidHex(ParseIntError),
}

impl From<ParseIntError> for ParseColorError {
    fn from(err: ParseIntError) -> Self {
        ParseColorError::InvalidHex(err)
    }
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::InvalidLength => {
                write!(f, "invalid hex color length (expected 3 or 6 digits)")
            }
            ParseColorError::InvalidHex(err) => write!(f, "invalid hex digit: {}", err),
        }
    }
}

impl std::error::Error for ParseColorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseColorError::InvalidHex(err) => Some(err),
            ParseColorError::InvalidLength => None,
        }
    }
}
