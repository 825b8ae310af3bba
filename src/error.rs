//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ParseError: malformed expressions
//! - AlgebraError: expressions that parse but cannot be decided
//! - ConfigError: unreadable or invalid configuration
//! - IoError: expression files and history

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Expression parsing errors
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Errors while deciding an expression
    #[error(transparent)]
    Algebra(#[from] AlgebraError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors produced while tokenizing and parsing an expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `)` without matching `(` or the other way round
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,

    /// An operator without enough operands
    #[error("Unexpected operator '{operator}'")]
    UnexpectedOperator { operator: char },

    /// Two operands with nothing joining them
    #[error("Missing operator between operands")]
    MissingOperator,

    /// A character outside the expression alphabet
    #[error("Invalid character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    /// A malformed numeric literal
    #[error("Invalid number '{literal}'")]
    InvalidNumber { literal: String },

    /// Nothing to parse
    #[error("Empty expression")]
    Empty,

    /// An equation used where a value is required, e.g. `(a = b) + c`
    #[error("Equation cannot be used as an operand of '{operator}'")]
    EquationOperand { operator: char },
}

/// Errors while deciding a parsed expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    /// The case split would be too large
    #[error("too many variables: {count} (limit is {limit})")]
    TooManyVariables { count: usize, limit: usize },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unexpected fields
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// A setting is out of range
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Expression file could not be read
    #[error("failed to read expression file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing output failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Line editor failure
    #[error("line editor error: {message}")]
    Editor { message: String },

    /// History file could not be written
    #[error("failed to write history file {path}: {message}")]
    HistoryWrite { path: PathBuf, message: String },
}

impl ParseError {
    /// Creates a new InvalidCharacter error
    pub fn invalid_character(ch: char, position: usize) -> Self {
        ParseError::InvalidCharacter { ch, position }
    }

    /// Creates a new InvalidNumber error
    pub fn invalid_number(literal: impl Into<String>) -> Self {
        ParseError::InvalidNumber {
            literal: literal.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidValue error
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl IoError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Editor error
    pub fn editor(message: impl ToString) -> Self {
        IoError::Editor {
            message: message.to_string(),
        }
    }

    /// Creates a new HistoryWrite error
    pub fn history_write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        IoError::HistoryWrite {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Io(IoError::Output(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages() {
        assert_eq!(
            ParseError::UnbalancedParentheses.to_string(),
            "Unbalanced parentheses"
        );
        assert_eq!(
            ParseError::UnexpectedOperator { operator: '-' }.to_string(),
            "Unexpected operator '-'"
        );
        let msg = ParseError::invalid_character('$', 3).to_string();
        assert!(msg.contains("'$'"));
        assert!(msg.contains("position 3"));
    }

    #[test]
    fn test_parse_error_invalid_number() {
        let err = ParseError::invalid_number("1.2.3");
        assert!(err.to_string().contains("1.2.3"));
    }

    #[test]
    fn test_algebra_error_too_many_variables() {
        let err = AlgebraError::TooManyVariables {
            count: 20,
            limit: 16,
        };
        let msg = err.to_string();
        assert!(msg.contains("too many variables"));
        assert!(msg.contains("20"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn test_config_error_parse() {
        let err = ConfigError::parse_error("/path/to/foxi.toml", "unknown field");
        let msg = err.to_string();
        assert!(msg.contains("failed to parse config file"));
        assert!(msg.contains("unknown field"));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::invalid_value("max_variables", "must be at most 30");
        assert!(err.to_string().contains("max_variables"));
    }

    #[test]
    fn test_io_error_read() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = IoError::read_error("/missing/exprs.txt", source);
        let msg = err.to_string();
        assert!(msg.contains("failed to read expression file"));
        assert!(msg.contains("exprs.txt"));
    }

    #[test]
    fn test_app_error_from_parse_error() {
        let app_err: AppError = ParseError::Empty.into();
        assert_eq!(app_err.to_string(), "Empty expression");
    }

    #[test]
    fn test_app_error_from_algebra_error() {
        let app_err: AppError = AlgebraError::TooManyVariables { count: 3, limit: 2 }.into();
        assert!(app_err.to_string().contains("too many variables"));
    }

    #[test]
    fn test_app_error_from_std_io() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let app_err: AppError = io.into();
        assert!(app_err.to_string().contains("pipe closed"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = ParseError::MissingOperator;
        let debug = format!("{:?}", err);
        assert!(debug.contains("MissingOperator"));
    }
}
