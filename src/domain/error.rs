//! Domain error types.

use crate::domain::operator::Op;

/// A parse error with position information for formula parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!("{input}\n{caret}\n{self}")
    }
}

/// Failure inside a low-level numeric kernel, before any operator context is attached.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericError {
    #[error("period {period} out of range for {len} values")]
    PeriodOutOfRange { period: usize, len: usize },
}

/// Top-level error type for samformula.
#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("empty input to {op}")]
    EmptyInput { op: Op },

    #[error("{op} failed")]
    NumericFailure {
        op: Op,
        #[source]
        source: NumericError,
    },

    #[error("invalid window for {op}: {window} over {len} bars")]
    InvalidWindow { op: Op, window: usize, len: usize },

    #[error("occurrence {occurrence} is not supported, only the most recent event (0)")]
    UnsupportedOccurrence { occurrence: usize },

    #[error("invalid price input: {reason}")]
    InvalidPrice { reason: String },

    #[error("invalid argument to {function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FormulaError> for std::process::ExitCode {
    fn from(err: &FormulaError) -> Self {
        let code: u8 = match err {
            FormulaError::Io(_) => 1,
            FormulaError::ConfigParse { .. }
            | FormulaError::ConfigMissing { .. }
            | FormulaError::ConfigInvalid { .. } => 2,
            FormulaError::Data { .. } => 3,
            FormulaError::Parse(_) => 4,
            FormulaError::EmptyInput { .. }
            | FormulaError::NumericFailure { .. }
            | FormulaError::InvalidWindow { .. }
            | FormulaError::UnsupportedOccurrence { .. }
            | FormulaError::InvalidPrice { .. }
            | FormulaError::InvalidArgument { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn parse_error_context_places_caret() {
        let err = ParseError {
            message: "expected ')'".into(),
            position: 4,
        };
        let rendered = err.display_with_context("MA(C");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "MA(C");
        assert_eq!(lines[1], "    ^");
        assert!(lines[2].contains("position 4"));
    }

    #[test]
    fn numeric_failure_keeps_cause() {
        let err = FormulaError::NumericFailure {
            op: Op::Ma(30),
            source: NumericError::PeriodOutOfRange { period: 30, len: 5 },
        };
        assert_eq!(err.to_string(), "MA(30) failed");
        let cause = err.source().expect("cause attached");
        assert_eq!(cause.to_string(), "period 30 out of range for 5 values");
    }

    #[test]
    fn invalid_window_message() {
        let err = FormulaError::InvalidWindow {
            op: Op::Hhv(10),
            window: 10,
            len: 3,
        };
        assert_eq!(err.to_string(), "invalid window for HHV(10): 10 over 3 bars");
    }

    #[test]
    fn exit_codes_by_family() {
        use std::process::ExitCode;
        let parse: FormulaError = ParseError {
            message: "x".into(),
            position: 0,
        }
        .into();
        assert_eq!(ExitCode::from(&parse), ExitCode::from(4));

        let config = FormulaError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        };
        assert_eq!(ExitCode::from(&config), ExitCode::from(2));

        let eval = FormulaError::UnsupportedOccurrence { occurrence: 1 };
        assert_eq!(ExitCode::from(&eval), ExitCode::from(5));
    }
}
