//! Configuration validation.
//!
//! Reads and checks the `[data]`, `[formula]` and `[limit]` sections before
//! anything is loaded or evaluated.

use crate::domain::error::FormulaError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_MAX_MOVE: f64 = 0.10;

/// Where to load bars from, after command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: PathBuf,
    pub code: String,
    pub exchange: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// `code`/`exchange` overrides take precedence over the `[data]` section.
/// Missing dates leave the range open on that side.
pub fn validate_data_config(
    config: &dyn ConfigPort,
    code_override: Option<&str>,
    exchange_override: Option<&str>,
) -> Result<DataSettings, FormulaError> {
    let path = PathBuf::from(config.require_string("data", "path")?);
    let code = resolve(config, "code", code_override)?;
    let exchange = resolve(config, "exchange", exchange_override)?;

    let start_date = parse_date(config, "start_date")?.unwrap_or(NaiveDate::MIN);
    let end_date = parse_date(config, "end_date")?.unwrap_or(NaiveDate::MAX);
    if start_date > end_date {
        return Err(FormulaError::ConfigInvalid {
            section: "data".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }

    Ok(DataSettings {
        path,
        code,
        exchange,
        start_date,
        end_date,
    })
}

fn resolve(
    config: &dyn ConfigPort,
    key: &str,
    value: Option<&str>,
) -> Result<String, FormulaError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => config.require_string("data", key),
    }
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, FormulaError> {
    match config.get_string("data", key) {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FormulaError::ConfigInvalid {
                section: "data".to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            }),
        _ => Ok(None),
    }
}

/// The override when given, otherwise `[formula] expr`.
pub fn validate_formula_config(
    config: &dyn ConfigPort,
    formula_override: Option<&str>,
) -> Result<String, FormulaError> {
    match formula_override.map(str::trim) {
        Some(f) if !f.is_empty() => Ok(f.to_string()),
        _ => config.require_string("formula", "expr"),
    }
}

/// `[limit] max_move`, defaulting to [`DEFAULT_MAX_MOVE`]; must lie in `[0, 1)`.
pub fn validate_limit_config(config: &dyn ConfigPort) -> Result<f64, FormulaError> {
    let invalid = |reason: String| FormulaError::ConfigInvalid {
        section: "limit".to_string(),
        key: "max_move".to_string(),
        reason,
    };
    let max_move = match config.get_string("limit", "max_move") {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("'{}' is not a number", s.trim())))?,
        _ => DEFAULT_MAX_MOVE,
    };
    if !(0.0..1.0).contains(&max_move) {
        return Err(invalid("max_move must be in [0, 1)".to_string()));
    }
    Ok(max_move)
}
