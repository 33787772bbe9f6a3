//! Core domain: series, operators and the formula language.

pub mod config_validation;
pub mod error;
pub mod field;
pub mod formula;
pub mod formula_eval;
pub mod formula_parser;
pub mod ohlcv;
pub mod operator;
pub mod sanitize;
pub mod series;
