//! CSV file data adapter.
//!
//! One file per instrument, `<base>/<CODE>_<EXCHANGE>.csv`, with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::FormulaError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, exchange: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", code, exchange))
    }
}

fn data_error(reason: String) -> FormulaError {
    FormulaError::Data { reason }
}

fn column<T: FromStr>(record: &csv::StringRecord, index: usize, line: u64) -> Result<T, FormulaError>
where
    T::Err: std::fmt::Display,
{
    let name = COLUMNS[index];
    let raw = record
        .get(index)
        .ok_or_else(|| data_error(format!("line {}: missing {} column", line, name)))?;
    raw.trim()
        .parse()
        .map_err(|e| data_error(format!("line {}: invalid {} value '{}': {}", line, name, raw, e)))
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, FormulaError> {
        let path = self.csv_path(code, exchange);
        debug!(path = %path.display(), "reading bars");
        let mut rdr = csv::Reader::from_path(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        if names != COLUMNS {
            return Err(data_error(format!(
                "{}: expected header {}, found {}",
                path.display(),
                COLUMNS.join(","),
                names.join(",")
            )));
        }

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let raw_date = record
                .get(0)
                .ok_or_else(|| data_error(format!("line {}: missing date column", line)))?;
            let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d").map_err(|e| {
                data_error(format!("line {}: invalid date '{}': {}", line, raw_date, e))
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let bar = OhlcvBar {
                code: code.to_string(),
                exchange: exchange.to_string(),
                date,
                open: column(&record, 1, line)?,
                high: column(&record, 2, line)?,
                low: column(&record, 3, line)?,
                close: column(&record, 4, line)?,
                volume: column(&record, 5, line)?,
            };
            if let Some(problem) = bar.inconsistency() {
                return Err(data_error(format!("line {}: {}", line, problem)));
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        debug!(code, exchange, bars = bars.len(), "loaded bars");
        Ok(bars)
    }
}
