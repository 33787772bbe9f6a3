//! Market-data field table.
//!
//! Each bar field has exactly one selector; formula names map onto it
//! through [`Field::from_name`].

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::operator::Op;
use crate::domain::series::NumericSeries;
use chrono::Datelike;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
    Datetime,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::Datetime,
    ];

    /// Resolve a formula name (`C`, `CLOSE`, `VOL`, ...) to a field.
    pub fn from_name(name: &str) -> Option<Field> {
        match name {
            "O" | "OPEN" => Some(Field::Open),
            "H" | "HIGH" => Some(Field::High),
            "L" | "LOW" => Some(Field::Low),
            "C" | "CLOSE" => Some(Field::Close),
            "V" | "VOL" | "VOLUME" => Some(Field::Volume),
            "DATETIME" => Some(Field::Datetime),
            _ => None,
        }
    }

    pub fn value(self, bar: &OhlcvBar) -> f64 {
        match self {
            Field::Open => bar.open,
            Field::High => bar.high,
            Field::Low => bar.low,
            Field::Close => bar.close,
            Field::Volume => bar.volume as f64,
            Field::Datetime => datetime_stamp(bar),
        }
    }

    pub fn select(self, bars: &[OhlcvBar]) -> NumericSeries {
        NumericSeries::new(
            Op::Field(self),
            bars.iter().map(|bar| self.value(bar)).collect(),
        )
    }
}

/// YYYYMMDDHHMMSS; bars are daily so the clock part is always zero.
fn datetime_stamp(bar: &OhlcvBar) -> f64 {
    let date = bar.date;
    let ymd = date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64;
    (ymd * 1_000_000) as f64
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Open => "OPEN",
            Field::High => "HIGH",
            Field::Low => "LOW",
            Field::Close => "CLOSE",
            Field::Volume => "VOLUME",
            Field::Datetime => "DATETIME",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar() -> OhlcvBar {
        OhlcvBar {
            code: "BHP".into(),
            exchange: "ASX".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 5_000,
        }
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(Field::from_name("C"), Some(Field::Close));
        assert_eq!(Field::from_name("CLOSE"), Some(Field::Close));
        assert_eq!(Field::from_name("VOL"), Some(Field::Volume));
        assert_eq!(Field::from_name("V"), Some(Field::Volume));
        assert_eq!(Field::from_name("close"), None);
        assert_eq!(Field::from_name("X"), None);
    }

    #[test]
    fn every_field_has_a_name_that_round_trips() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(&field.to_string()), Some(field));
        }
    }

    #[test]
    fn select_tags_series_with_field() {
        let bars = vec![bar(), bar()];
        let series = Field::High.select(&bars);
        assert_eq!(series.op, Op::Field(Field::High));
        assert_eq!(series.values, vec![12.0, 12.0]);
    }

    #[test]
    fn volume_and_datetime_are_numeric() {
        let b = bar();
        assert_eq!(Field::Volume.value(&b), 5_000.0);
        assert_eq!(Field::Datetime.value(&b), 20_240_307_000_000.0);
    }
}
