//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub code: String,
    pub exchange: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// Returns a description of the first inconsistency, if any.
    ///
    /// A bar is consistent when every price is finite, `low <= open, close <= high`
    /// and volume is non-negative.
    pub fn inconsistency(&self) -> Option<String> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Some("non-finite price".to_string());
        }
        if self.low > self.high {
            return Some(format!("low {} above high {}", self.low, self.high));
        }
        for (name, price) in [("open", self.open), ("close", self.close)] {
            if price < self.low || price > self.high {
                return Some(format!(
                    "{} {} outside [{}, {}]",
                    name, price, self.low, self.high
                ));
            }
        }
        if self.volume < 0 {
            return Some(format!("negative volume {}", self.volume));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> OhlcvBar {
        OhlcvBar {
            code: "BHP".into(),
            exchange: "ASX".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    #[test]
    fn consistent_bar() {
        assert_eq!(sample_bar().inconsistency(), None);
    }

    #[test]
    fn low_above_high() {
        let mut bar = sample_bar();
        bar.low = 120.0;
        assert!(bar.inconsistency().unwrap().contains("above high"));
    }

    #[test]
    fn close_outside_range() {
        let mut bar = sample_bar();
        bar.close = 111.0;
        assert!(bar.inconsistency().unwrap().starts_with("close"));
    }

    #[test]
    fn nan_price() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert_eq!(bar.inconsistency().as_deref(), Some("non-finite price"));
    }

    #[test]
    fn negative_volume() {
        let mut bar = sample_bar();
        bar.volume = -1;
        assert!(bar.inconsistency().unwrap().contains("negative volume"));
    }
}
