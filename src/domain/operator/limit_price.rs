//! Daily price limits (limit-up / limit-down).
//!
//! The raw limit `close * (1 ± max_move)` is rounded to the cent, then the
//! neighbouring cents are tried and the candidate whose ratio to `close` is
//! nearest the target ratio wins. Candidates are tried in the order
//! `p0`, `p0 + 0.01`, `p0 - 0.01`; only a strictly better score replaces
//! the current choice.

use crate::domain::error::FormulaError;

const TICK: f64 = 0.01;

/// Highest allowed price for the next session.
pub fn limit_up(close: f64, max_move: f64) -> Result<f64, FormulaError> {
    validate(close, max_move)?;
    Ok(refine(close, 1.0 + max_move))
}

/// Lowest allowed price for the next session.
pub fn limit_down(close: f64, max_move: f64) -> Result<f64, FormulaError> {
    validate(close, max_move)?;
    Ok(refine(close, 1.0 - max_move))
}

pub fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

fn refine(close: f64, target: f64) -> f64 {
    let p0 = round_cents(close * target);
    round_cents(nearest_cent(p0, |price| (price / close - target).abs()))
}

/// Ties keep the earlier candidate.
fn nearest_cent(p0: f64, error: impl Fn(f64) -> f64) -> f64 {
    let mut best = p0;
    let mut best_error = error(p0);
    for candidate in [p0 + TICK, p0 - TICK] {
        let candidate_error = error(candidate);
        if candidate_error < best_error {
            best = candidate;
            best_error = candidate_error;
        }
    }
    best
}

fn validate(close: f64, max_move: f64) -> Result<(), FormulaError> {
    if !close.is_finite() || close <= 0.0 {
        return Err(FormulaError::InvalidPrice {
            reason: format!("close must be a positive price, got {}", close),
        });
    }
    if !(0.0..1.0).contains(&max_move) {
        return Err(FormulaError::InvalidPrice {
            reason: format!("max move must be in [0, 1), got {}", max_move),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ten_percent_limits_on_round_price() {
        assert_abs_diff_eq!(limit_up(10.0, 0.10).unwrap(), 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(limit_down(10.0, 0.10).unwrap(), 9.0, epsilon = 1e-9);
    }

    #[test]
    fn limit_rounds_to_nearest_ratio() {
        // 9.99 * 1.1 = 10.989 -> 10.99 is the closest cent.
        assert_abs_diff_eq!(limit_up(9.99, 0.10).unwrap(), 10.99, epsilon = 1e-9);
        // 9.99 * 0.9 = 8.991 -> 8.99
        assert_abs_diff_eq!(limit_down(9.99, 0.10).unwrap(), 8.99, epsilon = 1e-9);
    }

    #[test]
    fn five_percent_band() {
        // 13.37 * 1.05 = 14.0385 -> 14.04
        assert_abs_diff_eq!(limit_up(13.37, 0.05).unwrap(), 14.04, epsilon = 1e-9);
        // 13.37 * 0.95 = 12.7015 -> 12.70
        assert_abs_diff_eq!(limit_down(13.37, 0.05).unwrap(), 12.70, epsilon = 1e-9);
    }

    #[test]
    fn result_is_whole_cents() {
        for close in [3.33, 7.77, 12.34, 99.99, 101.01] {
            let up = limit_up(close, 0.2).unwrap();
            assert_abs_diff_eq!(up * 100.0, (up * 100.0).round(), epsilon = 1e-6);
        }
    }

    #[test]
    fn stays_within_a_cent_of_exact() {
        for close in [1.11, 5.55, 18.88, 42.42] {
            let up = limit_up(close, 0.1).unwrap();
            assert!((up - close * 1.1).abs() <= 0.01 + 1e-9);
            let down = limit_down(close, 0.1).unwrap();
            assert!((down - close * 0.9).abs() <= 0.01 + 1e-9);
        }
    }

    #[test]
    fn tie_keeps_p0() {
        assert_abs_diff_eq!(nearest_cent(5.0, |_| 0.25), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn tie_between_neighbours_prefers_the_cent_above() {
        let error = |price: f64| if (price - 5.0).abs() < 1e-9 { 1.0 } else { 0.5 };
        assert_abs_diff_eq!(nearest_cent(5.0, error), 5.01, epsilon = 1e-12);
    }

    #[test]
    fn cent_above_tying_p0_does_not_replace_it() {
        let error = |price: f64| if price < 5.0 { 0.5 } else { 0.25 };
        // 5.01 ties with 5.00, 4.99 is worse
        assert_abs_diff_eq!(nearest_cent(5.0, error), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn strictly_better_cent_below_wins() {
        let error = |price: f64| if price < 5.0 { 0.1 } else { 0.25 };
        assert_abs_diff_eq!(nearest_cent(5.0, error), 4.99, epsilon = 1e-12);
    }

    #[test]
    fn zero_move_is_close() {
        assert_abs_diff_eq!(limit_up(8.88, 0.0).unwrap(), 8.88, epsilon = 1e-9);
    }

    #[test]
    fn invalid_inputs() {
        assert!(matches!(
            limit_up(0.0, 0.1),
            Err(FormulaError::InvalidPrice { .. })
        ));
        assert!(matches!(
            limit_down(f64::NAN, 0.1),
            Err(FormulaError::InvalidPrice { .. })
        ));
        assert!(matches!(
            limit_up(10.0, 1.0),
            Err(FormulaError::InvalidPrice { .. })
        ));
        assert!(matches!(
            limit_down(10.0, -0.1),
            Err(FormulaError::InvalidPrice { .. })
        ));
    }
}
