//! Moving averages and rolling statistics (MA, EMA, WMA, STD, SUM).
//!
//! Outputs keep the input length; the first `n - 1` values are NaN (no full
//! window yet). Infinite inputs are treated as missing (NaN), except for SUM
//! where they count as 0.
//!
//! The kernels work on plain slices and report [`NumericError`]; the public
//! operators attach their [`Op`] and surface it as `NumericFailure`.

use crate::domain::error::{FormulaError, NumericError};
use crate::domain::operator::Op;
use crate::domain::sanitize;
use crate::domain::series::NumericSeries;

pub fn ma(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    run(Op::Ma(n), |values| rolling_mean(&sanitize::infinite_to_nan(values), n), series)
}

pub fn ema(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    run(Op::Ema(n), |values| exponential(&sanitize::infinite_to_nan(values), n), series)
}

pub fn wma(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    run(Op::Wma(n), |values| weighted(&sanitize::infinite_to_nan(values), n), series)
}

pub fn std_dev(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    run(Op::Std(n), |values| stddev(&sanitize::infinite_to_nan(values), n), series)
}

pub fn sum(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    run(Op::Sum(n), |values| rolling_sum(&sanitize::infinite_to_zero(values), n), series)
}

fn run(
    op: Op,
    kernel: impl FnOnce(&[f64]) -> Result<Vec<f64>, NumericError>,
    series: &NumericSeries,
) -> Result<NumericSeries, FormulaError> {
    kernel(&series.values)
        .map(|values| NumericSeries::new(op, values))
        .map_err(|source| FormulaError::NumericFailure { op, source })
}

fn check_period(values: &[f64], period: usize) -> Result<(), NumericError> {
    if period == 0 || period > values.len() {
        return Err(NumericError::PeriodOutOfRange {
            period,
            len: values.len(),
        });
    }
    Ok(())
}

/// Running sum over `period`; a NaN inside the window makes that window NaN.
pub fn rolling_sum(values: &[f64], period: usize) -> Result<Vec<f64>, NumericError> {
    check_period(values, period)?;
    let mut out = vec![f64::NAN; values.len()];
    let mut total = 0.0;
    let mut missing = 0usize;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            missing += 1;
        } else {
            total += v;
        }
        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                missing -= 1;
            } else {
                total -= leaving;
            }
        }
        if i + 1 >= period && missing == 0 {
            out[i] = total;
        }
    }
    Ok(out)
}

pub fn rolling_mean(values: &[f64], period: usize) -> Result<Vec<f64>, NumericError> {
    let mut out = rolling_sum(values, period)?;
    for v in out.iter_mut() {
        *v /= period as f64;
    }
    Ok(out)
}

/// k = 2/(n+1), seeded with the SMA of the first `n` values.
pub fn exponential(values: &[f64], period: usize) -> Result<Vec<f64>, NumericError> {
    check_period(values, period)?;
    let mut out = vec![f64::NAN; values.len()];
    let k = 2.0 / (period as f64 + 1.0);

    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = ema;
    for i in period..values.len() {
        ema = values[i] * k + ema * (1.0 - k);
        out[i] = ema;
    }
    Ok(out)
}

/// Linear weights 1..=n, newest bar heaviest. O(len) sliding update.
pub fn weighted(values: &[f64], period: usize) -> Result<Vec<f64>, NumericError> {
    check_period(values, period)?;
    let mut out = vec![f64::NAN; values.len()];
    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum = 0.0;
    let mut window_sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if i < period {
            weighted_sum += (i + 1) as f64 * v;
            window_sum += v;
        } else {
            weighted_sum += period as f64 * v - window_sum;
            window_sum += v - values[i - period];
        }
        if i + 1 >= period {
            out[i] = weighted_sum / divisor;
        }
    }
    Ok(out)
}

/// Population standard deviation, two-pass per window.
pub fn stddev(values: &[f64], period: usize) -> Result<Vec<f64>, NumericError> {
    check_period(values, period)?;
    let mut out = vec![f64::NAN; values.len()];

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        out[i] = variance.sqrt();
    }
    Ok(out)
}
