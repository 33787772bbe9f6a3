//! Loop-carried smoothers: SMA (weighted recurrence) and RMA.
//!
//! SMA(n): `out[0] = in[0]`, `out[i] = ((n-1)*out[i-1] + in[i]) / n`.
//! Non-finite inputs count as 0.
//!
//! RMA(days), alpha = 1/days: zero during warm-up, seeded with the mean of
//! the first full window, then `out[i] = alpha*in[i] + (1-alpha)*out[i-1]`.
//! Seeding happens exactly once; a smoothed value of 0 is a valid value.
//!
//! Both are strictly sequential.

use crate::domain::error::FormulaError;
use crate::domain::operator::Op;
use crate::domain::sanitize;
use crate::domain::series::NumericSeries;

pub fn sma(series: &NumericSeries, n: usize) -> Result<NumericSeries, FormulaError> {
    let op = Op::Sma(n);
    if n == 0 {
        return Err(FormulaError::InvalidWindow {
            op,
            window: n,
            len: series.len(),
        });
    }

    let mut out = sanitize::non_finite_to_zero(&series.values);
    let weight = (n - 1) as f64;
    for i in 1..out.len() {
        out[i] = (weight * out[i - 1] + out[i]) / n as f64;
    }

    Ok(NumericSeries::new(op, out))
}

pub fn rma(series: &NumericSeries, days: usize) -> Result<NumericSeries, FormulaError> {
    let op = Op::Rma(days);
    let input = sanitize::infinite_to_nan(&series.values);
    if days == 0 || days > input.len() {
        return Err(FormulaError::InvalidWindow {
            op,
            window: days,
            len: input.len(),
        });
    }

    let alpha = 1.0 / days as f64;
    let mut out = vec![0.0; input.len()];
    let mut seeded = false;

    for i in (days - 1)..input.len() {
        out[i] = if seeded {
            alpha * input[i] + (1.0 - alpha) * out[i - 1]
        } else {
            seeded = true;
            input[i + 1 - days..=i].iter().sum::<f64>() / days as f64
        };
    }

    Ok(NumericSeries::new(op, out))
}
